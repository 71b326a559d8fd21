//! Math type re-exports and the container's axis convention.
//!
//! Container space is host space with Y and Z swapped and the new Z negated:
//! `(x, y, z) -> (x, z, -y)`. Model origins historically use the mirrored
//! mapping `(x, y, z) -> (x, -z, y)`; both are kept for file compatibility.

pub use glam::{Vec2, Vec3, Vec4};

/// Convert a host-space position or normal into container space.
#[inline]
pub fn to_container_axes(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, -v.y)
}

/// Convert a container-space position or normal back into host space.
#[inline]
pub fn from_container_axes(v: Vec3) -> Vec3 {
    Vec3::new(v.x, -v.z, v.y)
}

/// Convert a host-space object location into a container model origin.
#[inline]
pub fn origin_to_container(location: Vec3) -> [f32; 3] {
    [location.x, -location.z, location.y]
}

/// Convert a container model origin back into a host-space location.
#[inline]
pub fn origin_from_container(origin: [f32; 3]) -> Vec3 {
    Vec3::new(origin[0], origin[2], -origin[1])
}
