//! VEC3 format constants and flag types.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Magic bytes at the start of a VEC3 container.
pub const VEC3_MAGIC: &[u8; 8] = b"\x00\x00VEC3\x00\x00";

/// The only container version this library reads and writes.
pub const CURRENT_VERSION: u16 = 1;

/// Size of the container header (magic, version, reserved) in bytes.
pub const HEADER_SIZE: usize = 12;

/// Vertex ids at or above this value force 16-bit indices.
pub const USHORT_INDEX_THRESHOLD: u32 = 255;

/// Size of the `uncompressed_size` field inside a compressed attribute payload.
pub const UNCOMPRESSED_SIZE_FIELD: usize = 4;

macro_rules! bit_flags {
    (
        $(#[$meta:meta])*
        $name:ident($repr:ty) { $($(#[$fmeta:meta])* $flag:ident = $value:expr,)* }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name($repr);

        impl $name {
            /// No bits set.
            pub const NONE: Self = Self(0);
            $($(#[$fmeta])* pub const $flag: Self = Self($value);)*

            /// Wrap raw bits, keeping unknown ones.
            #[inline]
            pub const fn from_bits(bits: $repr) -> Self {
                Self(bits)
            }

            /// Raw bits.
            #[inline]
            pub const fn bits(self) -> $repr {
                self.0
            }

            /// True if every bit of `other` is set.
            #[inline]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// True if no bit is set.
            #[inline]
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Set the bits of `other`.
            #[inline]
            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            /// Clear the bits of `other`.
            #[inline]
            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }

            /// Set or clear the bits of `other`.
            #[inline]
            pub fn set(&mut self, other: Self, value: bool) {
                if value {
                    self.insert(other);
                } else {
                    self.remove(other);
                }
            }
        }

        impl BitOr for $name {
            type Output = Self;
            #[inline]
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            #[inline]
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $name {
            type Output = Self;
            #[inline]
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut names = Vec::new();
                $(if self.contains(Self::$flag) { names.push(stringify!($flag)); })*
                let known: $repr = 0 $(| $value)*;
                if self.0 & !known != 0 {
                    return write!(f, "{}({:#x})", stringify!($name), self.0);
                }
                if names.is_empty() {
                    names.push("NONE");
                }
                write!(f, "{}({})", stringify!($name), names.join(" | "))
            }
        }
    };
}

bit_flags! {
    /// Per-material flags.
    MaterialFlags(u16) {
        /// Material ignores lighting.
        SHADELESS = 1,
    }
}

bit_flags! {
    /// Per-mesh flags.
    MeshFlags(u16) {
        /// Index block is gzip-compressed.
        GZIP = 1,
        /// Index elements are 2 bytes instead of 1.
        USHORT_INDICES = 2,
    }
}

bit_flags! {
    /// Per-attribute flags.
    AttributeFlags(u8) {
        /// Attribute data is gzip-compressed.
        GZIP = 1,
    }
}

impl MeshFlags {
    /// Index element width in bytes selected by these flags.
    #[inline]
    pub const fn index_width(self) -> usize {
        if self.contains(Self::USHORT_INDICES) { 2 } else { 1 }
    }
}
