//! Byte buffer layer.
//!
//! Sequential little-endian reads and writes over any `Read`/`Write`, exact
//! length raw transfers, fixed-length ASCII names, and packed multi-field
//! formats such as `"2H"` or `"I3H"`.

mod packed;
mod reader;
mod writer;

pub use packed::{packed_size, parse_format, unpack_f32, unpack_u32, FieldKind, Packed};
pub use reader::IStream;
pub use writer::OStream;
