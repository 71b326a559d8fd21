//! Codec trait shared by every on-disk entity.
//!
//! The entity set is closed (attribute, mesh, model, material, body), so the
//! trait is only used statically.

use std::io::{Read, Write};

use crate::stream::{IStream, OStream};
use crate::util::Result;

/// Binary encoding of one container entity.
pub trait Codec: Sized {
    /// Read one entity from the current stream position.
    fn decode<R: Read>(stream: &mut IStream<R>) -> Result<Self>;

    /// Write this entity at the current stream position.
    fn encode<W: Write>(&self, stream: &mut OStream<W>) -> Result<()>;

    /// Decode an entity from a byte slice.
    ///
    /// Trailing bytes after the entity are ignored.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut stream = IStream::new(bytes);
        Self::decode(&mut stream)
    }

    /// Encode this entity into a fresh byte vector.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut stream = OStream::new(Vec::new());
        self.encode(&mut stream)?;
        Ok(stream.into_inner())
    }
}
