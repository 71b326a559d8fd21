//! Packed multi-field formats, in the spirit of a binary struct format string.
//!
//! Codes: `B` = u8, `H` = u16, `I` = u32, `f` = f32. A decimal prefix repeats
//! the next code (`"I3H"` is one u32 followed by three u16). A leading `<`
//! and whitespace are accepted and ignored; everything is little-endian.

use crate::util::{Error, Result};

/// Kind of one packed field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U16,
    U32,
    F32,
}

impl FieldKind {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'B' => Some(Self::U8),
            'H' => Some(Self::U16),
            'I' => Some(Self::U32),
            'f' => Some(Self::F32),
            _ => None,
        }
    }

    /// Size of the field in bytes.
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }
}

/// One packed value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Packed {
    U8(u8),
    U16(u16),
    U32(u32),
    F32(f32),
}

impl Packed {
    /// Kind of this value.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::U8(_) => FieldKind::U8,
            Self::U16(_) => FieldKind::U16,
            Self::U32(_) => FieldKind::U32,
            Self::F32(_) => FieldKind::F32,
        }
    }

    /// Integer value widened to u32, or None for floats.
    pub fn as_u32(self) -> Option<u32> {
        match self {
            Self::U8(v) => Some(v as u32),
            Self::U16(v) => Some(v as u32),
            Self::U32(v) => Some(v),
            Self::F32(_) => None,
        }
    }

    /// Float value, or None for integers.
    pub fn as_f32(self) -> Option<f32> {
        match self {
            Self::F32(v) => Some(v),
            _ => None,
        }
    }
}

/// Parse a format string into its field list.
pub fn parse_format(fmt: &str) -> Result<Vec<FieldKind>> {
    let body = fmt.strip_prefix('<').unwrap_or(fmt);
    let mut fields = Vec::new();
    let mut repeat: Option<usize> = None;

    for c in body.chars() {
        if c.is_whitespace() {
            continue;
        }
        if let Some(digit) = c.to_digit(10) {
            let n = repeat.unwrap_or(0);
            repeat = Some(
                n.checked_mul(10)
                    .and_then(|n| n.checked_add(digit as usize))
                    .ok_or_else(|| Error::InvalidFormat(format!("repeat count too large in {:?}", fmt)))?,
            );
            continue;
        }
        let kind = FieldKind::from_code(c)
            .ok_or_else(|| Error::InvalidFormat(format!("unknown code {:?} in {:?}", c, fmt)))?;
        let count = repeat.take().unwrap_or(1);
        fields.extend(std::iter::repeat(kind).take(count));
    }

    if repeat.is_some() {
        return Err(Error::InvalidFormat(format!("dangling repeat count in {:?}", fmt)));
    }

    Ok(fields)
}

/// Total byte size of a format string.
pub fn packed_size(fmt: &str) -> Result<usize> {
    Ok(parse_format(fmt)?.iter().map(|k| k.size()).sum())
}

/// Unpack `N` integer fields widened to u32.
pub fn unpack_u32<const N: usize>(fields: &[Packed]) -> Result<[u32; N]> {
    if fields.len() != N {
        return Err(Error::InvalidFormat(format!("expected {} fields, got {}", N, fields.len())));
    }
    let mut out = [0u32; N];
    for (slot, field) in out.iter_mut().zip(fields) {
        *slot = field
            .as_u32()
            .ok_or_else(|| Error::InvalidFormat(format!("expected integer field, got {:?}", field)))?;
    }
    Ok(out)
}

/// Unpack `N` float fields.
pub fn unpack_f32<const N: usize>(fields: &[Packed]) -> Result<[f32; N]> {
    if fields.len() != N {
        return Err(Error::InvalidFormat(format!("expected {} fields, got {}", N, fields.len())));
    }
    let mut out = [0f32; N];
    for (slot, field) in out.iter_mut().zip(fields) {
        *slot = field
            .as_f32()
            .ok_or_else(|| Error::InvalidFormat(format!("expected float field, got {:?}", field)))?;
    }
    Ok(out)
}
