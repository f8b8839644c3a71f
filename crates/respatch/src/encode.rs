//! Value Encoder: turns a pattern kind and a target resolution into bytes.

use std::fmt;

use serde::Serialize;

use crate::pattern::{PatchKind, Sentinel};
use crate::resolution::Resolution;

/// Widest field any pattern writes
pub const MAX_FIELD_WIDTH: usize = 8;

/// Encoded field contents, at most [`MAX_FIELD_WIDTH`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBytes {
    buf: [u8; MAX_FIELD_WIDTH],
    len: usize,
}

impl FieldBytes {
    fn from_parts(parts: &[&[u8]]) -> Self {
        let mut buf = [0u8; MAX_FIELD_WIDTH];
        let mut len = 0;
        for part in parts {
            buf[len..len + part.len()].copy_from_slice(part);
            len += part.len();
        }
        Self { buf, len }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for FieldBytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// The value a patch writes, kept for logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    U32(u32),
    F32(f32),
    F64(f64),
    U32Pair(u32, u32),
    F32Pair(f32, f32),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U32(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{:?}", v),
            Self::F64(v) => write!(f, "{:?}", v),
            Self::U32Pair(w, h) => write!(f, "{}x{}", w, h),
            Self::F32Pair(w, h) => write!(f, "{:?}x{:?}", w, h),
        }
    }
}

/// Bytes to write for one match, relative to the match start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchField {
    /// Distance from the match start to the first written byte
    pub delta: usize,
    pub bytes: FieldBytes,
    pub value: FieldValue,
}

/// Encode the field a pattern kind writes for `target`.
pub fn encode(kind: PatchKind, target: Resolution) -> PatchField {
    let Resolution { width, height } = target;
    let delta = kind.write_offset();

    let (bytes, value) = match kind {
        PatchKind::Width { .. } => (
            FieldBytes::from_parts(&[&width.to_le_bytes()]),
            FieldValue::U32(width),
        ),
        PatchKind::Height { .. } => (
            FieldBytes::from_parts(&[&height.to_le_bytes()]),
            FieldValue::U32(height),
        ),
        PatchKind::RawFloatPair => {
            let (w, h) = (width as f32, height as f32);
            (
                FieldBytes::from_parts(&[&w.to_le_bytes(), &h.to_le_bytes()]),
                FieldValue::F32Pair(w, h),
            )
        }
        PatchKind::UIntPair => (
            FieldBytes::from_parts(&[&width.to_le_bytes(), &height.to_le_bytes()]),
            FieldValue::U32Pair(width, height),
        ),
        PatchKind::DoubleHeight => {
            let h = height as f64;
            (
                FieldBytes::from_parts(&[&h.to_le_bytes()]),
                FieldValue::F64(h),
            )
        }
        PatchKind::FloatBias(Sentinel::Single(v)) => (
            FieldBytes::from_parts(&[&v.to_le_bytes()]),
            FieldValue::F32(v),
        ),
        PatchKind::FloatBias(Sentinel::Double(v)) => (
            FieldBytes::from_parts(&[&v.to_le_bytes()]),
            FieldValue::F64(v),
        ),
    };

    debug_assert_eq!(bytes.len(), kind.field_width());
    PatchField {
        delta,
        bytes,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QHD: Resolution = Resolution::new(2560, 1440);

    #[test]
    fn test_encode_width_u32() {
        let field = encode(PatchKind::Width { offset: 3 }, Resolution::new(3840, 2160));
        assert_eq!(field.delta, 3);
        assert_eq!(field.bytes.as_slice(), &[0x00, 0x0F, 0x00, 0x00]);
        assert_eq!(field.value, FieldValue::U32(3840));
    }

    #[test]
    fn test_encode_height_u32() {
        let field = encode(PatchKind::Height { offset: 1 }, QHD);
        assert_eq!(field.delta, 1);
        assert_eq!(u32::from_le_bytes(field.bytes.as_slice().try_into().unwrap()), 1440);
    }

    #[test]
    fn test_encode_float_pair() {
        let field = encode(PatchKind::RawFloatPair, QHD);
        let bytes = field.bytes.as_slice();
        assert_eq!(field.delta, 0);
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes[..4], [0x00, 0x00, 0x20, 0x45]);
        assert_eq!(bytes[4..], [0x00, 0x00, 0xB4, 0x44]);
        assert_eq!(f32::from_le_bytes(bytes[..4].try_into().unwrap()), 2560.0);
        assert_eq!(f32::from_le_bytes(bytes[4..].try_into().unwrap()), 1440.0);
    }

    #[test]
    fn test_encode_uint_pair() {
        let field = encode(PatchKind::UIntPair, QHD);
        let bytes = field.bytes.as_slice();
        assert_eq!(u32::from_le_bytes(bytes[..4].try_into().unwrap()), 2560);
        assert_eq!(u32::from_le_bytes(bytes[4..].try_into().unwrap()), 1440);
        assert_eq!(field.value.to_string(), "2560x1440");
    }

    #[test]
    fn test_encode_double_height() {
        let field = encode(PatchKind::DoubleHeight, QHD);
        assert_eq!(f64::from_le_bytes(field.bytes.as_slice().try_into().unwrap()), 1440.0);
        assert_eq!(field.value.to_string(), "1440.0");
    }

    #[test]
    fn test_encode_float_bias_ignores_resolution() {
        let kind = PatchKind::FloatBias(Sentinel::Single(-0.5));
        let a = encode(kind, QHD);
        let b = encode(kind, Resolution::new(1920, 1080));
        assert_eq!(a, b);
        assert_eq!(a.bytes.as_slice(), (-0.5f32).to_le_bytes());

        let double = encode(PatchKind::FloatBias(Sentinel::Double(0.75)), QHD);
        assert_eq!(double.bytes.as_slice(), 0.75f64.to_le_bytes());
    }

    #[test]
    fn test_float_pair_display() {
        assert_eq!(FieldValue::F32Pair(2560.0, 1440.0).to_string(), "2560.0x1440.0");
    }
}
