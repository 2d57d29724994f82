//! The serialization layer: text formats of scalar and array records and the gzip compression of arrays.

mod array_text;
mod gzip;
mod scalar;

use thiserror::Error;

pub use array_text::{decode_array_text, encode_array_text};
pub use gzip::{GzipCodec, GzipCompressionLevel, GzipCompressionLevelError};
pub use scalar::{format_double, format_scalar, parse_logical, parse_scalar};

use crate::{
    array::{Array, ArrayShape},
    kind::RecordKind,
    value::Scalar,
};

/// A codec error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The rank stored in an array record differs from the expected rank.
    #[error("array rank {0} does not match the expected rank {1}")]
    RankMismatch(usize, usize),
    /// The extents stored in an array record differ from the expected shape.
    #[error("array shape {0:?} does not match the expected shape {1:?}")]
    ShapeMismatch(ArrayShape, ArrayShape),
    /// Malformed record text.
    #[error("{0}")]
    DecodeError(String),
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

/// Encode a scalar record file.
#[must_use]
pub fn encode_scalar(value: &Scalar) -> Vec<u8> {
    let mut text = format_scalar(value);
    text.push('\n');
    text.into_bytes()
}

/// Decode a scalar record file. Only the first line is considered.
///
/// # Errors
/// Returns [`CodecError::DecodeError`] if the file is not valid UTF-8 or its first line is not a valid value of `kind`.
pub fn decode_scalar(kind: RecordKind, bytes: &[u8]) -> Result<Scalar, CodecError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| CodecError::DecodeError(format!("record is not valid UTF-8: {err}")))?;
    parse_scalar(kind, text.lines().next().unwrap_or_default())
}

/// Encode an array record file: the array text, gzip compressed.
///
/// # Errors
/// Returns [`CodecError::IOError`] if compression fails.
pub fn encode_array(array: &Array, gzip: &GzipCodec) -> Result<Vec<u8>, CodecError> {
    Ok(gzip.encode(encode_array_text(array).into_bytes())?)
}

/// Decode an array record file, checking it holds an array of `rank` with `shape`.
///
/// # Errors
/// Returns a [`CodecError`] if decompression fails or the text is inconsistent with `rank` and `shape`
/// (see [`decode_array_text`]).
pub fn decode_array(
    kind: RecordKind,
    bytes: Vec<u8>,
    rank: usize,
    shape: &[usize],
    gzip: &GzipCodec,
) -> Result<Array, CodecError> {
    let decoded = gzip.decode(bytes)?;
    let text = String::from_utf8(decoded)
        .map_err(|err| CodecError::DecodeError(format!("record is not valid UTF-8: {err}")))?;
    decode_array_text(kind, &text, rank, shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_record_round_trip() {
        for value in [
            Scalar::Integer(42),
            Scalar::Integer64(-9_000_000_000),
            Scalar::Double(3.141_592_653_589_79),
            Scalar::Logical(true),
            Scalar::from("Mu"),
        ] {
            let bytes = encode_scalar(&value);
            assert!(bytes.ends_with(b"\n"));
            assert_eq!(decode_scalar(value.kind(), &bytes).unwrap(), value);
        }
        assert!(decode_scalar(RecordKind::Character, &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn array_record_round_trip() {
        let gzip = GzipCodec::default();
        for kind in RecordKind::ALL {
            let elements: Vec<Scalar> = (0..6)
                .map(|i| match kind {
                    RecordKind::Integer => Scalar::Integer(i),
                    RecordKind::Integer64 => Scalar::Integer64(i64::from(i) << 40),
                    RecordKind::Double => Scalar::Double(f64::from(i) * 0.5),
                    RecordKind::Logical => Scalar::Logical(i % 2 == 0),
                    RecordKind::Character => Scalar::Character(format!("label{i}")),
                })
                .collect();
            for shape in [vec![6], vec![2, 3]] {
                let array = Array::new(kind, shape.clone(), elements.clone()).unwrap();
                let bytes = encode_array(&array, &gzip).unwrap();
                let decoded = decode_array(kind, bytes, shape.len(), &shape, &gzip).unwrap();
                assert_eq!(decoded, array);
            }
        }
    }
}
