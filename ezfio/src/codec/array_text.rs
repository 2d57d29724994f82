//! The text layout of array records (before compression).
//!
//! ```text
//!   2
//!                    2                    3
//!                    1
//!                    2
//!                  ...
//! ```
//! Line 1 is the rank (`%3d`), line 2 holds each extent as `%20d ` and the remaining lines hold one element
//! each, in storage order (first dimension fastest).

use std::fmt::Write;

use crate::{
    array::{Array, ArrayShape},
    kind::RecordKind,
};

use super::{format_scalar, parse_scalar, CodecError};

/// Encode `array` as array record text.
#[must_use]
pub fn encode_array_text(array: &Array) -> String {
    let mut text = String::with_capacity(32 + array.num_elements() * 25);
    let _ = writeln!(text, "{:>3}", array.rank());
    for extent in array.shape() {
        let _ = write!(text, "{extent:>20} ");
    }
    text.push('\n');
    for element in array.elements() {
        text.push_str(&format_scalar(element));
        text.push('\n');
    }
    text
}

/// Decode array record text, checking the header against the expected `rank` and `shape`.
///
/// # Errors
/// Returns
///  - [`CodecError::RankMismatch`] if the stored rank differs from `rank`,
///  - [`CodecError::ShapeMismatch`] if the stored extents differ from `shape`,
///  - [`CodecError::DecodeError`] if the header or an element is malformed, or there are too few or too many elements.
pub fn decode_array_text(
    kind: RecordKind,
    text: &str,
    rank: usize,
    shape: &[usize],
) -> Result<Array, CodecError> {
    let mut lines = text.lines();

    let rank_line = lines.next().unwrap_or_default();
    let rank_read: usize = rank_line
        .trim()
        .parse()
        .map_err(|_| CodecError::DecodeError(format!("invalid array rank {rank_line:?}")))?;
    if rank_read != rank {
        return Err(CodecError::RankMismatch(rank_read, rank));
    }

    let shape_line = lines.next().unwrap_or_default();
    let shape_read = shape_line
        .split_whitespace()
        .map(str::parse::<usize>)
        .collect::<Result<ArrayShape, _>>()
        .map_err(|_| CodecError::DecodeError(format!("invalid array shape {shape_line:?}")))?;
    if shape_read != shape {
        return Err(CodecError::ShapeMismatch(shape_read, shape.to_vec()));
    }

    let num_elements = shape.iter().product::<usize>();
    let elements = lines
        .by_ref()
        .take(num_elements)
        .map(|line| parse_scalar(kind, line))
        .collect::<Result<Vec<_>, _>>()?;
    let trailing = lines.filter(|line| !line.trim().is_empty()).count();
    if elements.len() != num_elements || trailing > 0 {
        return Err(CodecError::DecodeError(format!(
            "got {} array elements, expected {num_elements}",
            elements.len() + trailing
        )));
    }

    Array::new(kind, shape.to_vec(), elements)
        .map_err(|err| CodecError::DecodeError(err.to_string()))
}
