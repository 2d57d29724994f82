//! Text formats of scalar values.
//!
//! | Kind                   | Format                  |
//! |------------------------|-------------------------|
//! | integer, integer*8     | `%20d`                  |
//! | double precision       | `%24.15E`               |
//! | logical                | `T` or `F`              |
//! | character              | the string, trimmed     |

use crate::{kind::RecordKind, value::Scalar};

use super::CodecError;

/// Format a double in the C `%24.15E` style, e.g. `   3.141592653589790E+00`.
#[must_use]
pub fn format_double(value: f64) -> String {
    let text = if value.is_nan() {
        "NAN".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "INF" } else { "-INF" };
        text.to_string()
    } else {
        let formatted = format!("{value:.15E}");
        match formatted
            .split_once('E')
            .and_then(|(mantissa, exponent)| Some((mantissa, exponent.parse::<i32>().ok()?)))
        {
            Some((mantissa, exponent)) => {
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{mantissa}E{sign}{:02}", exponent.unsigned_abs())
            }
            None => formatted,
        }
    };
    format!("{text:>24}")
}

/// Format a scalar as it is written to a record file, without a trailing newline.
#[must_use]
pub fn format_scalar(value: &Scalar) -> String {
    match value {
        Scalar::Integer(value) => format!("{value:>20}"),
        Scalar::Integer64(value) => format!("{value:>20}"),
        Scalar::Double(value) => format_double(*value),
        Scalar::Logical(true) => "T".to_string(),
        Scalar::Logical(false) => "F".to_string(),
        Scalar::Character(value) => value.trim().to_string(),
    }
}

/// Parse a logical from `T`, `F`, `true`, `false`, `.true.` or `.false.` (case insensitive).
#[must_use]
pub fn parse_logical(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | ".true." => Some(true),
        "f" | "false" | ".false." => Some(false),
        _ => None,
    }
}

/// Parse the text of a record of `kind`. Surrounding whitespace is ignored.
///
/// Doubles written with a Fortran `D` exponent (`1.0D+00`) are accepted.
///
/// # Errors
/// Returns [`CodecError::DecodeError`] if `text` is not a valid value of `kind`.
pub fn parse_scalar(kind: RecordKind, text: &str) -> Result<Scalar, CodecError> {
    let text = text.trim();
    let invalid = || CodecError::DecodeError(format!("cannot decode {text:?} as {kind}"));
    match kind {
        RecordKind::Integer => text.parse().map(Scalar::Integer).map_err(|_| invalid()),
        RecordKind::Integer64 => text.parse().map(Scalar::Integer64).map_err(|_| invalid()),
        RecordKind::Double => text
            .replace(['D', 'd'], "E")
            .parse()
            .map(Scalar::Double)
            .map_err(|_| invalid()),
        RecordKind::Logical => parse_logical(text).map(Scalar::Logical).ok_or_else(invalid),
        RecordKind::Character => Ok(Scalar::Character(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_double_fortran_style() {
        assert_eq!(format_double(3.141_592_653_589_79), "   3.141592653589790E+00");
        assert_eq!(format_double(-1.0e-7), "  -1.000000000000000E-07");
        assert_eq!(format_double(6.02e23), "   6.020000000000000E+23");
        assert_eq!(format_double(0.0), "   0.000000000000000E+00");
        assert_eq!(format_double(1.0e-300), "  1.000000000000000E-300");
        assert_eq!(format_double(f64::NAN), "                     NAN");
        assert_eq!(format_double(f64::NEG_INFINITY).trim(), "-INF");
    }

    #[test]
    fn format_scalars() {
        assert_eq!(format_scalar(&42.into()), "                  42");
        assert_eq!(format_scalar(&(-7_i64).into()), "                  -7");
        assert_eq!(format_scalar(&true.into()), "T");
        assert_eq!(format_scalar(&false.into()), "F");
        assert_eq!(format_scalar(&" Mu ".into()), "Mu");
    }

    #[test]
    fn parse_scalars() {
        assert_eq!(
            parse_scalar(RecordKind::Integer, "                  42").unwrap(),
            Scalar::Integer(42)
        );
        assert_eq!(
            parse_scalar(RecordKind::Integer64, "9000000000").unwrap(),
            Scalar::Integer64(9_000_000_000)
        );
        assert_eq!(
            parse_scalar(RecordKind::Double, "   3.141592653589790E+00").unwrap(),
            Scalar::Double(3.141_592_653_589_79)
        );
        assert_eq!(
            parse_scalar(RecordKind::Double, "0.25D+01").unwrap(),
            Scalar::Double(2.5)
        );
        for (text, value) in [("T", true), ("f", false), ("True", true), ("FALSE", false)] {
            assert_eq!(
                parse_scalar(RecordKind::Logical, text).unwrap(),
                Scalar::Logical(value)
            );
        }
        assert_eq!(
            parse_scalar(RecordKind::Character, "  Mu\n").unwrap(),
            Scalar::from("Mu")
        );
        assert!(matches!(
            parse_scalar(RecordKind::Integer, "4.2"),
            Err(CodecError::DecodeError(_))
        ));
        assert!(parse_scalar(RecordKind::Logical, "yes").is_err());
        assert!(parse_scalar(RecordKind::Double, "").is_err());
    }

    #[test]
    fn double_text_round_trip() {
        for value in [3.141_592_653_589_79, -2.5e-12, 1.0 / 3.0, 123_456.789] {
            let Scalar::Double(parsed) =
                parse_scalar(RecordKind::Double, &format_double(value)).unwrap()
            else {
                unreachable!()
            };
            assert!((parsed - value).abs() <= value.abs() * 1e-15);
        }
    }
}
