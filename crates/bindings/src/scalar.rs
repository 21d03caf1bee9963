//! Scalar decoding of typed data
//!
//! Converters use these helpers to read scalar values (trigger metadata
//! fields, simple payloads) out of [`TypedData`] with one coercion policy:
//!
//! - `json` payloads must hold a JSON scalar; lists and objects are rejected.
//! - `string`, `int` and `double` payloads are taken as they are.
//! - `bytes`, `http` and `stream` payloads are not scalars and fail.
//! - A single expected type is reached by coercion when the decoded value has
//!   a different type. A set of expected types is matched exactly and never
//!   coerced, so an ambiguous target is an error rather than a guess.
//! - JSON integers outside the `i64` range stay integers: they fail as `int`
//!   and keep their exact digits as `str`.

use crate::native::{ExpectedType, NativeValue, ScalarType};
use crate::typed_data::{TriggerMetadata, TypedData};
use crate::{Error, Result};

/// Context label used when the caller has nothing more specific
pub const DEFAULT_CONTEXT: &str = "data";

/// Upper bound (exclusive) of floats that truncate into an `i64`
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Decode a scalar from `data`.
///
/// An absent value decodes to [`NativeValue::None`] whatever the expected
/// type. `context` names the value in error messages only.
///
/// # Errors
///
/// - [`Error::InvalidJson`] if a `json` payload does not parse
/// - [`Error::UnexpectedStructure`] if a `json` payload is a list or object
/// - [`Error::UnsupportedDataType`] for `bytes`, `http` and `stream` payloads
/// - [`Error::TypeMismatch`] if the value is not in an expected set
/// - [`Error::Coercion`] if coercion into a single expected type fails
pub fn decode_scalar(
    data: Option<&TypedData>,
    expected: impl Into<ExpectedType>,
    context: &str,
) -> Result<NativeValue> {
    let data = match data {
        Some(data) => data,
        None => return Ok(NativeValue::None),
    };

    match raw_scalar(data, context)? {
        RawScalar::Native(raw) => check_expected(raw, &expected.into(), context),
        RawScalar::WideInt(digits) => check_wide_int(digits, &expected.into(), context),
    }
}

/// Decode the scalar stored under `field` in trigger metadata.
///
/// A missing field decodes to [`NativeValue::None`]. A present field goes
/// through [`decode_scalar`] with the field named in the error context.
pub fn decode_trigger_metadata_field(
    trigger_metadata: &TriggerMetadata,
    field: &str,
    expected: impl Into<ExpectedType>,
) -> Result<NativeValue> {
    match trigger_metadata.get(field) {
        None => Ok(NativeValue::None),
        Some(data) => decode_scalar(
            Some(data),
            expected,
            &format!("field '{}' in trigger metadata", field),
        ),
    }
}

/// Uncoerced result of reading the populated field
enum RawScalar {
    Native(NativeValue),
    /// JSON integer literal outside the `i64` range, kept as its exact digits
    WideInt(String),
}

/// Read the populated field as an uncoerced native scalar
fn raw_scalar(data: &TypedData, context: &str) -> Result<RawScalar> {
    match data {
        TypedData::Json(text) => {
            let parsed: serde_json::Value =
                serde_json::from_str(text).map_err(|source| Error::InvalidJson {
                    context: context.to_string(),
                    source,
                })?;
            json_scalar(parsed, text, context)
        }
        TypedData::String(s) => Ok(RawScalar::Native(NativeValue::Str(s.clone()))),
        TypedData::Int(n) => Ok(RawScalar::Native(NativeValue::Int(*n))),
        TypedData::Double(n) => Ok(RawScalar::Native(NativeValue::Float(*n))),
        other => Err(Error::UnsupportedDataType {
            context: context.to_string(),
            data_type: other.kind(),
        }),
    }
}

/// `text` is the document `value` was parsed from; a scalar document is
/// exactly its literal.
fn json_scalar(value: serde_json::Value, text: &str, context: &str) -> Result<RawScalar> {
    use serde_json::Value;

    let native = match value {
        Value::Array(_) | Value::Object(_) => {
            return Err(Error::UnexpectedStructure {
                context: context.to_string(),
            })
        }
        Value::Null => NativeValue::None,
        Value::Bool(b) => NativeValue::Bool(b),
        Value::String(s) => NativeValue::Str(s),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                NativeValue::Int(i)
            } else if is_integer_literal(text) {
                return Ok(RawScalar::WideInt(text.trim().to_string()));
            } else {
                match n.as_f64() {
                    Some(f) => NativeValue::Float(f),
                    None => {
                        return Err(Error::Coercion {
                            context: context.to_string(),
                            target: ScalarType::Float.name().to_string(),
                            cause: format!("number {} is not representable", n),
                        })
                    }
                }
            }
        }
    };

    Ok(RawScalar::Native(native))
}

fn is_integer_literal(text: &str) -> bool {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Integers outside `i64` are still integers: they never become floats
/// implicitly and keep their digits when read as text.
fn check_wide_int(digits: String, expected: &ExpectedType, context: &str) -> Result<NativeValue> {
    match expected {
        ExpectedType::AnyOf(types) if !types.contains(&ScalarType::Int) => Err(Error::TypeMismatch {
            context: context.to_string(),
            actual: ScalarType::Int.name().to_string(),
            expected: types.iter().map(|ty| ty.name().to_string()).collect(),
        }),
        ExpectedType::AnyOf(_) | ExpectedType::One(ScalarType::Int) => {
            Err(wide_int_out_of_range(&digits, context))
        }
        ExpectedType::One(ScalarType::Str) => Ok(NativeValue::Str(digits)),
        ExpectedType::One(ScalarType::Float) => {
            digits.parse::<f64>().map(NativeValue::Float).map_err(|e| Error::Coercion {
                context: context.to_string(),
                target: ScalarType::Float.name().to_string(),
                cause: format!("invalid literal for float: '{}' ({})", digits, e),
            })
        }
        // Outside i64 means non-zero
        ExpectedType::One(ScalarType::Bool) => Ok(NativeValue::Bool(true)),
    }
}

fn wide_int_out_of_range(digits: &str, context: &str) -> Error {
    Error::Coercion {
        context: context.to_string(),
        target: ScalarType::Int.name().to_string(),
        cause: format!("integer {} is out of integer range", digits),
    }
}

fn check_expected(raw: NativeValue, expected: &ExpectedType, context: &str) -> Result<NativeValue> {
    match expected {
        ExpectedType::AnyOf(types) => {
            if types.iter().any(|ty| ty.matches(&raw)) {
                Ok(raw)
            } else {
                Err(Error::TypeMismatch {
                    context: context.to_string(),
                    actual: raw.type_name().to_string(),
                    expected: types.iter().map(|ty| ty.name().to_string()).collect(),
                })
            }
        }
        ExpectedType::One(target) => {
            if target.matches(&raw) {
                Ok(raw)
            } else {
                coerce(raw, *target).map_err(|cause| Error::Coercion {
                    context: context.to_string(),
                    target: target.name().to_string(),
                    cause,
                })
            }
        }
    }
}

/// Constructor-style conversion of a scalar into `target`
fn coerce(value: NativeValue, target: ScalarType) -> std::result::Result<NativeValue, String> {
    match (target, value) {
        (_, NativeValue::None) => Err("value is none".to_string()),

        (ScalarType::Int, NativeValue::Float(f)) => float_to_int(f).map(NativeValue::Int),
        (ScalarType::Int, NativeValue::Str(s)) => s
            .trim()
            .parse::<i64>()
            .map(NativeValue::Int)
            .map_err(|e| format!("invalid literal for int: '{}' ({})", s, e)),
        (ScalarType::Int, NativeValue::Bool(b)) => Ok(NativeValue::Int(i64::from(b))),

        (ScalarType::Float, NativeValue::Int(n)) => Ok(NativeValue::Float(n as f64)),
        (ScalarType::Float, NativeValue::Str(s)) => s
            .trim()
            .parse::<f64>()
            .map(NativeValue::Float)
            .map_err(|e| format!("invalid literal for float: '{}' ({})", s, e)),
        (ScalarType::Float, NativeValue::Bool(b)) => {
            Ok(NativeValue::Float(if b { 1.0 } else { 0.0 }))
        }

        (ScalarType::Str, NativeValue::Int(n)) => Ok(NativeValue::Str(n.to_string())),
        (ScalarType::Str, NativeValue::Float(f)) => Ok(NativeValue::Str(format_float(f))),
        (ScalarType::Str, NativeValue::Bool(b)) => Ok(NativeValue::Str(b.to_string())),

        (ScalarType::Bool, NativeValue::Int(n)) => Ok(NativeValue::Bool(n != 0)),
        (ScalarType::Bool, NativeValue::Float(f)) => Ok(NativeValue::Bool(f != 0.0)),
        (ScalarType::Bool, NativeValue::Str(s)) => parse_bool(&s).map(NativeValue::Bool),

        (_, other) if target.matches(&other) => Ok(other),
        (_, other) => Err(format!("{} values are not convertible", other.type_name())),
    }
}

fn float_to_int(f: f64) -> std::result::Result<i64, String> {
    if !f.is_finite() {
        return Err(format!("cannot convert float {} to integer", f));
    }

    let truncated = f.trunc();
    if truncated < i64::MIN as f64 || truncated >= I64_UPPER_BOUND {
        return Err(format!("float {} is out of integer range", f));
    }

    Ok(truncated as i64)
}

fn parse_bool(s: &str) -> std::result::Result<bool, String> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("invalid literal for bool: '{}'", s))
    }
}

/// Integral floats keep a trailing `.0` so the text still reads as a float.
/// Non-finite values are written `nan`, `inf` and `-inf`.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f == f64::INFINITY {
        "inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-inf".to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}
