//! String to typed-value conversion, one rule per scalar kind.

use std::str::FromStr;

use crate::error::ConvertError;

use super::schema::{FieldKind, FloatWidth, IntWidth};
use super::value::Value;

/// Convert `raw` to a value of `kind`.
///
/// Signed and unsigned integers parse as 64-bit and are then narrowed to the
/// declared width; a value that does not fit is rejected rather than
/// truncated. Kinds without a scalar rule yield `UnsupportedKind`.
pub fn convert(kind: &FieldKind, raw: &str) -> Result<Value, ConvertError> {
    match kind {
        FieldKind::Int(width) => {
            let v: i64 = parse(kind, raw)?;
            narrow_int(kind, raw, *width, v)
        }
        FieldKind::Uint(width) => {
            let v: u64 = parse(kind, raw)?;
            narrow_uint(kind, raw, *width, v)
        }
        FieldKind::Float(width) => {
            let v: f64 = parse(kind, raw)?;
            Ok(match width {
                FloatWidth::W32 => Value::F32(v as f32),
                FloatWidth::W64 => Value::F64(v),
            })
        }
        FieldKind::Bool => parse_bool(raw).map(Value::Bool).ok_or_else(|| invalid(kind, raw)),
        FieldKind::String => Ok(Value::String(raw.to_string())),
        other => Err(ConvertError::UnsupportedKind(other.to_string())),
    }
}

/// Standard lexical booleans.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn parse<T: FromStr>(kind: &FieldKind, raw: &str) -> Result<T, ConvertError> {
    raw.parse::<T>().map_err(|_| invalid(kind, raw))
}

fn narrow_int(kind: &FieldKind, raw: &str, width: IntWidth, v: i64) -> Result<Value, ConvertError> {
    let out_of_range = || ConvertError::OutOfRange {
        kind: kind.to_string(),
        value: raw.to_string(),
    };
    Ok(match width {
        IntWidth::W8 => Value::I8(i8::try_from(v).map_err(|_| out_of_range())?),
        IntWidth::W16 => Value::I16(i16::try_from(v).map_err(|_| out_of_range())?),
        IntWidth::W32 => Value::I32(i32::try_from(v).map_err(|_| out_of_range())?),
        IntWidth::W64 => Value::I64(v),
    })
}

fn narrow_uint(
    kind: &FieldKind,
    raw: &str,
    width: IntWidth,
    v: u64,
) -> Result<Value, ConvertError> {
    let out_of_range = || ConvertError::OutOfRange {
        kind: kind.to_string(),
        value: raw.to_string(),
    };
    Ok(match width {
        IntWidth::W8 => Value::U8(u8::try_from(v).map_err(|_| out_of_range())?),
        IntWidth::W16 => Value::U16(u16::try_from(v).map_err(|_| out_of_range())?),
        IntWidth::W32 => Value::U32(u32::try_from(v).map_err(|_| out_of_range())?),
        IntWidth::W64 => Value::U64(v),
    })
}

fn invalid(kind: &FieldKind, raw: &str) -> ConvertError {
    ConvertError::Invalid {
        kind: kind.to_string(),
        value: raw.to_string(),
    }
}
