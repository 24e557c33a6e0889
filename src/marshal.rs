//! Default JSON encoding of RPC results.
//!
//! Two modes, picked by [`MarshalOptions::filter_proto_json`]:
//! - plain: every field is emitted and integers are JSON numbers
//! - proto JSON: zero-valued fields are dropped unless `emit_zero_values`,
//!   and 64-bit integers are strings unless `int64_as_number`
//!
//! Keys are always the wire-key form of the field name.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as Json};

use crate::binding::{Message, Value};
use crate::error::MarshalError;
use crate::naming::to_snake_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MarshalOptions {
    /// Apply proto-JSON rules instead of plain encoding.
    pub filter_proto_json: bool,

    /// With proto-JSON rules, keep zero-valued fields.
    pub emit_zero_values: bool,

    /// With proto-JSON rules, write 64-bit integers as numbers.
    pub int64_as_number: bool,
}

impl Default for MarshalOptions {
    fn default() -> Self {
        Self {
            filter_proto_json: true,
            emit_zero_values: true,
            int64_as_number: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Marshaler {
    options: MarshalOptions,
}

impl Marshaler {
    pub fn new(options: MarshalOptions) -> Self {
        Self { options }
    }

    /// Encode a result message as JSON bytes.
    pub fn json(&self, message: &Message) -> Result<Vec<u8>, MarshalError> {
        let value = self.encode_message(message)?;
        Ok(serde_json::to_vec(&value)?)
    }

    fn encode_message(&self, message: &Message) -> Result<Json, MarshalError> {
        let mut map = Map::new();
        for (name, value) in message.fields() {
            if self.options.filter_proto_json && !self.options.emit_zero_values && value.is_zero() {
                continue;
            }
            map.insert(to_snake_case(name), self.encode_value(name, value)?);
        }
        Ok(Json::Object(map))
    }

    fn encode_value(&self, field: &str, value: &Value) -> Result<Json, MarshalError> {
        let quote_int64 = self.options.filter_proto_json && !self.options.int64_as_number;
        Ok(match value {
            Value::I8(v) => Json::from(*v),
            Value::I16(v) => Json::from(*v),
            Value::I32(v) => Json::from(*v),
            Value::I64(v) if quote_int64 => Json::String(v.to_string()),
            Value::I64(v) => Json::from(*v),
            Value::U8(v) => Json::from(*v),
            Value::U16(v) => Json::from(*v),
            Value::U32(v) => Json::from(*v),
            Value::U64(v) if quote_int64 => Json::String(v.to_string()),
            Value::U64(v) => Json::from(*v),
            Value::F32(v) => float(field, f64::from(*v))?,
            Value::F64(v) => float(field, *v)?,
            Value::Bool(v) => Json::Bool(*v),
            Value::String(v) => Json::String(v.clone()),
            Value::Bytes(v) => Json::String(base64::engine::general_purpose::STANDARD.encode(v)),
            Value::List(items) => Json::Array(
                items
                    .iter()
                    .map(|item| self.encode_value(field, item))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Message(Some(nested)) => self.encode_message(nested)?,
            Value::Message(None) => Json::Null,
        })
    }
}

fn float(field: &str, v: f64) -> Result<Json, MarshalError> {
    Number::from_f64(v).map(Json::Number).ok_or_else(|| MarshalError::NonFinite {
        field: field.to_string(),
    })
}
