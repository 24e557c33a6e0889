//! Typed values produced by binding and returned by RPC calls.

use super::schema::{FieldKind, FloatWidth, IntWidth, MessageSchema};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    /// `None` is an unset nested message.
    Message(Option<Message>),
}

impl Value {
    /// Zero default for a kind.
    pub fn zero(kind: &FieldKind) -> Value {
        match kind {
            FieldKind::Int(IntWidth::W8) => Value::I8(0),
            FieldKind::Int(IntWidth::W16) => Value::I16(0),
            FieldKind::Int(IntWidth::W32) => Value::I32(0),
            FieldKind::Int(IntWidth::W64) => Value::I64(0),
            FieldKind::Uint(IntWidth::W8) => Value::U8(0),
            FieldKind::Uint(IntWidth::W16) => Value::U16(0),
            FieldKind::Uint(IntWidth::W32) => Value::U32(0),
            FieldKind::Uint(IntWidth::W64) => Value::U64(0),
            FieldKind::Float(FloatWidth::W32) => Value::F32(0.0),
            FieldKind::Float(FloatWidth::W64) => Value::F64(0.0),
            FieldKind::Bool => Value::Bool(false),
            FieldKind::String => Value::String(String::new()),
            FieldKind::Bytes => Value::Bytes(Vec::new()),
            FieldKind::Repeated(_) => Value::List(Vec::new()),
            FieldKind::Message(_) => Value::Message(None),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Value::I8(v) => *v == 0,
            Value::I16(v) => *v == 0,
            Value::I32(v) => *v == 0,
            Value::I64(v) => *v == 0,
            Value::U8(v) => *v == 0,
            Value::U16(v) => *v == 0,
            Value::U32(v) => *v == 0,
            Value::U64(v) => *v == 0,
            Value::F32(v) => *v == 0.0,
            Value::F64(v) => *v == 0.0,
            Value::Bool(v) => !*v,
            Value::String(v) => v.is_empty(),
            Value::Bytes(v) => v.is_empty(),
            Value::List(v) => v.is_empty(),
            Value::Message(v) => v.is_none(),
        }
    }

    /// Widens any integer variant to `i64`, if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::I64(v) => Some(v),
            Value::U8(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(m) => m.as_ref(),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Message> for Value {
    fn from(m: Message) -> Self {
        Value::Message(Some(m))
    }
}

/// An instance of a message type: ordered `(field name, value)` pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl Message {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// A message with every declared field at its zero default.
    pub fn zero(schema: &MessageSchema) -> Self {
        let fields = schema
            .fields()
            .iter()
            .map(|f| (f.name.clone(), Value::zero(&f.kind)))
            .collect();
        Self {
            type_name: schema.name().to_string(),
            fields,
        }
    }

    /// Builder form of [`Message::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Replace the field's value, or append the field if absent.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
