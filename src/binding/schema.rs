//! Declared argument shapes.
//!
//! The binder walks these descriptions instead of inspecting live types.
//! Schemas are static and finite, so nested messages need no cycle checks.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    W32,
    W64,
}

/// Target kind of a field or positional argument.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Int(IntWidth),
    Uint(IntWidth),
    Float(FloatWidth),
    Bool,
    String,
    Bytes,
    Repeated(Box<FieldKind>),
    /// Pointer to a nested message.
    Message(Arc<MessageSchema>),
}

impl FieldKind {
    pub fn message(schema: &Arc<MessageSchema>) -> Self {
        FieldKind::Message(Arc::clone(schema))
    }

    pub fn repeated(inner: FieldKind) -> Self {
        FieldKind::Repeated(Box::new(inner))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = |w: IntWidth| match w {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        };
        match self {
            FieldKind::Int(w) => write!(f, "int{}", bits(*w)),
            FieldKind::Uint(w) => write!(f, "uint{}", bits(*w)),
            FieldKind::Float(FloatWidth::W32) => write!(f, "float32"),
            FieldKind::Float(FloatWidth::W64) => write!(f, "float64"),
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::String => write!(f, "string"),
            FieldKind::Bytes => write!(f, "bytes"),
            FieldKind::Repeated(inner) => write!(f, "repeated {}", inner),
            FieldKind::Message(schema) => write!(f, "message {}", schema.name()),
        }
    }
}

/// A named field (or positional argument) and its target kind.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Exported-style name, e.g. `UserId`.
    pub name: String,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Shape of one message type.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSchema {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl MessageSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, keeping declaration order.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDescriptor::new(name, kind));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn into_arc(self) -> Arc<MessageSchema> {
        Arc::new(self)
    }
}

/// Message schemas addressable by type name.
///
/// The positional binder only knows a nested argument's type name, so it
/// resolves the schema through this set.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    schemas: HashMap<String, Arc<MessageSchema>>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema and every message schema reachable from it.
    pub fn register(&mut self, schema: Arc<MessageSchema>) {
        for field in schema.fields() {
            if let FieldKind::Message(nested) = &field.kind {
                if !self.schemas.contains_key(nested.name()) {
                    self.register(Arc::clone(nested));
                }
            }
        }
        self.schemas.insert(schema.name().to_string(), schema);
    }

    pub fn with(mut self, schema: Arc<MessageSchema>) -> Self {
        self.register(schema);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<MessageSchema>> {
        self.schemas.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
