//! Argument binding subsystem.
//!
//! # Data Flow
//! ```text
//! RpcRequest (form data + request context)
//!     → lookup.rs (find raw string: form wire key → ctx name → ctx wire key)
//!     → convert.rs (string → typed Value for the field's kind)
//!     → binder.rs (walk MessageSchema / positional descriptors)
//!     → Message or Vec<Value> handed to the RPC invocation
//!
//! Nested messages:
//!     registry.rs convertor registered → use its output as-is
//!     otherwise → recurse (struct) or build by type name (positional)
//! ```
//!
//! # Design Decisions
//! - Shapes are declared schemas, not runtime type inspection
//! - Field-level failures degrade to zero defaults; only unsupported kinds
//!   (and malformed values in strict mode) fail a bind
//! - Raw values are borrowed from the request and never modified

pub mod binder;
pub mod convert;
pub mod lookup;
pub mod registry;
pub mod schema;
pub mod value;

pub use binder::Binder;
pub use convert::convert;
pub use lookup::find_value;
pub use registry::{ConvertorRegistry, MessageConvertor};
pub use schema::{FieldDescriptor, FieldKind, FloatWidth, IntWidth, MessageSchema, SchemaSet};
pub use value::{Message, Value};
