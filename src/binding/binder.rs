//! Binds untyped request data to typed RPC arguments.
//!
//! Two strategies share the same converter and lookup substrate:
//! - [`Binder::bind_struct`] fills one aggregate request message, recursing
//!   into nested messages depth-first.
//! - [`Binder::bind_args`] fills a flat, ordered list of positional
//!   arguments.
//!
//! Missing or malformed scalars fall back to the kind's zero default and are
//! logged. In strict mode a malformed scalar fails the bind instead.

use crate::error::{BindError, ConvertError};
use crate::http::RpcRequest;
use crate::observability::metrics;

use super::convert::convert;
use super::lookup::find_value;
use super::registry::ConvertorRegistry;
use super::schema::{FieldDescriptor, FieldKind, MessageSchema, SchemaSet};
use super::value::{Message, Value};

#[derive(Debug, Clone, Copy)]
pub struct Binder<'a> {
    convertors: &'a ConvertorRegistry,
    strict: bool,
}

impl<'a> Binder<'a> {
    pub fn new(convertors: &'a ConvertorRegistry) -> Self {
        Self {
            convertors,
            strict: false,
        }
    }

    /// Reject malformed scalars instead of defaulting them.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Build a message of `schema` from the request.
    ///
    /// A nested message field uses its registered convertor when one exists;
    /// otherwise the nested message is bound recursively.
    pub fn bind_struct(
        &self,
        schema: &MessageSchema,
        req: &RpcRequest,
    ) -> Result<Message, BindError> {
        let mut message = Message::new(schema.name());
        for field in schema.fields() {
            let value = match &field.kind {
                FieldKind::Message(nested) => match self.convertors.get(nested.name()) {
                    Some(convertor) => Value::Message(convertor(req)),
                    None => Value::Message(Some(self.bind_struct(nested, req)?)),
                },
                _ => self.bind_scalar(field, req)?,
            };
            message.set(field.name.clone(), value);
        }
        Ok(message)
    }

    /// Build positional arguments, one per descriptor, in order.
    ///
    /// Nested message arguments without a registered convertor are built by
    /// `build_struct_arg`, which receives the message type name.
    pub fn bind_args<F>(
        &self,
        args: &[FieldDescriptor],
        req: &RpcRequest,
        build_struct_arg: F,
    ) -> Result<Vec<Value>, BindError>
    where
        F: Fn(&str, &RpcRequest) -> Result<Value, BindError>,
    {
        let mut params = Vec::with_capacity(args.len());
        for arg in args {
            let value = match &arg.kind {
                FieldKind::Message(nested) => match self.convertors.get(nested.name()) {
                    Some(convertor) => Value::Message(convertor(req)),
                    None => build_struct_arg(nested.name(), req)?,
                },
                _ => self.bind_scalar(arg, req)?,
            };
            params.push(value);
        }
        Ok(params)
    }

    /// Default by-name constructor for [`Binder::bind_args`]: resolves the
    /// schema in `schemas` and binds it as a struct.
    pub fn build_from_schema(
        &self,
        schemas: &SchemaSet,
        type_name: &str,
        req: &RpcRequest,
    ) -> Result<Value, BindError> {
        let schema = schemas
            .get(type_name)
            .ok_or_else(|| BindError::UnknownMessage(type_name.to_string()))?;
        self.bind_struct(schema, req).map(Value::from)
    }

    fn bind_scalar(&self, field: &FieldDescriptor, req: &RpcRequest) -> Result<Value, BindError> {
        let Some(raw) = find_value(&field.name, req) else {
            tracing::debug!(field = %field.name, "Value not found, using default");
            metrics::record_bind_fallback("not_found");
            return Ok(Value::zero(&field.kind));
        };

        match convert(&field.kind, raw) {
            Ok(value) => Ok(value),
            Err(ConvertError::UnsupportedKind(kind)) => Err(BindError::UnsupportedKind {
                field: field.name.clone(),
                kind,
            }),
            Err(source) if self.strict => Err(BindError::Conversion {
                field: field.name.clone(),
                source,
            }),
            Err(err) => {
                tracing::warn!(
                    field = %field.name,
                    error = %err,
                    "Conversion failed, using default"
                );
                metrics::record_bind_fallback("conversion");
                Ok(Value::zero(&field.kind))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::schema::{FloatWidth, IntWidth};
    use axum::http::Method;
    use std::sync::Arc;

    fn profile_schema() -> Arc<MessageSchema> {
        MessageSchema::new("Profile")
            .field("Email", FieldKind::String)
            .field("Verified", FieldKind::Bool)
            .into_arc()
    }

    fn user_schema() -> Arc<MessageSchema> {
        MessageSchema::new("GetUserRequest")
            .field("IdValue", FieldKind::Int(IntWidth::W64))
            .field("Name", FieldKind::String)
            .field("Score", FieldKind::Float(FloatWidth::W64))
            .field("Profile", FieldKind::message(&profile_schema()))
            .into_arc()
    }

    fn request() -> RpcRequest {
        RpcRequest::new(Method::POST, "/user")
    }

    #[test]
    fn test_bind_struct_with_nested() {
        let convertors = ConvertorRegistry::new();
        let req = request()
            .with_form_value("id_value", "42")
            .with_form_value("name", "ada")
            .with_form_value("email", "ada@example.com")
            .with_form_value("verified", "true");

        let msg = Binder::new(&convertors).bind_struct(&user_schema(), &req).unwrap();
        assert_eq!(msg.type_name(), "GetUserRequest");
        assert_eq!(msg.get("IdValue"), Some(&Value::I64(42)));
        assert_eq!(msg.get("Name"), Some(&Value::String("ada".into())));
        assert_eq!(msg.get("Score"), Some(&Value::F64(0.0)));

        let profile = msg.get("Profile").and_then(Value::as_message).unwrap();
        assert_eq!(profile.get("Email").and_then(Value::as_str), Some("ada@example.com"));
        assert_eq!(profile.get("Verified").and_then(Value::as_bool), Some(true));
    }

    #[test]
    fn test_malformed_scalar_defaults_and_continues() {
        let convertors = ConvertorRegistry::new();
        let req = request()
            .with_form_value("id_value", "notanumber")
            .with_form_value("name", "still bound");

        let msg = Binder::new(&convertors).bind_struct(&user_schema(), &req).unwrap();
        assert_eq!(msg.get("IdValue"), Some(&Value::I64(0)));
        assert_eq!(msg.get("Name").and_then(Value::as_str), Some("still bound"));
    }

    #[test]
    fn test_strict_mode_rejects_malformed() {
        let convertors = ConvertorRegistry::new();
        let req = request().with_form_value("id_value", "notanumber");

        let err = Binder::new(&convertors)
            .strict(true)
            .bind_struct(&user_schema(), &req)
            .unwrap_err();
        assert!(matches!(err, BindError::Conversion { ref field, .. } if field == "IdValue"));
    }

    #[test]
    fn test_strict_mode_still_defaults_missing() {
        let convertors = ConvertorRegistry::new();
        let msg = Binder::new(&convertors)
            .strict(true)
            .bind_struct(&user_schema(), &request())
            .unwrap();
        assert_eq!(msg.get("IdValue"), Some(&Value::I64(0)));
    }

    #[test]
    fn test_custom_convertor_overrides_recursion() {
        let convertors = ConvertorRegistry::new();
        convertors.register("Profile", |_req: &RpcRequest| {
            Some(Message::new("Profile").with("Email", "from-convertor"))
        });
        let req = request()
            .with_form_value("email", "from-form")
            .with_form_value("verified", "true");

        let msg = Binder::new(&convertors).bind_struct(&user_schema(), &req).unwrap();
        let profile = msg.get("Profile").and_then(Value::as_message).unwrap();
        assert_eq!(profile.get("Email").and_then(Value::as_str), Some("from-convertor"));
        assert!(profile.get("Verified").is_none());
    }

    #[test]
    fn test_unsupported_kind_is_fatal_when_value_present() {
        let convertors = ConvertorRegistry::new();
        let schema = MessageSchema::new("Upload")
            .field("Name", FieldKind::String)
            .field("Payload", FieldKind::Bytes);

        let ok = Binder::new(&convertors).bind_struct(&schema, &request()).unwrap();
        assert_eq!(ok.get("Payload"), Some(&Value::Bytes(Vec::new())));

        let req = request().with_form_value("payload", "AAAA");
        let err = Binder::new(&convertors).bind_struct(&schema, &req).unwrap_err();
        assert_eq!(
            err,
            BindError::UnsupportedKind {
                field: "Payload".into(),
                kind: "bytes".into()
            }
        );
    }

    #[test]
    fn test_bind_args_preserves_count_and_order() {
        let convertors = ConvertorRegistry::new();
        let schemas = SchemaSet::new().with(profile_schema());
        let binder = Binder::new(&convertors);
        let req = request()
            .with_form_value("user_id", "5")
            .with_form_value("limit", "bogus")
            .with_form_value("email", "x@y.z");

        let args = vec![
            FieldDescriptor::new("UserId", FieldKind::Int(IntWidth::W32)),
            FieldDescriptor::new("Profile", FieldKind::message(&profile_schema())),
            FieldDescriptor::new("Limit", FieldKind::Int(IntWidth::W16)),
            FieldDescriptor::new("Tag", FieldKind::String),
        ];
        let params = binder
            .bind_args(&args, &req, |name, req| binder.build_from_schema(&schemas, name, req))
            .unwrap();

        assert_eq!(params.len(), args.len());
        assert_eq!(params[0], Value::I32(5));
        let profile = params[1].as_message().unwrap();
        assert_eq!(profile.get("Email").and_then(Value::as_str), Some("x@y.z"));
        assert_eq!(params[2], Value::I16(0));
        assert_eq!(params[3], Value::String(String::new()));
    }

    #[test]
    fn test_bind_args_custom_convertor_skips_constructor() {
        let convertors = ConvertorRegistry::new();
        convertors.register("Profile", |_req: &RpcRequest| {
            Some(Message::new("Profile").with("Email", "from-convertor"))
        });
        let req = request()
            .with_form_value("user_id", "3")
            .with_form_value("email", "from-form");
        let args = vec![
            FieldDescriptor::new("UserId", FieldKind::Int(IntWidth::W64)),
            FieldDescriptor::new("Profile", FieldKind::message(&profile_schema())),
        ];

        let calls = std::cell::Cell::new(0);
        let params = Binder::new(&convertors)
            .bind_args(&args, &req, |name, _| {
                calls.set(calls.get() + 1);
                Err(BindError::UnknownMessage(name.into()))
            })
            .unwrap();

        assert_eq!(calls.get(), 0);
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], Value::I64(3));
        assert_eq!(
            params[1],
            Value::Message(Some(Message::new("Profile").with("Email", "from-convertor")))
        );
    }

    #[test]
    fn test_bind_args_empty_descriptors() {
        let convertors = ConvertorRegistry::new();
        let params = Binder::new(&convertors)
            .bind_args(&[], &request(), |name, _| Err(BindError::UnknownMessage(name.into())))
            .unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_bind_args_passes_type_name_to_constructor() {
        let convertors = ConvertorRegistry::new();
        let args = vec![FieldDescriptor::new("Profile", FieldKind::message(&profile_schema()))];
        let params = Binder::new(&convertors)
            .bind_args(&args, &request(), |name, _| Ok(Value::String(name.to_string())))
            .unwrap();
        assert_eq!(params, vec![Value::String("Profile".into())]);
    }

    #[test]
    fn test_bind_args_unknown_message_schema() {
        let convertors = ConvertorRegistry::new();
        let binder = Binder::new(&convertors);
        let schemas = SchemaSet::new();
        let args = vec![FieldDescriptor::new("Profile", FieldKind::message(&profile_schema()))];
        let err = binder
            .bind_args(&args, &request(), |name, req| binder.build_from_schema(&schemas, name, req))
            .unwrap_err();
        assert_eq!(err, BindError::UnknownMessage("Profile".into()));
    }
}
