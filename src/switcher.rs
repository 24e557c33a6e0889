//! Dispatch contract and the static operation table.
//!
//! A [`Switcher`] maps an operation name to an RPC invocation. The gateway
//! does not care how: [`StaticSwitcher`] is a deterministic table of
//! operation name → argument shape → invocation thunk, the same shape the
//! code generator emits.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::binding::{
    Binder, ConvertorRegistry, FieldDescriptor, FieldKind, Message, MessageSchema, SchemaSet, Value,
};
use crate::config::GatewayConfig;
use crate::error::{DispatchError, GatewayError, RpcError};
use crate::http::{ResponseSink, RpcRequest};

/// What a successful switch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// A result for the postprocessor or default marshaling.
    Reply(Message),
    /// The switcher wrote the response itself.
    Written,
}

pub trait Switcher: Send + Sync {
    fn switch<'a>(
        &'a self,
        operation: &'a str,
        resp: &'a mut ResponseSink,
        req: &'a RpcRequest,
    ) -> BoxFuture<'a, Result<Dispatched, DispatchError>>;
}

/// Body written for an operation the switcher does not know.
pub fn unknown_operation_body(operation: &str) -> String {
    format!("No such grpc method[{operation}]")
}

/// Writes the response for preprocessor and dispatch failures.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, resp: &mut ResponseSink, req: &RpcRequest, err: &GatewayError);
}

impl<F> ErrorHandler for F
where
    F: Fn(&mut ResponseSink, &RpcRequest, &GatewayError) + Send + Sync,
{
    fn handle(&self, resp: &mut ResponseSink, req: &RpcRequest, err: &GatewayError) {
        self(resp, req, err)
    }
}

/// Writes the error text and a newline with a status that matches the failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, resp: &mut ResponseSink, req: &RpcRequest, err: &GatewayError) {
        let status = match err {
            GatewayError::Preprocessor(_) => StatusCode::BAD_REQUEST,
            GatewayError::Dispatch(DispatchError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(
            request_id = %req.request_id,
            status = %status,
            error = %err,
            "Request failed"
        );
        resp.set_status(status);
        resp.insert_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        resp.write(format!("{err}\n"));
    }
}

/// How an operation takes its arguments.
#[derive(Debug, Clone)]
pub enum ArgShape {
    /// One aggregate request message.
    Struct(Arc<MessageSchema>),
    /// Individually ordered parameters.
    Positional(Vec<FieldDescriptor>),
}

/// Bound arguments handed to an invocation thunk.
#[derive(Debug, Clone, PartialEq)]
pub enum Args {
    Struct(Message),
    Positional(Vec<Value>),
}

impl Args {
    pub fn into_message(self) -> Option<Message> {
        match self {
            Args::Struct(m) => Some(m),
            Args::Positional(_) => None,
        }
    }

    pub fn into_positional(self) -> Option<Vec<Value>> {
        match self {
            Args::Positional(v) => Some(v),
            Args::Struct(_) => None,
        }
    }
}

/// Calls the RPC client with bound arguments.
pub type Invoker =
    Arc<dyn Fn(Args, &RpcRequest) -> BoxFuture<'static, Result<Message, RpcError>> + Send + Sync>;

#[derive(Clone)]
struct Operation {
    shape: ArgShape,
    invoke: Invoker,
}

/// Dispatch table keyed by operation name.
pub struct StaticSwitcher {
    operations: HashMap<String, Operation>,
    convertors: Arc<ConvertorRegistry>,
    schemas: Arc<SchemaSet>,
    strict: bool,
}

impl StaticSwitcher {
    pub fn builder() -> StaticSwitcherBuilder {
        StaticSwitcherBuilder::default()
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.operations.contains_key(operation)
    }

    /// Registered operation names, sorted.
    pub fn operations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn convertors(&self) -> &Arc<ConvertorRegistry> {
        &self.convertors
    }

    fn bind(&self, shape: &ArgShape, req: &RpcRequest) -> Result<Args, DispatchError> {
        let binder = Binder::new(&self.convertors).strict(self.strict);
        let args = match shape {
            ArgShape::Struct(schema) => Args::Struct(binder.bind_struct(schema, req)?),
            ArgShape::Positional(descriptors) => {
                let params = binder.bind_args(descriptors, req, |name, req| {
                    binder.build_from_schema(&self.schemas, name, req)
                })?;
                Args::Positional(params)
            }
        };
        Ok(args)
    }
}

impl Switcher for StaticSwitcher {
    fn switch<'a>(
        &'a self,
        operation: &'a str,
        resp: &'a mut ResponseSink,
        req: &'a RpcRequest,
    ) -> BoxFuture<'a, Result<Dispatched, DispatchError>> {
        let Some(op) = self.operations.get(operation) else {
            tracing::warn!(request_id = %req.request_id, operation, "No such operation");
            resp.write(unknown_operation_body(operation));
            return futures_util::future::ready(Ok(Dispatched::Written)).boxed();
        };

        let call = self.bind(&op.shape, req).map(|args| (op.invoke)(args, req));
        async move {
            let reply = call?.await?;
            Ok::<_, DispatchError>(Dispatched::Reply(reply))
        }
        .boxed()
    }
}

impl fmt::Debug for StaticSwitcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSwitcher")
            .field("operations", &self.operations())
            .field("strict", &self.strict)
            .finish()
    }
}

#[derive(Default)]
pub struct StaticSwitcherBuilder {
    operations: HashMap<String, Operation>,
    convertors: Option<Arc<ConvertorRegistry>>,
    schemas: SchemaSet,
    strict: bool,
}

impl StaticSwitcherBuilder {
    /// Builder seeded with the configured binding policy.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::default().strict(config.binding.strict)
    }

    /// Register an operation. Struct schemas (and their nested messages) are
    /// also made available to positional arguments by type name.
    pub fn operation<F>(mut self, name: impl Into<String>, shape: ArgShape, invoke: F) -> Self
    where
        F: Fn(Args, &RpcRequest) -> BoxFuture<'static, Result<Message, RpcError>>
            + Send
            + Sync
            + 'static,
    {
        match &shape {
            ArgShape::Struct(schema) => self.schemas.register(Arc::clone(schema)),
            ArgShape::Positional(descriptors) => {
                for descriptor in descriptors {
                    if let FieldKind::Message(schema) = &descriptor.kind {
                        self.schemas.register(Arc::clone(schema));
                    }
                }
            }
        }
        self.operations.insert(
            name.into(),
            Operation {
                shape,
                invoke: Arc::new(invoke),
            },
        );
        self
    }

    pub fn convertors(mut self, convertors: Arc<ConvertorRegistry>) -> Self {
        self.convertors = Some(convertors);
        self
    }

    /// Additional schemas for positional message arguments.
    pub fn schema(mut self, schema: Arc<MessageSchema>) -> Self {
        self.schemas.register(schema);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn build(self) -> StaticSwitcher {
        StaticSwitcher {
            operations: self.operations,
            convertors: self.convertors.unwrap_or_default(),
            schemas: Arc::new(self.schemas),
            strict: self.strict,
        }
    }
}
