//! Error types shared across the gateway.
//!
//! Field-level problems (`ConvertError`, missing values) are normally absorbed
//! by the binder; everything else surfaces to the request lifecycle, which
//! routes it to the configured error handler.

use std::time::Duration;

use thiserror::Error;

/// A raw string could not be converted to the requested kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The value does not parse as the target kind.
    #[error("invalid {kind} value {value:?}")]
    Invalid { kind: String, value: String },

    /// The value parses but does not fit the declared width.
    #[error("{value} out of range for {kind}")]
    OutOfRange { kind: String, value: String },

    /// No scalar converter exists for the kind.
    #[error("not supported kind[{0}]")]
    UnsupportedKind(String),
}

/// Errors produced while binding request data to RPC arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A value was found for a field whose kind has no converter.
    #[error("field {field}: not supported kind[{kind}]")]
    UnsupportedKind { field: String, kind: String },

    /// A malformed value in strict mode.
    #[error("field {field}: {source}")]
    Conversion {
        field: String,
        #[source]
        source: ConvertError,
    },

    /// The positional binder was asked to build a message it has no schema for.
    #[error("no message schema registered for {0}")]
    UnknownMessage(String),
}

/// Error returned by an RPC client call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RpcError {
    pub message: String,
}

impl RpcError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure reported by a switcher.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("dispatch timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure reported by a user-supplied hook (interceptor, preprocessor).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Request-fatal errors handed to the error handler.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("preprocessor rejected request: {0}")]
    Preprocessor(#[source] HookError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Default response serialization failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    #[error("field {field}: non-finite float cannot be encoded as JSON")]
    NonFinite { field: String },

    #[error("json encoding failed: {0}")]
    Json(String),
}

impl From<serde_json::Error> for MarshalError {
    fn from(err: serde_json::Error) -> Self {
        MarshalError::Json(err.to_string())
    }
}
