//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::marshal::MarshalOptions;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The RPC service being fronted.
    pub service: ServiceConfig,

    /// Route definitions mapping HTTP method+path to operations.
    pub routes: Vec<RouteConfig>,

    /// Default response marshaling.
    pub marshal: MarshalOptions,

    /// Argument binding policy.
    pub binding: BindingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service name; the generated client type is `<name>Client`.
    pub name: String,

    /// Service source root. Generated code goes to `<root>/gen/`.
    pub root: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "Service".to_string(),
            root: ".".to_string(),
        }
    }
}

/// One HTTP route. Accepts either a table or a `[methods, path, operation]` tuple.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "RouteSpec")]
pub struct RouteConfig {
    /// Comma-separated HTTP methods, e.g. "GET,POST".
    pub methods: String,

    /// Path, matched exactly.
    pub path: String,

    /// Operation name handed to the switcher.
    pub operation: String,
}

impl RouteConfig {
    pub fn new(
        methods: impl Into<String>,
        path: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            methods: methods.into(),
            path: path.into(),
            operation: operation.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RouteSpec {
    Tuple(String, String, String),
    Table {
        methods: String,
        path: String,
        operation: String,
    },
}

impl From<RouteSpec> for RouteConfig {
    fn from(spec: RouteSpec) -> Self {
        match spec {
            RouteSpec::Tuple(methods, path, operation)
            | RouteSpec::Table {
                methods,
                path,
                operation,
            } => RouteConfig {
                methods,
                path,
                operation,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Reject malformed field values instead of defaulting them.
    pub strict: bool,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound on one switcher dispatch, in seconds.
    pub dispatch_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { dispatch_secs: 30 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum form body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
