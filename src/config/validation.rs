//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate route method lists, paths and operation names
//! - Detect conflicting routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::routing::matcher::{check_path, parse_methods, RouteError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route {index}: {source}")]
    Methods {
        index: usize,
        #[source]
        source: RouteError,
    },

    #[error("route {index}: {source}")]
    Path {
        index: usize,
        #[source]
        source: RouteError,
    },

    #[error("route {index}: operation name is empty")]
    EmptyOperation { index: usize },

    #[error("route {index}: {method} {path} is already routed")]
    DuplicateRoute { index: usize, method: String, path: String },

    #[error("timeouts.dispatch_secs must be greater than zero")]
    ZeroTimeout,

    #[error("invalid socket address for {field}: {value:?}")]
    Address { field: &'static str, value: String },
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, route) in config.routes.iter().enumerate() {
        if let Err(source) = check_path(&route.path) {
            errors.push(ValidationError::Path { index, source });
        }
        if route.operation.trim().is_empty() {
            errors.push(ValidationError::EmptyOperation { index });
        }
        match parse_methods(&route.methods) {
            Ok(methods) => {
                for method in methods {
                    if !seen.insert((method.clone(), route.path.clone())) {
                        errors.push(ValidationError::DuplicateRoute {
                            index,
                            method: method.to_string(),
                            path: route.path.clone(),
                        });
                    }
                }
            }
            Err(source) => errors.push(ValidationError::Methods { index, source }),
        }
    }

    if config.timeouts.dispatch_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::Address {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
