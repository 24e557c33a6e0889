//! HTTP method-set parsing and route path checks.
//!
//! # Design Decisions
//! - Method names are case-insensitive and whitespace around commas is ignored
//! - Only the standard methods are accepted, so every parsed method has an
//!   axum `MethodFilter`
//! - Duplicates inside one list collapse, first occurrence wins
//! - Paths are literal: capture and wildcard syntax is rejected up front
//!   instead of reaching the axum router, which panics on `:` and `*` segments

use axum::http::Method;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("method list is empty")]
    EmptyMethods,

    #[error("unknown HTTP method {0:?}")]
    UnknownMethod(String),

    #[error("path {path:?} {reason}")]
    InvalidPath { path: String, reason: &'static str },
}

const SUPPORTED: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
    Method::TRACE,
    Method::CONNECT,
];

/// Parse `"GET,POST"` into methods, preserving order.
pub fn parse_methods(list: &str) -> Result<Vec<Method>, RouteError> {
    let mut methods = Vec::new();
    for name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let upper = name.to_ascii_uppercase();
        let method = SUPPORTED
            .iter()
            .find(|m| m.as_str() == upper)
            .cloned()
            .ok_or_else(|| RouteError::UnknownMethod(name.to_string()))?;
        if !methods.contains(&method) {
            methods.push(method);
        }
    }
    if methods.is_empty() {
        return Err(RouteError::EmptyMethods);
    }
    Ok(methods)
}

/// Accept only literal absolute paths.
pub fn check_path(path: &str) -> Result<(), RouteError> {
    let invalid = |reason| {
        Err(RouteError::InvalidPath {
            path: path.to_string(),
            reason,
        })
    };
    if !path.starts_with('/') {
        return invalid("must start with '/'");
    }
    if path.contains(['{', '}']) {
        return invalid("must not contain '{' or '}'");
    }
    if path.split('/').any(|segment| segment.starts_with([':', '*'])) {
        return invalid("must not have segments starting with ':' or '*'");
    }
    Ok(())
}
