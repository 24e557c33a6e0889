//! Route table.
//!
//! One [`RouteEntry`] per configured route, in configuration order. The HTTP
//! server groups entries by path; for a method+path pair routed twice the
//! first entry wins.

use axum::http::Method;

use crate::config::RouteConfig;
use crate::routing::matcher::{check_path, parse_methods, RouteError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub methods: Vec<Method>,
    pub path: String,
    pub operation: String,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn from_config(routes: &[RouteConfig]) -> Result<Self, RouteError> {
        let entries = routes
            .iter()
            .map(|route| {
                check_path(&route.path)?;
                Ok(RouteEntry {
                    methods: parse_methods(&route.methods)?,
                    path: route.path.clone(),
                    operation: route.operation.clone(),
                })
            })
            .collect::<Result<Vec<_>, RouteError>>()?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Distinct operation names in route order.
    pub fn operations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !names.contains(&entry.operation.as_str()) {
                names.push(&entry.operation);
            }
        }
        names
    }

    /// Per distinct path (first-seen order), the method → operation bindings
    /// with later duplicates dropped.
    pub fn by_path(&self) -> Vec<(&str, Vec<(Method, &str)>)> {
        let mut grouped: Vec<(&str, Vec<(Method, &str)>)> = Vec::new();
        for entry in &self.entries {
            let index = match grouped.iter().position(|(path, _)| *path == entry.path) {
                Some(index) => index,
                None => {
                    grouped.push((&entry.path, Vec::new()));
                    grouped.len() - 1
                }
            };
            let bindings = &mut grouped[index].1;
            for method in &entry.methods {
                if bindings.iter().any(|(m, _)| m == method) {
                    tracing::warn!(
                        method = %method,
                        path = %entry.path,
                        operation = %entry.operation,
                        "Duplicate route ignored"
                    );
                    continue;
                }
                bindings.push((method.clone(), &entry.operation));
            }
        }
        grouped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
