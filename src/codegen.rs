//! Offline generator for the dispatch table.
//!
//! Renders `<service.root>/gen/switcher.rs`: one [`StaticSwitcher`]
//! registration per routed operation, each binding a struct request built by
//! `schemas::<operation>_request()` and calling `<Service>Client::<operation>`.
//!
//! [`StaticSwitcher`]: crate::switcher::StaticSwitcher

use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{context, Environment};
use serde::Serialize;
use thiserror::Error;

use crate::config::GatewayConfig;
use crate::naming::to_snake_case;
use crate::routing::{RouteError, RouteTable};

const SWITCHER_TEMPLATE: &str = r#"// Code generated by rpc-gateway. DO NOT EDIT.
// service: {{ service }}

use std::sync::Arc;

use futures_util::FutureExt;
use rpc_gateway::switcher::{ArgShape, StaticSwitcher};

use super::client::{{ client }};
use super::schemas;

pub fn switcher(client: Arc<{{ client }}>) -> StaticSwitcher {
    StaticSwitcher::builder()
        .strict({{ strict }})
{% for op in operations %}
        .operation("{{ op.name }}", ArgShape::Struct(schemas::{{ op.ident }}_request()), {
            let client = Arc::clone(&client);
            move |args, req| {
                let client = Arc::clone(&client);
                let req = req.clone();
                async move { client.{{ op.ident }}(args, &req).await }.boxed()
            }
        })
{% endfor %}
        .build()
}
"#;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("invalid route: {0}")]
    Route(#[from] RouteError),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize)]
struct OperationEntry {
    name: String,
    ident: String,
}

/// Render the switcher source for the configured routes.
pub fn render_switcher(config: &GatewayConfig) -> Result<String, CodegenError> {
    let table = RouteTable::from_config(&config.routes)?;
    let operations: Vec<OperationEntry> = table
        .operations()
        .into_iter()
        .map(|name| OperationEntry {
            name: name.to_string(),
            ident: to_snake_case(name),
        })
        .collect();

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.add_template("switcher.rs", SWITCHER_TEMPLATE)?;

    let rendered = env.get_template("switcher.rs")?.render(context! {
        service => config.service.name,
        client => format!("{}Client", config.service.name),
        strict => config.binding.strict,
        operations => operations,
    })?;
    Ok(rendered)
}

/// Write `<service.root>/gen/switcher.rs`, creating `gen/` when missing.
pub fn generate_switcher(config: &GatewayConfig) -> Result<PathBuf, CodegenError> {
    let source = render_switcher(config)?;
    let dir = Path::new(&config.service.root).join("gen");
    fs::create_dir_all(&dir).map_err(|source| CodegenError::Io {
        path: dir.clone(),
        source,
    })?;

    let path = dir.join("switcher.rs");
    fs::write(&path, source).map_err(|source| CodegenError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), operations = config.routes.len(), "Generated switcher");
    Ok(path)
}
