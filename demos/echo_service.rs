//! Echo service behind the gateway.
//!
//! ```text
//! cargo run --example echo_service
//! curl 'http://127.0.0.1:8080/echo?caller=me&text=hello&times=2'
//! curl -d 'caller=me&a=40&b=2' http://127.0.0.1:8080/add
//! ```

use std::sync::Arc;

use futures_util::FutureExt;
use rpc_gateway::binding::{FieldDescriptor, FieldKind, IntWidth, Message, MessageSchema, Value};
use rpc_gateway::config::{GatewayConfig, RouteConfig};
use rpc_gateway::error::{HookError, RpcError};
use rpc_gateway::http::{GatewayServer, ResponseSink, RpcRequest};
use rpc_gateway::observability::{logging, metrics};
use rpc_gateway::pipeline::{Gateway, Interceptor};
use rpc_gateway::switcher::{ArgShape, StaticSwitcher, StaticSwitcherBuilder};
use tokio::net::TcpListener;

/// Rejects calls without a `caller` form value and records it in the context.
struct RequireCaller;

impl Interceptor for RequireCaller {
    fn name(&self) -> &str {
        "require-caller"
    }

    fn before(&self, resp: &mut ResponseSink, req: &mut RpcRequest) -> Result<(), HookError> {
        match req.form.get("caller").map(str::to_string) {
            Some(caller) => {
                req.context.insert("Caller", caller);
                Ok(())
            }
            None => {
                resp.set_status(axum::http::StatusCode::UNAUTHORIZED);
                resp.write("missing caller\n");
                Err(HookError::new("missing caller"))
            }
        }
    }
}

fn switcher(config: &GatewayConfig) -> StaticSwitcher {
    let echo = MessageSchema::new("EchoRequest")
        .field("Text", FieldKind::String)
        .field("Times", FieldKind::Int(IntWidth::W32))
        .field("Caller", FieldKind::String)
        .into_arc();

    StaticSwitcherBuilder::from_config(config)
        .operation("Echo", ArgShape::Struct(echo), |args, _req| {
            async move {
                let request = args
                    .into_message()
                    .ok_or_else(|| RpcError::new("expected struct"))?;
                let text = request
                    .get("Text")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let times = request
                    .get("Times")
                    .and_then(Value::as_i64)
                    .unwrap_or(1)
                    .max(1) as usize;
                Ok::<_, RpcError>(
                    Message::new("EchoReply")
                        .with("Text", text.repeat(times))
                        .with("Caller", request.get("Caller").cloned().unwrap_or(Value::from(""))),
                )
            }
            .boxed()
        })
        .operation(
            "Add",
            ArgShape::Positional(vec![
                FieldDescriptor::new("A", FieldKind::Int(IntWidth::W64)),
                FieldDescriptor::new("B", FieldKind::Int(IntWidth::W64)),
            ]),
            |args, _req| {
                async move {
                    let params = args.into_positional().unwrap_or_default();
                    let sum: i64 = params.iter().filter_map(Value::as_i64).sum();
                    Ok::<_, RpcError>(Message::new("AddReply").with("Sum", sum))
                }
                .boxed()
            },
        )
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:8080".into();
    config.service.name = "Echo".into();
    config.routes = vec![
        RouteConfig::new("GET,POST", "/echo", "Echo"),
        RouteConfig::new("POST", "/add", "Add"),
    ];
    rpc_gateway::config::validate_config(&config).map_err(|errors| format!("{errors:?}"))?;

    logging::init_logging(&config.observability);
    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let gateway = Gateway::from_config(&config, Arc::new(switcher(&config)))
        .interceptor(Arc::new(RequireCaller))
        .build();
    let server = GatewayServer::new(&config, Arc::new(gateway))?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    server.run(listener).await?;
    Ok(())
}
