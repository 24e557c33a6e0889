//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::FutureExt;
use rpc_gateway::binding::{FieldKind, IntWidth, Message, MessageSchema};
use rpc_gateway::config::{GatewayConfig, RouteConfig};
use rpc_gateway::error::{HookError, RpcError};
use rpc_gateway::http::{ResponseSink, RpcRequest};
use rpc_gateway::pipeline::{Gateway, Interceptor};
use rpc_gateway::switcher::{ArgShape, StaticSwitcher, StaticSwitcherBuilder};

pub fn get_user_request() -> Arc<MessageSchema> {
    MessageSchema::new("GetUserRequest")
        .field("UserId", FieldKind::Int(IntWidth::W64))
        .field("Name", FieldKind::String)
        .field("Verbose", FieldKind::Bool)
        .into_arc()
}

/// A user service with a fast echo, a slow call and a failing call.
pub fn user_switcher() -> StaticSwitcher {
    user_switcher_for(&GatewayConfig::default())
}

pub fn user_switcher_for(config: &GatewayConfig) -> StaticSwitcher {
    StaticSwitcherBuilder::from_config(config)
        .operation("GetUser", ArgShape::Struct(get_user_request()), |args, _req| {
            async move {
                let request = args.into_message().ok_or_else(|| RpcError::new("expected struct"))?;
                let mut reply = Message::new("GetUserReply");
                for (name, value) in request.fields() {
                    reply.set(name, value.clone());
                }
                Ok::<_, RpcError>(reply)
            }
            .boxed()
        })
        .operation("Slow", ArgShape::Positional(Vec::new()), |_args, _req| {
            async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok::<_, RpcError>(Message::new("SlowReply").with("Done", true))
            }
            .boxed()
        })
        .operation("Fail", ArgShape::Positional(Vec::new()), |_args, _req| {
            async { Err::<Message, _>(RpcError::new("user backend unavailable")) }.boxed()
        })
        .build()
}

pub fn gateway() -> Gateway {
    Gateway::builder(Arc::new(user_switcher())).build()
}

pub fn gateway_for(config: &GatewayConfig) -> Gateway {
    Gateway::from_config(config, Arc::new(user_switcher_for(config))).build()
}

pub fn config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.service.name = "UserService".into();
    config.routes = vec![
        RouteConfig::new("GET,POST", "/users/get", "GetUser"),
        RouteConfig::new("GET", "/users/slow", "Slow"),
        RouteConfig::new("GET", "/users/fail", "Fail"),
        RouteConfig::new("GET", "/users/missing", "Missing"),
    ];
    config
}

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Records before/after calls; optionally fails its before hook.
pub struct Recorder {
    pub label: &'static str,
    pub fail_before: bool,
    pub log: Log,
}

impl Recorder {
    pub fn new(label: &'static str, log: &Log) -> Arc<dyn Interceptor> {
        Arc::new(Self {
            label,
            fail_before: false,
            log: Arc::clone(log),
        })
    }

    pub fn failing(label: &'static str, log: &Log) -> Arc<dyn Interceptor> {
        Arc::new(Self {
            label,
            fail_before: true,
            log: Arc::clone(log),
        })
    }
}

impl Interceptor for Recorder {
    fn name(&self) -> &str {
        self.label
    }

    fn before(&self, resp: &mut ResponseSink, _req: &mut RpcRequest) -> Result<(), HookError> {
        self.log.lock().unwrap().push(format!("before:{}", self.label));
        if self.fail_before {
            resp.write(format!("{} refused", self.label));
            return Err(HookError::new("refused"));
        }
        Ok(())
    }

    fn after(&self, _resp: &mut ResponseSink, _req: &mut RpcRequest) -> Result<(), HookError> {
        self.log.lock().unwrap().push(format!("after:{}", self.label));
        Ok(())
    }
}
