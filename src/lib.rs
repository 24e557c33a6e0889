//! HTTP form-encoded gateway in front of RPC clients.

pub mod binding;
pub mod codegen;
pub mod config;
pub mod error;
pub mod http;
pub mod marshal;
pub mod naming;
pub mod observability;
pub mod pipeline;
pub mod routing;
pub mod switcher;

pub use config::GatewayConfig;
pub use http::{GatewayServer, ResponseSink, RpcRequest};
pub use pipeline::{Gateway, Interceptor};
pub use switcher::{StaticSwitcher, Switcher};
