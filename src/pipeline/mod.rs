//! Request lifecycle: interceptors, per-request hooks and the orchestrator.
//!
//! # Data Flow
//! ```text
//! RpcRequest ──▶ Gateway::handle
//!                  ├─ InterceptorChain::run_before
//!                  ├─ hijacker | preprocessor → Switcher → postprocessor/marshal
//!                  └─ InterceptorChain::run_after
//!            ◀── ResponseSink
//! ```
//!
//! # Design Decisions
//! - Hooks and interceptors are synchronous; only the switcher is async
//! - The dispatch timeout bounds the switcher alone, so `after` hooks always run
//! - The common interceptor list lives behind an `ArcSwap` and can grow at
//!   runtime without blocking requests in flight

pub mod hooks;
pub mod interceptor;
pub mod lifecycle;

pub use hooks::{Hijacker, Postprocessor, Preprocessor, RequestHooks};
pub use interceptor::{Interceptor, InterceptorChain};
pub use lifecycle::{Gateway, GatewayBuilder, Outcome};
