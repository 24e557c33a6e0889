//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request-id and trace layers, method+path routing)
//!     → request.rs (query + form body → RpcRequest)
//!     → pipeline::Gateway (interceptors, hooks, switcher)
//!     → response.rs (ResponseSink → HTTP response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{FormData, FormError, RequestContext, RpcRequest, X_REQUEST_ID};
pub use response::ResponseSink;
pub use server::{AppState, GatewayServer};
