//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteConfig[] (config)
//!     → matcher.rs (parse method sets)
//!     → router.rs (RouteTable, grouped by path)
//!     → http::server (one axum route per path, a method filter per binding)
//!
//! Per request:
//!     axum matches method+path → operation name → Gateway::handle
//! ```
//!
//! # Design Decisions
//! - Paths match exactly; no prefix or pattern routing
//! - Unmatched paths and methods fall through to axum's 404/405

pub mod matcher;
pub mod router;

pub use matcher::{check_path, parse_methods, RouteError};
pub use router::{RouteEntry, RouteTable};
