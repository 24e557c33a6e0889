//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the Axum router from the route table
//! - Wire up middleware (request ID, tracing)
//! - Turn each matched call into an `RpcRequest` and hand it to the gateway
//! - Bind server to listener with graceful shutdown

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::request::RpcRequest;
use crate::pipeline::Gateway;
use crate::routing::{RouteError, RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub max_body_size: usize,
}

/// HTTP front end for the gateway.
pub struct GatewayServer {
    router: Router,
    routes: RouteTable,
}

impl GatewayServer {
    pub fn new(config: &GatewayConfig, gateway: Arc<Gateway>) -> Result<Self, RouteError> {
        let routes = RouteTable::from_config(&config.routes)?;
        let state = AppState {
            gateway,
            max_body_size: config.limits.max_body_size,
        };
        let router = Self::build_router(&routes, state);
        Ok(Self { router, routes })
    }

    /// One axum route per distinct path with a method filter per binding.
    fn build_router(routes: &RouteTable, state: AppState) -> Router {
        let mut router = Router::new();
        for (path, bindings) in routes.by_path() {
            let mut method_router: MethodRouter<AppState> = MethodRouter::new();
            for (method, operation) in bindings {
                let filter = match MethodFilter::try_from(method.clone()) {
                    Ok(filter) => filter,
                    Err(_) => {
                        tracing::warn!(method = %method, path, "Method cannot be routed");
                        continue;
                    }
                };
                let operation: Arc<str> = Arc::from(operation);
                method_router = method_router.on(
                    filter,
                    move |State(state): State<AppState>, request: Request<Body>| {
                        dispatch(state, Arc::clone(&operation), request)
                    },
                );
            }
            router = router.route(path, method_router);
        }

        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// The assembled router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, routes = self.routes.len(), "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn dispatch(state: AppState, operation: Arc<str>, request: Request<Body>) -> Response {
    let req = match RpcRequest::from_http(request, state.max_body_size).await {
        Ok(req) => req,
        Err(err) => {
            tracing::warn!(operation = %operation, error = %err, "Rejected request body");
            return err.into_response();
        }
    };
    state.gateway.handle(&operation, req).await.into_response()
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
