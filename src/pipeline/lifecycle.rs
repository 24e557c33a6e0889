//! Per-request control flow.
//!
//! ```text
//! resolve interceptors → before (abort on failure)
//!     → hijacker?  yes: hijack, done
//!     → preprocessor (failure → error handler)
//!     → switcher, bounded by the dispatch timeout (failure → error handler)
//!     → postprocessor, or default JSON marshal + "\n"
//! → after (always, reverse, surviving interceptors only)
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::http::{header, HeaderValue};
use tracing::Instrument;

use crate::binding::Message;
use crate::config::GatewayConfig;
use crate::error::{DispatchError, GatewayError};
use crate::http::{ResponseSink, RpcRequest};
use crate::marshal::{MarshalOptions, Marshaler};
use crate::observability::metrics;
use crate::switcher::{DefaultErrorHandler, Dispatched, ErrorHandler, Switcher};

use super::interceptor::{Interceptor, InterceptorChain};

/// How a request ended, for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Hijacked,
    InterceptorRejected,
    PreprocessorRejected,
    DispatchFailed,
    MarshalFailed,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Hijacked => "hijacked",
            Outcome::InterceptorRejected => "interceptor_rejected",
            Outcome::PreprocessorRejected => "preprocessor_rejected",
            Outcome::DispatchFailed => "dispatch_failed",
            Outcome::MarshalFailed => "marshal_failed",
        }
    }
}

/// The request lifecycle orchestrator. Shared by all requests.
pub struct Gateway {
    switcher: Arc<dyn Switcher>,
    error_handler: Arc<dyn ErrorHandler>,
    common_interceptors: ArcSwap<Vec<Arc<dyn Interceptor>>>,
    marshaler: Marshaler,
    dispatch_timeout: Duration,
}

impl Gateway {
    pub fn builder(switcher: Arc<dyn Switcher>) -> GatewayBuilder {
        GatewayBuilder {
            switcher,
            error_handler: Arc::new(DefaultErrorHandler),
            interceptors: Vec::new(),
            marshal: MarshalOptions::default(),
            dispatch_timeout: Duration::from_secs(30),
        }
    }

    /// Builder seeded from configuration.
    pub fn from_config(config: &GatewayConfig, switcher: Arc<dyn Switcher>) -> GatewayBuilder {
        Self::builder(switcher)
            .marshal_options(config.marshal)
            .dispatch_timeout(Duration::from_secs(config.timeouts.dispatch_secs))
    }

    /// Append to the common interceptor list. Requests already in flight
    /// keep the list they resolved.
    pub fn add_interceptor(&self, interceptor: Arc<dyn Interceptor>) {
        self.common_interceptors.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(Arc::clone(&interceptor));
            next
        });
    }

    pub fn interceptor_count(&self) -> usize {
        self.common_interceptors.load().len()
    }

    /// Run one request through the pipeline and return its buffered response.
    pub async fn handle(&self, operation: &str, req: RpcRequest) -> ResponseSink {
        let span = tracing::info_span!("rpc", request_id = %req.request_id, operation);
        self.handle_inner(operation, req).instrument(span).await
    }

    async fn handle_inner(&self, operation: &str, mut req: RpcRequest) -> ResponseSink {
        let start = Instant::now();
        let mut resp = ResponseSink::new();

        let common = self.common_interceptors.load_full();
        let mut chain = InterceptorChain::resolve(&req, &common);

        let outcome = match chain.run_before(&mut resp, &mut req) {
            Ok(()) => self.process(operation, &mut resp, &req).await,
            Err(_) => Outcome::InterceptorRejected,
        };

        chain.run_after(&mut resp, &mut req);

        tracing::debug!(
            outcome = outcome.as_str(),
            status = %resp.status(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request finished"
        );
        metrics::record_request(operation, outcome.as_str(), start);
        resp
    }

    async fn process(&self, operation: &str, resp: &mut ResponseSink, req: &RpcRequest) -> Outcome {
        if let Some(hijack) = &req.hooks.hijacker {
            tracing::debug!("Request hijacked");
            hijack(resp, req);
            return Outcome::Hijacked;
        }

        if let Some(preprocess) = &req.hooks.preprocessor {
            if let Err(err) = preprocess(resp, req) {
                tracing::info!(error = %err, "Preprocessor rejected request");
                self.error_handler.handle(resp, req, &GatewayError::Preprocessor(err));
                return Outcome::PreprocessorRejected;
            }
        }

        let result = tokio::time::timeout(
            self.dispatch_timeout,
            self.switcher.switch(operation, resp, req),
        )
        .await;
        let dispatched = match result {
            Ok(Ok(dispatched)) => dispatched,
            Ok(Err(err)) => return self.dispatch_failed(resp, req, err),
            Err(_) => {
                let err = DispatchError::Timeout(self.dispatch_timeout);
                return self.dispatch_failed(resp, req, err);
            }
        };

        match dispatched {
            Dispatched::Written => Outcome::Ok,
            Dispatched::Reply(reply) => self.postprocess(resp, req, &reply),
        }
    }

    fn dispatch_failed(
        &self,
        resp: &mut ResponseSink,
        req: &RpcRequest,
        err: DispatchError,
    ) -> Outcome {
        tracing::warn!(error = %err, "Dispatch failed");
        self.error_handler.handle(resp, req, &GatewayError::Dispatch(err));
        Outcome::DispatchFailed
    }

    fn postprocess(&self, resp: &mut ResponseSink, req: &RpcRequest, reply: &Message) -> Outcome {
        if let Some(postprocess) = &req.hooks.postprocessor {
            postprocess(resp, req, reply);
            return Outcome::Ok;
        }

        match self.marshaler.json(reply) {
            Ok(mut bytes) => {
                bytes.push(b'\n');
                resp.insert_header(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                resp.write(bytes);
                Outcome::Ok
            }
            Err(err) => {
                tracing::error!(error = %err, "Marshal failed");
                resp.write(err.to_string());
                Outcome::MarshalFailed
            }
        }
    }
}

pub struct GatewayBuilder {
    switcher: Arc<dyn Switcher>,
    error_handler: Arc<dyn ErrorHandler>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    marshal: MarshalOptions,
    dispatch_timeout: Duration,
}

impl GatewayBuilder {
    pub fn error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = handler;
        self
    }

    /// Append a common interceptor; order of calls is execution order.
    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn marshal_options(mut self, options: MarshalOptions) -> Self {
        self.marshal = options;
        self
    }

    pub fn dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    pub fn build(self) -> Gateway {
        Gateway {
            switcher: self.switcher,
            error_handler: self.error_handler,
            common_interceptors: ArcSwap::from_pointee(self.interceptors),
            marshaler: Marshaler::new(self.marshal),
            dispatch_timeout: self.dispatch_timeout,
        }
    }
}
