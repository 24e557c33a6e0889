//! Before/after hooks around dispatch.
//!
//! # Semantics
//! - `before` hooks run in registration order; the first failure at index
//!   `k` stops the phase and truncates the chain to `[0, k)`
//! - `after` hooks always run, in reverse, over the surviving chain, so only
//!   interceptors whose `before` completed are unwound
//! - `after` failures are logged and never reach the caller

use std::sync::Arc;

use crate::error::HookError;
use crate::http::{ResponseSink, RpcRequest};
use crate::observability::metrics;

pub trait Interceptor: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn before(&self, _resp: &mut ResponseSink, _req: &mut RpcRequest) -> Result<(), HookError> {
        Ok(())
    }

    fn after(&self, _resp: &mut ResponseSink, _req: &mut RpcRequest) -> Result<(), HookError> {
        Ok(())
    }
}

/// The interceptors resolved for one request.
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self { interceptors }
    }

    /// Request-scoped interceptors when present, otherwise the common list.
    pub fn resolve(req: &RpcRequest, common: &[Arc<dyn Interceptor>]) -> Self {
        let interceptors = if req.hooks.interceptors.is_empty() {
            common.to_vec()
        } else {
            req.hooks.interceptors.clone()
        };
        Self::new(interceptors)
    }

    /// Run every `before` hook in order, truncating the chain at the first failure.
    pub fn run_before(
        &mut self,
        resp: &mut ResponseSink,
        req: &mut RpcRequest,
    ) -> Result<(), HookError> {
        for (index, interceptor) in self.interceptors.iter().enumerate() {
            if let Err(err) = interceptor.before(resp, req) {
                tracing::error!(
                    request_id = %req.request_id,
                    interceptor = interceptor.name(),
                    error = %err,
                    "Interceptor before hook failed"
                );
                metrics::record_interceptor_failure("before");
                self.interceptors.truncate(index);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Run `after` hooks in reverse over the surviving chain.
    pub fn run_after(&self, resp: &mut ResponseSink, req: &mut RpcRequest) {
        for interceptor in self.interceptors.iter().rev() {
            if let Err(err) = interceptor.after(resp, req) {
                tracing::error!(
                    request_id = %req.request_id,
                    interceptor = interceptor.name(),
                    error = %err,
                    "Interceptor after hook failed"
                );
                metrics::record_interceptor_failure("after");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}
