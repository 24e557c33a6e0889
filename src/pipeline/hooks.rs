//! Request-scoped overrides.
//!
//! Each request carries at most one hijacker, preprocessor and postprocessor,
//! plus an optional interceptor list that replaces the common one. They are
//! usually installed by an interceptor's `before` hook or by the embedding
//! application before handing the request to the gateway.

use std::fmt;
use std::sync::Arc;

use crate::binding::Message;
use crate::error::HookError;
use crate::http::{ResponseSink, RpcRequest};

use super::interceptor::Interceptor;

/// Takes over the whole request; preprocess, dispatch and postprocess are skipped.
pub type Hijacker = Arc<dyn Fn(&mut ResponseSink, &RpcRequest) + Send + Sync>;

/// Validation gate run before dispatch.
pub type Preprocessor =
    Arc<dyn Fn(&mut ResponseSink, &RpcRequest) -> Result<(), HookError> + Send + Sync>;

/// Writes the response for a successful dispatch in place of default marshaling.
pub type Postprocessor = Arc<dyn Fn(&mut ResponseSink, &RpcRequest, &Message) + Send + Sync>;

#[derive(Clone, Default)]
pub struct RequestHooks {
    pub hijacker: Option<Hijacker>,
    pub preprocessor: Option<Preprocessor>,
    pub postprocessor: Option<Postprocessor>,
    /// Replaces the common interceptors when non-empty.
    pub interceptors: Vec<Arc<dyn Interceptor>>,
}

impl RequestHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hijacker<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ResponseSink, &RpcRequest) + Send + Sync + 'static,
    {
        self.hijacker = Some(Arc::new(f));
        self
    }

    pub fn preprocessor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ResponseSink, &RpcRequest) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.preprocessor = Some(Arc::new(f));
        self
    }

    pub fn postprocessor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ResponseSink, &RpcRequest, &Message) + Send + Sync + 'static,
    {
        self.postprocessor = Some(Arc::new(f));
        self
    }

    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }
}

impl fmt::Debug for RequestHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.interceptors.iter().map(|i| i.name()).collect();
        f.debug_struct("RequestHooks")
            .field("hijacker", &self.hijacker.is_some())
            .field("preprocessor", &self.preprocessor.is_some())
            .field("postprocessor", &self.postprocessor.is_some())
            .field("interceptors", &names)
            .finish()
    }
}
