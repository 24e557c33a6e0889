//! Per-message-type custom convertors.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::http::RpcRequest;

use super::value::Message;

/// Builds a nested message straight from the request, bypassing field-by-field
/// binding. Returning `None` leaves the nested field unset.
pub type MessageConvertor = Arc<dyn Fn(&RpcRequest) -> Option<Message> + Send + Sync>;

/// Convertors keyed by message type name.
///
/// Populated at startup and read on every bind. Registration swaps in a new
/// map, so readers never block and late registration is safe.
pub struct ConvertorRegistry {
    inner: ArcSwap<HashMap<String, MessageConvertor>>,
}

impl ConvertorRegistry {
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Register (or replace) the convertor for `type_name`.
    pub fn register<F>(&self, type_name: impl Into<String>, convertor: F)
    where
        F: Fn(&RpcRequest) -> Option<Message> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        let convertor: MessageConvertor = Arc::new(convertor);
        tracing::debug!(message_type = %type_name, "Registering message convertor");
        self.inner.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.insert(type_name.clone(), Arc::clone(&convertor));
            next
        });
    }

    pub fn get(&self, type_name: &str) -> Option<MessageConvertor> {
        self.inner.load().get(type_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }
}

impl Default for ConvertorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConvertorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.inner.load();
        let mut names: Vec<&String> = map.keys().collect();
        names.sort();
        f.debug_struct("ConvertorRegistry").field("types", &names).finish()
    }
}
