use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::store::StateStore;
use crate::trie::Trie;

/// Boxed `Send` future produced by a request handler.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Type-erased request payload.
pub type Payload = Arc<dyn Any + Send + Sync>;

type Handler = Arc<dyn Fn(String, Payload, Arc<StateStore>) -> BoxFuture + Send + Sync>;

/// Routes request paths (`resolution/like`, `detail/open`, ...) to async
/// handlers.
///
/// Handlers never return values. Whatever they produce, including errors the
/// user should see, is written to the [`StateStore`] they receive.
pub struct Router {
    handlers: Trie<Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            handlers: Trie::new(),
        }
    }

    /// Register `handler` for `pattern` (wildcards allowed).
    pub fn on<F, Fut>(&self, pattern: &str, handler: F)
    where
        F: Fn(String, Payload, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let erased: Handler = Arc::new(
            move |path: String, payload: Payload, store: Arc<StateStore>| -> BoxFuture {
                Box::pin(handler(path, payload, store))
            },
        );
        self.handlers.insert(pattern, erased);
    }

    /// Run every handler matching `path`, one after another.
    ///
    /// Returns how many handlers ran; zero is not an error.
    pub async fn dispatch(&self, path: &str, payload: Payload, store: Arc<StateStore>) -> usize {
        let handlers = self.handlers.matches(path);
        let n = handlers.len();
        for handler in handlers {
            handler(path.to_string(), Arc::clone(&payload), Arc::clone(&store)).await;
        }
        n
    }

    pub fn matches(&self, path: &str) -> bool {
        !self.handlers.matches(path).is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
