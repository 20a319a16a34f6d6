//! Undo for optimistic writes whose request never finishes.
//!
//! A request future can be dropped at any await point: a timeout, a cancelled
//! task, a closed view. Whatever it marked as in flight must not stay marked.

use std::any::Any;

use rbuddy_flux::StateStore;
use tracing::debug;

/// Runs `undo` on the value at `path` unless disarmed first.
///
/// Held across the request's await. [`disarm`](Self::disarm) once the
/// outcome has been written, [`fire`](Self::fire) to undo right away.
pub(crate) struct Rollback<'a, T: Any + Send + Sync + Clone> {
    store: &'a StateStore,
    path: String,
    undo: Option<Box<dyn FnOnce(&mut T) + Send + 'a>>,
}

impl<'a, T: Any + Send + Sync + Clone> Rollback<'a, T> {
    pub fn new<F>(store: &'a StateStore, path: impl Into<String>, undo: F) -> Self
    where
        F: FnOnce(&mut T) + Send + 'a,
    {
        Self {
            store,
            path: path.into(),
            undo: Some(Box::new(undo)),
        }
    }

    pub fn disarm(mut self) {
        self.undo = None;
    }

    pub fn fire(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(undo) = self.undo.take() {
            self.store.update(&self.path, undo);
        }
    }
}

impl<T: Any + Send + Sync + Clone> Drop for Rollback<'_, T> {
    fn drop(&mut self) {
        if self.undo.is_some() {
            debug!(path = %self.path, "request abandoned, undoing");
            self.run();
        }
    }
}
