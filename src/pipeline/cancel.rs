//! Cancellation token shared by a pipeline's scheduler and invokers.
//!
//! A token is cheap to clone; all clones observe the same flag. [`CancelToken::child`] makes a
//! token that is cancelled when either it or its parent is, which is how a single run gets its
//! own scope under the pipeline-wide token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Default)]
struct TokenState {
    cancelled: AtomicBool,
    /// Spawns hold the read side; `cancel` takes the write side. Once `cancel` returns no
    /// spawn is in progress and none will start.
    spawn_gate: RwLock<()>,
    parent: Option<CancelToken>,
}

#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<TokenState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cancelled by its own `cancel` or by any ancestor's.
    pub fn child(&self) -> Self {
        Self {
            inner: Arc::new(TokenState {
                parent: Some(self.clone()),
                ..TokenState::default()
            }),
        }
    }

    /// Raise the flag. Returns true only for the call that actually raised it.
    /// Waits for spawns already past their check; never waits on process exit.
    pub fn cancel(&self) -> bool {
        let _gate = self
            .inner
            .spawn_gate
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        !self.inner.cancelled.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
            || self
                .inner
                .parent
                .as_ref()
                .is_some_and(CancelToken::is_cancelled)
    }

    /// Run `spawn` unless this token or an ancestor is cancelled, holding every spawn gate
    /// on the chain while it runs.
    pub fn spawn_unless_cancelled<T>(&self, spawn: impl FnOnce() -> T) -> Option<T> {
        let _gate = self
            .inner
            .spawn_gate
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if self.inner.cancelled.load(Ordering::SeqCst) {
            return None;
        }
        match &self.inner.parent {
            Some(parent) => parent.spawn_unless_cancelled(spawn),
            None => Some(spawn()),
        }
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
