//! Cooperative cancellation handle threaded through every extension hook.
//!
//! The pipeline is single-threaded; the scope exists so a caller (another
//! thread, a signal handler) can abort long directory walks and write loops
//! between steps. Cloning is cheap and all clones share one flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{Error, Result};

/// Shared cancellation flag for one generation run.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    cancelled: Arc<AtomicBool>,
}

impl Scope {
    /// A fresh, un-cancelled scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Fail with [`Error::Cancelled`] when cancellation was requested.
    /// Called at every phase boundary and before each I/O step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] once [`Scope::cancel`] has been called.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let scope = Scope::new();
        let clone = scope.clone();
        assert!(scope.checkpoint().is_ok());
        clone.cancel();
        assert!(matches!(scope.checkpoint(), Err(Error::Cancelled)));
    }
}
