//! "Producing" indicator shared by the assistant and its composers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Raised while a submission is being analyzed
#[derive(Debug, Clone, Default)]
pub struct ProducingFlag(Arc<AtomicBool>);

impl ProducingFlag {
    /// Create a lowered flag
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a submission is in progress
    #[inline]
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raise the flag; `None` if it is already raised
    #[must_use]
    pub fn raise(&self) -> Option<ProducingGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ProducingGuard(Arc::clone(&self.0)))
    }
}

/// Lowers the flag when dropped
#[derive(Debug)]
pub struct ProducingGuard(Arc<AtomicBool>);

impl Drop for ProducingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
