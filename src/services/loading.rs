use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Process-wide busy indicator. Each long-running action holds a guard for
/// its duration; the indicator is on while any guard is alive.
#[derive(Clone, Default)]
pub struct LoadingTracker {
    active: Arc<AtomicUsize>,
}

impl LoadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> LoadingGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        LoadingGuard {
            active: self.active.clone(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }
}

pub struct LoadingGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
