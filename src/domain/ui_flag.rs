use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide switch clients read to gate their UI. Not persisted.
#[derive(Debug, Default)]
pub struct UiFlag(AtomicBool);

impl UiFlag {
    pub fn new(enabled: bool) -> Self {
        Self(AtomicBool::new(enabled))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Last write wins
    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Release);
    }
}
