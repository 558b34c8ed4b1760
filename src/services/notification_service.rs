use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::task::JoinHandle;

use crate::{
    errors::AppError,
    models::domain::{Notification, Severity},
};

#[derive(Default)]
struct Slot {
    current: Notification,
    generation: u64,
    expiry: Option<JoinHandle<()>>,
}

/// Single-slot notification channel. A new message replaces the pending one
/// and its expiry timer; the slot hides itself after `ttl`.
#[derive(Clone)]
pub struct NotificationChannel {
    slot: Arc<Mutex<Slot>>,
    ttl: Duration,
}

impl NotificationChannel {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            ttl,
        }
    }

    pub fn current(&self) -> Notification {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    pub fn show(&self, severity: Severity, message: impl Into<String>) {
        let notification = Notification::new(severity, message);
        log::debug!("Notification ({:?}): {}", severity, notification.message);

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.generation += 1;
        slot.current = notification;
        if let Some(previous) = slot.expiry.take() {
            previous.abort();
        }
        slot.expiry = self.schedule_expiry(slot.generation);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(Severity::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(Severity::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(Severity::Error, message);
    }

    /// Surfaces an action failure. Rejected sessions are handled by the
    /// gateway and are not shown again here.
    pub fn report_failure(&self, err: &AppError, fallback: &str) {
        if err.is_unauthorized() {
            return;
        }
        self.error(err.user_message(fallback));
    }

    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.generation += 1;
        slot.current = Notification::hidden();
        if let Some(previous) = slot.expiry.take() {
            previous.abort();
        }
    }

    fn schedule_expiry(&self, generation: u64) -> Option<JoinHandle<()>> {
        // Without a runtime the message simply stays until replaced or cleared.
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let slot = Arc::downgrade(&self.slot);
        let ttl = self.ttl;

        Some(runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            let Some(slot) = slot.upgrade() else {
                return;
            };
            let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.generation == generation {
                slot.current = Notification::hidden();
                slot.expiry = None;
            }
        }))
    }
}
