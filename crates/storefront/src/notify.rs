//! Transient status notifications surfaced to the view layer.
//!
//! A single slot, not a queue: a new notification overwrites whatever is
//! currently showing. Expiry is deadline-based - the view polls
//! [`NotificationEmitter::current`] and gets `None` once the deadline has
//! passed. Cart events show for 3 seconds, submission confirmations for 5.

use std::time::{Duration, Instant};

/// How long cart events (added, removed, cleared) stay visible.
pub const CART_EVENT_TTL: Duration = Duration::from_secs(3);

/// How long form-submission confirmations stay visible.
pub const CONFIRMATION_TTL: Duration = Duration::from_secs(5);

/// Visual severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// A transient message with a severity tag and an expiry deadline.
#[derive(Debug, Clone)]
pub struct Notification {
    message: String,
    severity: Severity,
    expires_at: Instant,
}

impl Notification {
    /// The display text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The severity tag.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }
}

/// Single-slot emitter of auto-expiring notifications.
#[derive(Debug, Default)]
pub struct NotificationEmitter {
    slot: Option<Notification>,
}

impl NotificationEmitter {
    /// Create an emitter with an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { slot: None }
    }

    /// Show a notification, replacing any currently displayed one.
    pub fn emit(&mut self, message: impl Into<String>, severity: Severity, ttl: Duration) {
        self.slot = Some(Notification {
            message: message.into(),
            severity,
            expires_at: Instant::now() + ttl,
        });
    }

    /// Show a success notification with the cart-event lifetime.
    pub fn success(&mut self, message: impl Into<String>) {
        self.emit(message, Severity::Success, CART_EVENT_TTL);
    }

    /// The currently visible notification, if any and not yet expired.
    #[must_use]
    pub fn current(&self) -> Option<&Notification> {
        self.slot
            .as_ref()
            .filter(|n| n.expires_at > Instant::now())
    }

    /// Dismiss the current notification.
    pub fn clear(&mut self) {
        self.slot = None;
    }
}
