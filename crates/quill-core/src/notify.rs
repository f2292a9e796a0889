//! Transient user-facing notifications.

use std::time::Duration;

use tokio::time::Instant;

/// Default lifetime of informational messages
pub const INFO_TIMEOUT: Duration = Duration::from_millis(2500);

/// Lifetime of load/save failure messages
pub const ERROR_TIMEOUT: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// One message. A zero timeout keeps it until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub timeout: Duration,
    created_at: Instant,
}

impl Notification {
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        !self.timeout.is_zero() && now.duration_since(self.created_at) >= self.timeout
    }
}

/// Newest-first list of notifications.
///
/// Expired entries are dropped whenever the list is read, measured on the
/// tokio clock.
#[derive(Debug, Default)]
pub struct Notifications {
    items: Vec<Notification>,
    next_id: u64,
}

impl Notifications {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message and return its id.
    pub fn push(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        timeout: Duration,
    ) -> u64 {
        self.next_id += 1;
        let notification = Notification {
            id: self.next_id,
            kind,
            message: message.into(),
            timeout,
            created_at: Instant::now(),
        };

        match kind {
            NotificationKind::Info => tracing::debug!("{}", notification.message),
            NotificationKind::Error => tracing::warn!("{}", notification.message),
        }

        self.items.insert(0, notification);
        self.next_id
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(message, NotificationKind::Info, INFO_TIMEOUT)
    }

    pub fn error(&mut self, message: impl Into<String>, timeout: Duration) -> u64 {
        self.push(message, NotificationKind::Error, timeout)
    }

    /// Remove a message before its timeout. Returns whether it existed.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Live messages, newest first.
    pub fn active(&mut self) -> &[Notification] {
        self.prune();
        &self.items
    }

    /// Most recent live message
    pub fn latest(&mut self) -> Option<&Notification> {
        self.active().first()
    }

    /// Messages with an id greater than `after`, oldest first.
    pub fn since(&mut self, after: u64) -> Vec<Notification> {
        self.prune();
        self.items
            .iter()
            .rev()
            .filter(|item| item.id > after)
            .cloned()
            .collect()
    }

    /// Id of the most recently pushed message, 0 when none was pushed.
    pub const fn last_id(&self) -> u64 {
        self.next_id
    }

    fn prune(&mut self) {
        let now = Instant::now();
        self.items.retain(|item| !item.is_expired(now));
    }
}
