//! Transient notifications and the notification history log.
//!
//! Each notification carries its own time-to-live and disappears on its own
//! schedule. Everything pushed is also copied into a short history log.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// Entries kept in the history log
pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Success => "Success",
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub ttl: Duration,
    pub created_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl
    }

    /// Time left before expiry, zero once expired
    pub fn remaining(&self, now: Instant) -> Duration {
        self.ttl
            .saturating_sub(now.saturating_duration_since(self.created_at))
    }
}

/// A notification entry with message and timestamp
#[derive(Clone)]
pub struct NotificationEntry {
    pub severity: Severity,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl NotificationEntry {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            timestamp: chrono::Local::now(),
        }
    }

    pub fn time_ago(&self) -> String {
        let now = chrono::Local::now();
        let duration = now.signed_duration_since(self.timestamp);
        if duration.num_seconds() < 60 {
            "just now".to_string()
        } else if duration.num_minutes() < 60 {
            format!("{}m ago", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h ago", duration.num_hours())
        } else {
            self.timestamp.format("%m/%d %H:%M").to_string()
        }
    }
}

/// Live notifications in creation order.
///
/// Ids come from a counter owned by the queue and are never reused.
pub struct NotificationQueue {
    live: Vec<Notification>,
    next_id: u64,
    default_ttl: Duration,
    history: VecDeque<NotificationEntry>,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl NotificationQueue {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            live: Vec::new(),
            next_id: 1,
            default_ttl,
            history: VecDeque::new(),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Applies to notifications pushed from now on
    pub fn set_default_ttl(&mut self, ttl: Duration) {
        self.default_ttl = ttl;
    }

    pub fn push(&mut self, severity: Severity, title: impl Into<String>, message: impl Into<String>) -> u64 {
        let ttl = self.default_ttl;
        self.push_with_ttl(severity, title, message, ttl)
    }

    pub fn push_with_ttl(
        &mut self,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
        ttl: Duration,
    ) -> u64 {
        self.push_at(severity, title.into(), message.into(), ttl, Instant::now())
    }

    pub(crate) fn push_at(
        &mut self,
        severity: Severity,
        title: String,
        message: String,
        ttl: Duration,
        created_at: Instant,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.history
            .push_back(NotificationEntry::new(severity, format!("{}: {}", title, message)));
        while self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }

        self.live.push(Notification {
            id,
            severity,
            title,
            message,
            ttl,
            created_at,
        });
        id
    }

    /// Remove by id. Removing an id that is already gone is a no-op.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.live.len();
        self.live.retain(|n| n.id != id);
        self.live.len() != before
    }

    /// Drop every notification whose ttl has elapsed at `now`; returns how many went.
    pub fn prune_expired(&mut self, now: Instant) -> usize {
        let before = self.live.len();
        self.live.retain(|n| !n.is_expired(now));
        before - self.live.len()
    }

    /// Earliest moment one of the live notifications expires
    pub fn next_expiry(&self, now: Instant) -> Option<Duration> {
        self.live.iter().map(|n| n.remaining(now)).min()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.live.iter()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }

    pub fn history(&self) -> &VecDeque<NotificationEntry> {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
