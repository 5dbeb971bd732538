//! # Notification Service
//!
//! Bounded, newest-first notification log. New entries are prepended and the
//! log is truncated from the tail at [`MAX_NOTIFICATIONS`], so the oldest
//! entries are always the ones evicted. Read flags are the only mutable
//! field after insertion.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::broadcast::{Broadcaster, SubscriptionId};

/// Hard bound on the log length. Eviction removes from the tail (oldest).
pub const MAX_NOTIFICATIONS: usize = 50;

/// Source domain of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Weather,
    Market,
    Order,
    System,
    Message,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// One entry of the notification log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub priority: Priority,
}

/// Caller-supplied part of a notification; id, timestamp and read flag are
/// assigned by the service on insertion.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub priority: Priority,
}

impl NotificationDraft {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            priority,
        }
    }
}

/// Newest-first notification log plus its snapshot broadcaster.
pub struct NotificationService {
    entries: Mutex<VecDeque<Notification>>,
    broadcaster: Broadcaster<Vec<Notification>>,
}

impl NotificationService {
    /// Creates the service seeded with the standard example notifications.
    pub fn new() -> Self {
        let service = Self::empty();
        for draft in seed_notifications() {
            service.add(draft);
        }
        service
    }

    /// Creates the service with an empty log.
    pub fn empty() -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            broadcaster: Broadcaster::new(),
        }
    }

    /// Registers a subscriber; it receives the current log synchronously
    /// before this call returns, then a fresh snapshot on every mutation.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Vec<Notification>) + Send + Sync + 'static,
    {
        self.broadcaster.subscribe(self.snapshot(), callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.broadcaster.unsubscribe(id);
    }

    /// Assigns a fresh id and timestamp, prepends the entry, truncates the
    /// log to the bound and notifies subscribers. Returns the assigned id.
    pub fn add(&self, draft: NotificationDraft) -> String {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            kind: draft.kind,
            title: draft.title,
            message: draft.message,
            timestamp: Utc::now(),
            read: false,
            priority: draft.priority,
        };
        let id = notification.id.clone();

        let snapshot = {
            let mut entries = self.entries.lock().expect("Notification lock poisoned");
            entries.push_front(notification);
            entries.truncate(MAX_NOTIFICATIONS);
            entries.iter().cloned().collect::<Vec<_>>()
        };

        log::debug!("Notification {} added ({} in log)", id, snapshot.len());
        self.broadcaster.notify(snapshot);
        id
    }

    /// Marks one entry read. Unknown ids are a silent no-op; subscribers are
    /// only notified when a flag actually flipped.
    pub fn mark_as_read(&self, id: &str) {
        let snapshot = {
            let mut entries = self.entries.lock().expect("Notification lock poisoned");
            let changed = match entries.iter_mut().find(|n| n.id == id) {
                Some(entry) if !entry.read => {
                    entry.read = true;
                    true
                }
                _ => false,
            };
            changed.then(|| entries.iter().cloned().collect::<Vec<_>>())
        };

        if let Some(snapshot) = snapshot {
            self.broadcaster.notify(snapshot);
        }
    }

    /// Marks every entry read and notifies subscribers, even when the log
    /// was already fully read.
    pub fn mark_all_as_read(&self) {
        let snapshot = {
            let mut entries = self.entries.lock().expect("Notification lock poisoned");
            for entry in entries.iter_mut() {
                entry.read = true;
            }
            entries.iter().cloned().collect::<Vec<_>>()
        };
        self.broadcaster.notify(snapshot);
    }

    /// Count of entries with `read == false`.
    pub fn unread_count(&self) -> usize {
        self.entries
            .lock()
            .expect("Notification lock poisoned")
            .iter()
            .filter(|n| !n.read)
            .count()
    }

    /// Current log, newest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .expect("Notification lock poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_notifications() -> Vec<NotificationDraft> {
    vec![
        NotificationDraft::new(
            NotificationKind::Weather,
            "Weather Alert",
            "Heavy rain expected in your area within 24 hours",
            Priority::High,
        ),
        NotificationDraft::new(
            NotificationKind::Market,
            "Price Update",
            "Organic tomato prices increased by 5%",
            Priority::Medium,
        ),
        NotificationDraft::new(
            NotificationKind::Order,
            "New Order",
            "You have received a new order for organic lettuce",
            Priority::Medium,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_draft(n: usize) -> NotificationDraft {
        NotificationDraft::new(
            NotificationKind::Order,
            format!("Order {}", n),
            "incoming",
            Priority::Medium,
        )
    }

    #[test]
    fn log_is_bounded_and_newest_first() {
        let service = NotificationService::empty();
        for n in 0..60 {
            service.add(order_draft(n));
        }

        let entries = service.snapshot();
        assert_eq!(entries.len(), MAX_NOTIFICATIONS);
        // Oldest ten evicted, newest first
        assert_eq!(entries[0].title, "Order 59");
        assert_eq!(entries[MAX_NOTIFICATIONS - 1].title, "Order 10");
    }

    #[test]
    fn add_increments_unread_count() {
        let service = NotificationService::new();
        let before = service.unread_count();
        service.add(order_draft(1));
        assert_eq!(service.unread_count(), before + 1);
    }

    #[test]
    fn mark_all_as_read_yields_zero_unread() {
        let service = NotificationService::new();
        service.mark_all_as_read();
        assert_eq!(service.unread_count(), 0);
    }

    #[test]
    fn mark_as_read_notifies_only_on_change() {
        let service = NotificationService::empty();
        let id = service.add(order_draft(1));

        let hits = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let hits_in_cb = std::sync::Arc::clone(&hits);
        service.subscribe(move |_| {
            hits_in_cb.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });
        // initial snapshot
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);

        service.mark_as_read(&id);
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 2);

        // Already read: no notification. Unknown id: silent no-op.
        service.mark_as_read(&id);
        service.mark_as_read("no-such-id");
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn seeded_log_matches_the_examples() {
        let service = NotificationService::new();
        let entries = service.snapshot();
        assert_eq!(entries.len(), 3);
        // Seeds are added in order, so the order notification is newest
        assert_eq!(entries[0].kind, NotificationKind::Order);
        assert_eq!(entries[2].kind, NotificationKind::Weather);
        assert_eq!(service.unread_count(), 3);
    }
}
