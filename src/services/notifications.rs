use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::models::{Notification, NotificationKind};

/// Ephemeral notifications that expire on their own
#[derive(Clone)]
pub struct NotificationCenter {
    notifications: Arc<RwLock<Vec<Notification>>>,
    next_id: Arc<AtomicU64>,
    ttl: Duration,
}

impl NotificationCenter {
    /// Creates an empty center whose notifications live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            notifications: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            ttl,
        }
    }

    /// Adds a notification and schedules its removal after the TTL
    pub async fn add(&self, message: impl Into<String>, kind: NotificationKind) -> Notification {
        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            message: message.into(),
            kind,
        };

        self.notifications.write().await.push(notification.clone());
        tracing::debug!(id = notification.id, kind = ?kind, "Notification added");

        let notifications = self.notifications.clone();
        let ttl = self.ttl;
        let id = notification.id;
        // Removal is by id, so an early clear of other entries is harmless
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            notifications.write().await.retain(|n| n.id != id);
            tracing::debug!(id, "Notification expired");
        });

        notification
    }

    /// Shorthand for a success notification
    pub async fn success(&self, message: impl Into<String>) -> Notification {
        self.add(message, NotificationKind::Success).await
    }

    /// Live notifications, oldest first
    pub async fn list(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_unique_and_ordered() {
        let center = NotificationCenter::new(Duration::from_secs(60));
        let a = center.success("Added to liked movies").await;
        let b = center.add("Oops", NotificationKind::Error).await;

        assert!(b.id > a.id);
        let live = center.list().await;
        assert_eq!(live, vec![a, b]);
    }

    #[tokio::test]
    async fn test_notifications_expire() {
        let center = NotificationCenter::new(Duration::from_millis(20));
        center.add("Heads up", NotificationKind::Info).await;
        assert_eq!(center.list().await.len(), 1);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(center.list().await.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let notification = Notification {
            id: 7,
            message: "Saved".to_string(),
            kind: NotificationKind::Success,
        };
        assert_eq!(
            serde_json::to_string(&notification).unwrap(),
            r#"{"id":7,"message":"Saved","type":"success"}"#
        );
    }
}
