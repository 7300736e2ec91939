//! Per-user notifications.
//!
//! Delivery is best effort: a failure to write, push or email a
//! notification is logged and never fails the request that caused it.

use std::sync::Arc;

use aidlink_core::types::DbId;
use aidlink_db::models::notification::{CreateNotification, Notification};
use aidlink_db::repositories::{NotificationRepo, UserRepo};
use aidlink_db::DbPool;
use aidlink_events::{EmailDelivery, EmailMessage};

use crate::ws::manager::json_frame;
use crate::ws::WsManager;

/// A notification to send to one or more users.
#[derive(Debug, Clone)]
pub struct Notice {
    /// One of the `aidlink_core::notification_kinds` constants.
    pub kind: &'static str,
    pub title: String,
    pub message: String,
    pub project_id: Option<DbId>,
    /// Mirrored by email when SMTP is configured.
    pub email: Option<EmailMessage>,
}

impl Notice {
    pub fn new(kind: &'static str, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            project_id: None,
            email: None,
        }
    }

    pub fn for_project(mut self, project_id: DbId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_email(mut self, email: EmailMessage) -> Self {
        self.email = Some(email);
        self
    }
}

pub struct Notifier {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
    email: Option<Arc<EmailDelivery>>,
}

impl Notifier {
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>, email: Option<EmailDelivery>) -> Self {
        Self {
            pool,
            ws_manager,
            email: email.map(Arc::new),
        }
    }

    pub fn email_enabled(&self) -> bool {
        self.email.is_some()
    }

    /// Insert the row, push it to the user's sockets and queue the email.
    /// Returns the stored notification, or `None` if the insert failed.
    pub async fn notify(&self, user_id: DbId, notice: &Notice) -> Option<Notification> {
        let input = CreateNotification {
            user_id,
            kind: notice.kind.to_string(),
            title: notice.title.clone(),
            message: notice.message.clone(),
            project_id: notice.project_id,
        };

        let notification = match NotificationRepo::create(&self.pool, &input).await {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(user_id, kind = notice.kind, error = %e, "Failed to store notification");
                return None;
            }
        };

        self.push(&notification).await;

        if let (Some(delivery), Some(message)) = (&self.email, &notice.email) {
            self.spawn_email(Arc::clone(delivery), &notification, message.clone());
        }

        Some(notification)
    }

    /// Notify each user in turn. Returns how many rows were stored.
    pub async fn notify_many(&self, user_ids: &[DbId], notice: &Notice) -> usize {
        let mut stored = 0;
        for &user_id in user_ids {
            if self.notify(user_id, notice).await.is_some() {
                stored += 1;
            }
        }
        stored
    }

    async fn push(&self, notification: &Notification) {
        match json_frame("notification", notification) {
            Ok(frame) => {
                let sent = self.ws_manager.send_to_user(notification.user_id, frame).await;
                tracing::debug!(user_id = notification.user_id, sent, "Notification pushed");
            }
            Err(e) => tracing::warn!(error = %e, "Failed to encode notification frame"),
        }
    }

    fn spawn_email(&self, delivery: Arc<EmailDelivery>, notification: &Notification, message: EmailMessage) {
        let pool = self.pool.clone();
        let notification_id = notification.id;
        let user_id = notification.user_id;

        tokio::spawn(async move {
            let user = match UserRepo::find_by_id(&pool, user_id).await {
                Ok(Some(user)) if user.is_active => user,
                Ok(_) => return,
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "Failed to load email recipient");
                    return;
                }
            };

            if let Err(e) = delivery.send(&user.email, &message).await {
                tracing::warn!(user_id, notification_id, error = %e, "Notification email failed");
                return;
            }

            if let Err(e) = NotificationRepo::mark_emailed(&pool, notification_id).await {
                tracing::warn!(notification_id, error = %e, "Failed to record email delivery");
            }
        });
    }
}
