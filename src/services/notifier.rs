use crate::models::notification_types::{Notification, Severity};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Outlet for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log. Used when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        if let Notification::ClassificationProgress(progress) = &notification {
            tracing::debug!(
                current = progress.current,
                total = progress.total,
                file = %progress.current_file,
                "Classified"
            );
            return;
        }
        match notification.severity() {
            Severity::Info => {
                tracing::info!(title = notification.title(), "{}", notification.description())
            }
            Severity::Destructive => {
                tracing::warn!(title = notification.title(), "{}", notification.description())
            }
        }
    }
}

/// Forwards notifications to a UI event loop.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, UnboundedReceiver<Notification>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // Fire and forget; a closed receiver just means nobody is listening.
        let _ = self.tx.send(notification);
    }
}
