use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Destructive,
}

/// A transient user-facing notification. The UI shows each notice once and
/// auto-dismisses it; every failure produces exactly one notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

/// Cloneable sender side of the notification channel. A dropped receiver is
/// tolerated; notices are then discarded.
#[derive(Clone)]
pub struct Notifier {
    tx: UnboundedSender<Notice>,
}

impl Notifier {
    /// Create a notifier together with the receiver the UI drains
    pub fn channel() -> (Notifier, UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Notifier { tx }, rx)
    }

    /// Notifier with no listener, for headless use and tests
    pub fn disconnected() -> Notifier {
        Self::channel().0
    }

    pub fn notify(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(Notice {
            message: message.into(),
            severity: Severity::Info,
        });
    }

    pub fn destructive(&self, message: impl Into<String>) {
        self.notify(Notice {
            message: message.into(),
            severity: Severity::Destructive,
        });
    }
}
