use std::sync::Arc;
use std::time::Duration;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::warn;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

const TOAST_ID_LEN: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: String,
    pub message: String,
    pub kind: ToastKind,
    /// Zero keeps the toast until it is removed explicitly
    pub duration: Duration,
}

/// Queue of transient messages. Cloning shares the same queue.
#[derive(Clone)]
pub struct ToastQueue {
    toasts: Arc<watch::Sender<Vec<Toast>>>,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastQueue {
    pub fn new() -> Self {
        let (toasts, _) = watch::channel(Vec::new());
        Self {
            toasts: Arc::new(toasts),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.toasts.subscribe()
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        self.toasts.borrow().clone()
    }

    /// Push a toast and schedule its removal after `duration`.
    /// Returns the generated id.
    pub fn add(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) -> String {
        let id = random_id();
        let toast = Toast {
            id: id.clone(),
            message: message.into(),
            kind,
            duration,
        };
        self.toasts.send_modify(|t| t.push(toast));

        if !duration.is_zero() {
            match Handle::try_current() {
                Ok(handle) => {
                    let queue = self.clone();
                    let expired = id.clone();
                    handle.spawn(async move {
                        tokio::time::sleep(duration).await;
                        queue.remove(&expired);
                    });
                }
                Err(_) => warn!(toast_id = %id, "No async runtime, toast will not expire"),
            }
        }

        id
    }

    /// Removing an unknown id is a no-op.
    pub fn remove(&self, id: &str) {
        self.toasts.send_if_modified(|t| {
            let before = t.len();
            t.retain(|toast| toast.id != id);
            t.len() != before
        });
    }

    pub fn success(&self, message: impl Into<String>) -> String {
        self.add(message, ToastKind::Success, DEFAULT_TOAST_DURATION)
    }

    pub fn error(&self, message: impl Into<String>) -> String {
        self.add(message, ToastKind::Error, DEFAULT_TOAST_DURATION)
    }

    pub fn info(&self, message: impl Into<String>) -> String {
        self.add(message, ToastKind::Info, DEFAULT_TOAST_DURATION)
    }

    pub fn warning(&self, message: impl Into<String>) -> String {
        self.add(message, ToastKind::Warning, DEFAULT_TOAST_DURATION)
    }
}

fn random_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOAST_ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}
