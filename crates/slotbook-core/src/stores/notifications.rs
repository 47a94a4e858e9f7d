use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::try_join;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::Notification;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationsState {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Provider notifications plus a background unread-count poller.
///
/// At most one poller runs at a time. It is aborted by `stop_polling`,
/// by a later `start_polling`, or when the store is dropped.
pub struct NotificationsStore {
    client: ApiClient,
    state: Arc<watch::Sender<NotificationsState>>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationsStore {
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(NotificationsState::default());
        Self {
            client,
            state: Arc::new(state),
            poller: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationsState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> NotificationsState {
        self.state.borrow().clone()
    }

    /// Fetch the notification list and the unread count concurrently.
    pub async fn fetch(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let result = try_join(
            self.client.get_my_notifications(),
            self.client.get_unread_count(),
        )
        .await;

        match result {
            Ok((notifications, unread_count)) => {
                debug!(count = notifications.len(), unread_count, "Fetched notifications");
                self.state.send_modify(|s| {
                    s.notifications = notifications;
                    s.unread_count = unread_count;
                    s.is_loading = false;
                });
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch notifications");
                let message = e.message();
                self.state.send_modify(|s| {
                    s.error = Some(message);
                    s.is_loading = false;
                });
            }
        }
    }

    /// Mark one notification as read, locally and on the server.
    pub async fn mark_as_read(&self, id: &str) -> Result<(), ApiError> {
        if let Err(e) = self.client.mark_notification_read(id).await {
            error!(error = %e, notification_id = id, "Failed to mark notification as read");
            return Err(e);
        }
        self.state.send_modify(|s| {
            if let Some(notification) = s.notifications.iter_mut().find(|n| n.id == id) {
                notification.read = true;
            }
            s.unread_count = s.unread_count.saturating_sub(1);
        });
        Ok(())
    }

    /// Refresh the unread count every `period`, first tick after one period.
    /// Outside a tokio runtime nothing is started.
    pub fn start_polling(&self, period: Duration) {
        if period.is_zero() {
            warn!("Ignoring notification polling with a zero interval");
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime, notification polling not started");
            return;
        };

        let client = self.client.clone();
        let state = Arc::clone(&self.state);
        let handle = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match client.get_unread_count().await {
                    Ok(count) => state.send_modify(|s| s.unread_count = count),
                    Err(e) => warn!(error = %e, "Unread count poll failed"),
                }
            }
        });

        if let Some(previous) = self.poller().replace(handle) {
            previous.abort();
        }
    }

    pub fn stop_polling(&self) {
        if let Some(handle) = self.poller().take() {
            handle.abort();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller().as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn clear(&self) {
        self.state.send_replace(NotificationsState::default());
    }

    fn poller(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.poller.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for NotificationsStore {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
