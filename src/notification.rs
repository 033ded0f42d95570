//! Single-slot auto-dismissing message banner.

use log::{debug, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::lock_or_recover;

pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn title(self) -> Option<&'static str> {
        match self {
            Severity::Info => None,
            Severity::Success => Some("Report Generated!"),
            Severity::Error => Some("Generation Failed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub title: Option<String>,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            title: severity.title().map(str::to_string),
        }
    }
}

type CloseCallback = Box<dyn FnOnce() + Send + 'static>;

struct ActiveNotification {
    id: u64,
    notification: Notification,
    on_close: CloseCallback,
    timer: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Slot {
    next_id: u64,
    active: Option<ActiveNotification>,
}

/// Holds at most one visible notification and closes it after a fixed delay.
///
/// The close callback runs exactly once per notification, whichever of the
/// timer or [`NotificationCenter::close`] gets there first. Replacing or
/// dismissing a notification drops its callback without running it.
#[derive(Clone)]
pub struct NotificationCenter {
    slot: Arc<Mutex<Slot>>,
    dismiss_after: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_DISMISS_AFTER)
    }
}

impl NotificationCenter {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            dismiss_after,
        }
    }

    /// Shows `notification`, replacing any visible one, and arms the dismiss timer.
    pub fn show<F>(&self, notification: Notification, on_close: F) -> u64
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = lock_or_recover(&self.slot);
        if let Some(previous) = slot.active.take() {
            cancel_timer(previous.timer);
        }
        slot.next_id += 1;
        let id = slot.next_id;
        debug!("Showing {:?} notification #{}", notification.severity, id);

        let timer = match Handle::try_current() {
            Ok(handle) => {
                let shared = Arc::clone(&self.slot);
                let delay = self.dismiss_after;
                Some(handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    close_if_current(&shared, id);
                }))
            }
            Err(err) => {
                warn!("Notification auto-dismiss not scheduled: {}", err);
                None
            }
        };

        slot.active = Some(ActiveNotification {
            id,
            notification,
            on_close: Box::new(on_close),
            timer,
        });
        id
    }

    /// Closes the visible notification as if the user clicked its close button.
    pub fn close(&self) {
        let closed = {
            let mut slot = lock_or_recover(&self.slot);
            slot.active.take()
        };
        if let Some(active) = closed {
            cancel_timer(active.timer);
            (active.on_close)();
        }
    }

    /// Removes the visible notification without running its close callback.
    pub fn dismiss(&self) {
        let removed = lock_or_recover(&self.slot).active.take();
        if let Some(active) = removed {
            cancel_timer(active.timer);
        }
    }

    pub fn current(&self) -> Option<Notification> {
        lock_or_recover(&self.slot)
            .active
            .as_ref()
            .map(|active| active.notification.clone())
    }

    pub fn is_visible(&self) -> bool {
        lock_or_recover(&self.slot).active.is_some()
    }
}

fn cancel_timer(timer: Option<JoinHandle<()>>) {
    if let Some(timer) = timer {
        timer.abort();
    }
}

fn close_if_current(slot: &Mutex<Slot>, id: u64) {
    let expired = {
        let mut guard = lock_or_recover(slot);
        match guard.active.as_ref() {
            Some(active) if active.id == id => guard.active.take(),
            _ => None,
        }
    };
    if let Some(active) = expired {
        debug!("Notification #{} dismissed automatically", id);
        (active.on_close)();
    }
}
