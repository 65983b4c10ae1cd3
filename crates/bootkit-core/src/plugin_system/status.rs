use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_stream::wrappers::ReceiverStream;

use crate::kernel::constants::STATUS_CHANNEL_CAPACITY;
use crate::plugin_system::error::PluginSystemError;

/// Lifecycle status of a plugin. Only transitions carry meaning, not ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PluginStatus {
    /// Created but never started.
    #[default]
    Idle,
    Running,
    Stopped,
    Error,
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PluginStatus::Idle => "Idle",
            PluginStatus::Running => "Running",
            PluginStatus::Stopped => "Stopped",
            PluginStatus::Error => "Error",
        };
        f.write_str(s)
    }
}

/// A status change. `error` is set when the change was caused by a failure.
#[derive(Debug, Clone)]
pub struct StatusEvent {
    pub status: PluginStatus,
    pub error: Option<Arc<PluginSystemError>>,
}

/// Read side of a plugin's status notifications.
pub type StatusStream = ReceiverStream<StatusEvent>;

/// Status holder shared by plugin implementations.
///
/// Emits a [`StatusEvent`] on every change (never for a repeated status) over
/// a bounded channel. Sending never blocks: when the subscriber falls behind
/// the newest event is dropped and a warning is logged.
#[derive(Debug)]
pub struct StatusTracker {
    owner: String,
    current: Mutex<PluginStatus>,
    sender: mpsc::Sender<StatusEvent>,
    receiver: Mutex<Option<mpsc::Receiver<StatusEvent>>>,
}

impl StatusTracker {
    pub fn new(owner: impl Into<String>) -> Self {
        Self::with_capacity(owner, STATUS_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(owner: impl Into<String>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            owner: owner.into(),
            current: Mutex::new(PluginStatus::Idle),
            sender,
            receiver: Mutex::new(Some(receiver)),
        }
    }

    pub fn status(&self) -> PluginStatus {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `status`. Returns `true` if it differed from the current one
    /// (and an event was offered to the channel).
    pub fn set(&self, status: PluginStatus, error: Option<PluginSystemError>) -> bool {
        // The lock also orders events from concurrent callers.
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if *current == status {
            return false;
        }
        *current = status;

        let event = StatusEvent {
            status,
            error: error.map(Arc::new),
        };
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => log::warn!(
                "[{}] Status channel full, dropping {} event",
                self.owner,
                event.status
            ),
            // Subscriber went away; nothing left to notify.
            Err(TrySendError::Closed(_)) => {}
        }
        true
    }

    /// Hand out the notification stream. Only the first caller gets it.
    pub fn subscribe(&self) -> Option<StatusStream> {
        self.receiver
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .map(ReceiverStream::new)
    }
}
