//! Lifecycle handle bounding the display subscription to the surface's
//! visible lifetime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::StreamExt;
use shared::error::StreamTerminated;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;

use crate::UserBridge;

/// Events forwarded into the presentation surface's sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    NameChanged(String),
    StreamClosed(StreamTerminated),
}

/// Scoped acquisition of the display stream: `activate` on becoming visible,
/// `deactivate` on becoming inactive, in strict pairs.
///
/// Pending edits and the latest known user live on the bridge and persist
/// across activation cycles; only the forwarding of display values is bounded
/// by this handle. An in-flight `commit_edit` is not cancelled by
/// deactivation; its result is simply discarded if nobody awaits it.
pub struct DisplaySubscription {
    bridge: Arc<UserBridge>,
    sink: mpsc::UnboundedSender<DisplayEvent>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DisplaySubscription {
    pub fn new(bridge: Arc<UserBridge>, sink: mpsc::UnboundedSender<DisplayEvent>) -> Self {
        Self {
            bridge,
            sink,
            task: Mutex::new(None),
        }
    }

    /// (Re)subscribe and start forwarding display values into the sink. A
    /// still-running task from a previous activation is cancelled first, so
    /// at most one forwarding task exists per handle.
    pub fn activate(&self) {
        let mut slot = self.lock_task();
        if let Some(previous) = slot.take() {
            previous.abort();
        }

        let mut stream = Box::pin(self.bridge.observe_display_value());
        let sink = self.sink.clone();
        debug!("display subscription activated");
        *slot = Some(self.bridge.io_handle().spawn(async move {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(name) => {
                        // surface gone; stop forwarding quietly
                        if sink.send(DisplayEvent::NameChanged(name)).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        let _ = sink.send(DisplayEvent::StreamClosed(err));
                        break;
                    }
                }
            }
        }));
    }

    /// Stop forwarding and cancel any in-flight delivery. Idempotent; a
    /// no-op when never activated.
    pub fn deactivate(&self) {
        if let Some(task) = self.lock_task().take() {
            task.abort();
            debug!("display subscription deactivated");
        }
    }

    pub fn is_active(&self) -> bool {
        self.lock_task()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DisplaySubscription {
    fn drop(&mut self) {
        self.deactivate();
    }
}
