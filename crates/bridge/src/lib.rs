//! Reactive bridge between a user data source and a presentation surface.
//!
//! The bridge subscribes to the source's user stream, projects each emission
//! to a display value, remembers the latest known user for the next write,
//! and commits pending edits back to the source as background work. It never
//! applies its own writes to the latest known user; the authoritative value
//! arrives only through the next stream emission.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::{stream::BoxStream, Stream, StreamExt};
use shared::{
    domain::User,
    error::{PersistenceError, StreamTerminated},
};
use tokio::runtime::Handle;
use tracing::{debug, warn};

mod subscription;

pub use subscription::{DisplayEvent, DisplaySubscription};

/// Boundary contract with the user store.
#[async_trait]
pub trait UserDataSource: Send + Sync {
    /// Stream of the current user. Re-emits on every underlying change,
    /// including after a successful write elsewhere, and supports independent
    /// re-subscription. A replay-most-recent source delivers its last known
    /// value first to each new subscriber. An `Err` item is terminal for that
    /// subscription.
    fn user_updates(&self) -> BoxStream<'static, Result<User, StreamTerminated>>;

    /// Idempotent upsert keyed by `user.id`; an absent id creates a new user.
    /// The assigned id comes back through `user_updates`, not this call.
    async fn insert_or_update_user(&self, user: User) -> anyhow::Result<()>;
}

struct BridgeState {
    latest_user: Option<User>,
    pending_edit: String,
}

/// Mediates between the asynchronous user stream and synchronous
/// display/edit state.
///
/// Overlapping `commit_edit` calls are not serialized here: they produce two
/// independent racing writes, last-write-wins at the source. The surface is
/// expected to disable its trigger while a commit is outstanding.
pub struct UserBridge {
    data_source: Arc<dyn UserDataSource>,
    io: Handle,
    state: Mutex<BridgeState>,
}

impl UserBridge {
    /// Bridge using the ambient runtime for background writes. Must be
    /// called from within a tokio runtime.
    pub fn new(data_source: Arc<dyn UserDataSource>) -> Arc<Self> {
        Self::with_io_runtime(data_source, Handle::current())
    }

    /// Bridge with an explicit background execution context for writes and
    /// stream forwarding.
    pub fn with_io_runtime(data_source: Arc<dyn UserDataSource>, io: Handle) -> Arc<Self> {
        Arc::new(Self {
            data_source,
            io,
            state: Mutex::new(BridgeState {
                latest_user: None,
                pending_edit: String::new(),
            }),
        })
    }

    /// Derived display values, one per user emitted by the source.
    ///
    /// Each call subscribes afresh. For every emission the bridge records the
    /// user as latest known, then yields its name. The sequence is open-ended
    /// while the source stream is; a source error yields one `Err` and the
    /// sequence ends. The bridge does not resubscribe on its own.
    pub fn observe_display_value(
        self: &Arc<Self>,
    ) -> impl Stream<Item = Result<String, StreamTerminated>> + Send + 'static {
        let bridge = Arc::clone(self);
        self.data_source.user_updates().map(move |item| match item {
            Ok(user) => {
                let name = user.name.clone();
                bridge.lock_state().latest_user = Some(user);
                Ok(name)
            }
            Err(err) => {
                warn!(reason = %err.reason, "user stream terminated");
                Err(err)
            }
        })
    }

    /// Record unsaved user input. Synchronous; no other side effects.
    pub fn set_pending_edit(&self, text: impl Into<String>) {
        self.lock_state().pending_edit = text.into();
    }

    pub fn pending_edit(&self) -> String {
        self.lock_state().pending_edit.clone()
    }

    pub fn latest_known_user(&self) -> Option<User> {
        self.lock_state().latest_user.clone()
    }

    /// Write the pending edit back to the source.
    ///
    /// With a latest known user the outgoing record keeps its identity and
    /// replaces the name; without one a new, id-less user is written. The
    /// write runs on the background runtime. Success resolves unit; failure
    /// carries the underlying cause and leaves both the pending edit and the
    /// latest known user untouched. The read-back happens through the next
    /// stream emission, never through this call.
    pub async fn commit_edit(&self) -> Result<(), PersistenceError> {
        let outgoing = {
            let state = self.lock_state();
            match &state.latest_user {
                Some(latest) => latest.with_name(state.pending_edit.clone()),
                None => User::new(state.pending_edit.clone()),
            }
        };
        debug!(user_id = ?outgoing.id, "committing pending edit");

        let data_source = Arc::clone(&self.data_source);
        let write = self
            .io
            .spawn(async move { data_source.insert_or_update_user(outgoing).await });

        match write.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                warn!("user write failed: {err:#}");
                Err(PersistenceError::from(err))
            }
            Err(err) => {
                warn!("user write task did not complete: {err}");
                Err(PersistenceError::from(anyhow::anyhow!(
                    "write task did not complete: {err}"
                )))
            }
        }
    }

    pub(crate) fn io_handle(&self) -> &Handle {
        &self.io
    }

    fn lock_state(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests;
