//! In-memory user store with replay-most-recent semantics.
//!
//! Backed by a `tokio::sync::watch` channel: a single slot holding the last
//! known user. Every new subscriber first receives that value, then every
//! subsequent change; a slow consumer skips intermediate values instead of
//! replaying history.

use std::sync::Arc;

use async_trait::async_trait;
use bridge::UserDataSource;
use futures::{stream::BoxStream, StreamExt};
use shared::{
    domain::{User, UserId},
    error::StreamTerminated,
};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

pub struct InMemoryUserStore {
    current: watch::Sender<Option<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Arc<Self> {
        let (current, _) = watch::channel(None);
        Arc::new(Self { current })
    }

    /// Store seeded with one user; an absent id is assigned here, as a write
    /// would.
    pub fn with_user(user: User) -> Arc<Self> {
        let (current, _) = watch::channel(Some(Self::ensure_identity(user)));
        Arc::new(Self { current })
    }

    pub fn current_user(&self) -> Option<User> {
        self.current.borrow().clone()
    }

    fn ensure_identity(user: User) -> User {
        match user.id {
            Some(_) => user,
            None => User::with_id(UserId::generate(), user.name),
        }
    }
}

#[async_trait]
impl UserDataSource for InMemoryUserStore {
    fn user_updates(&self) -> BoxStream<'static, Result<User, StreamTerminated>> {
        WatchStream::new(self.current.subscribe())
            .filter_map(|slot| async move { slot.map(Ok) })
            .boxed()
    }

    async fn insert_or_update_user(&self, user: User) -> anyhow::Result<()> {
        let stored = Self::ensure_identity(user);
        debug!(user_id = ?stored.id, "storing user");
        // publishing through the slot is the read-back path for writers
        self.current.send_replace(Some(stored));
        Ok(())
    }
}
