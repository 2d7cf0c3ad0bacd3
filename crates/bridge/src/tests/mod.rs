use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use shared::{
    domain::User,
    error::StreamTerminated,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::UserDataSource;


/// Scripted data source double: emissions and failures are driven by the
/// test, writes are recorded. Replays the last emission to new subscribers,
/// like a single-slot latest-value source.
pub(crate) struct ScriptedDataSource {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<Result<User, StreamTerminated>>>>,
    last_emitted: Mutex<Option<User>>,
    writes: Mutex<Vec<User>>,
    fail_writes_with: Mutex<Option<String>>,
}

impl ScriptedDataSource {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            subscribers: Mutex::new(Vec::new()),
            last_emitted: Mutex::new(None),
            writes: Mutex::new(Vec::new()),
            fail_writes_with: Mutex::new(None),
        })
    }

    pub(crate) fn emit(&self, user: User) {
        *self.last_emitted.lock().unwrap() = Some(user.clone());
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(Ok(user.clone())).is_ok());
    }

    /// End every open subscription with an error.
    pub(crate) fn terminate(&self, reason: impl Into<String>) {
        let err = StreamTerminated::new(reason);
        let mut subscribers = self.subscribers.lock().unwrap();
        for tx in subscribers.iter() {
            let _ = tx.send(Err(err.clone()));
        }
        // dropping the senders ends the streams after the error item
        subscribers.clear();
    }

    pub(crate) fn fail_writes(&self, reason: impl Into<String>) {
        *self.fail_writes_with.lock().unwrap() = Some(reason.into());
    }

    pub(crate) fn writes(&self) -> Vec<User> {
        self.writes.lock().unwrap().clone()
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

#[async_trait]
impl UserDataSource for ScriptedDataSource {
    fn user_updates(&self) -> BoxStream<'static, Result<User, StreamTerminated>> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(last) = self.last_emitted.lock().unwrap().clone() {
            let _ = tx.send(Ok(last));
        }
        self.subscribers.lock().unwrap().push(tx);
        UnboundedReceiverStream::new(rx).boxed()
    }

    async fn insert_or_update_user(&self, user: User) -> anyhow::Result<()> {
        if let Some(reason) = self.fail_writes_with.lock().unwrap().clone() {
            return Err(anyhow!(reason));
        }
        self.writes.lock().unwrap().push(user);
        Ok(())
    }
}
