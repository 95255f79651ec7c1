//! Subscription feed runner.
//!
//! This module is the glue between a [`RemoteDataSource`](crate::RemoteDataSource)
//! subscription and the screen state that reacts to it.
//!
//! [`spawn_feed`] subscribes to one path and drives a receive loop on a tokio
//! task, handing every [`Change`] to a [`ChangeConsumer`]. The loop ends when
//! the subscription is dropped, the data source closes, or the returned
//! [`FeedHandle`] is stopped.
//!
//! ## Error handling
//!
//! Errors returned by [`ChangeConsumer::on_change`] are logged at `warn`
//! level and do not end the loop. One malformed value must not freeze a
//! channel for the rest of the screen's lifetime.
//!
//! ## Teardown
//!
//! [`FeedHandle::stop`] aborts the task and waits for it to finish. Once it
//! returns, the consumer is not called again, so a controller may drop its
//! state right after stopping its feeds. Dropping a handle without `stop`
//! aborts the task as well but does not wait for it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::{
    // ---
    log_debug,
    log_warn,
    Change,
    DataPath,
    DataSourcePtr,
    Result,
};

/// A consumer of changes delivered by one subscription.
///
/// The first change is the value present when the subscription was created.
#[async_trait]
pub trait ChangeConsumer: Send + Sync {
    /// Handle one change.
    ///
    /// Returning an error does not end the feed.
    async fn on_change(&self, change: Change) -> Result<()>;
}

/// Adapts a synchronous closure into a [`ChangeConsumer`].
pub struct FnConsumer<F>(pub F);

#[async_trait]
impl<F> ChangeConsumer for FnConsumer<F>
where
    F: Fn(Change) -> Result<()> + Send + Sync,
{
    async fn on_change(&self, change: Change) -> Result<()> {
        (self.0)(change)
    }
}

/// Owns a running feed task.
#[derive(Debug)]
pub struct FeedHandle {
    // ---
    path: DataPath,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    // ---
    pub fn path(&self) -> &DataPath {
        &self.path
    }

    /// True once the receive loop has exited on its own or been stopped.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stop the feed and wait until the consumer can no longer be called.
    pub async fn stop(mut self) {
        // ---
        if let Some(task) = self.task.take() {
            task.abort();
            // Cancelled is the expected outcome.
            let _ = task.await;
            log_debug!("feed stopped: {}", self.path);
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Subscribe to `path` and dispatch every change to `consumer`.
///
/// Subscription errors are returned to the caller; nothing is spawned in
/// that case.
pub async fn spawn_feed<C>(data: DataSourcePtr, path: DataPath, consumer: Arc<C>) -> Result<FeedHandle>
where
    C: ChangeConsumer + ?Sized + 'static,
{
    // ---
    let mut handle = data.subscribe(&path).await?;

    let task_path = path.clone();
    let task = tokio::spawn(async move {
        // ---
        while let Some(change) = handle.inbox.recv().await {
            if let Err(err) = consumer.on_change(change).await {
                log_warn!("feed consumer error at {task_path}: {err}");
            }
        }
        log_debug!("data source closed or subscription dropped: {task_path}");
    });

    Ok(FeedHandle {
        path,
        task: Some(task),
    })
}
