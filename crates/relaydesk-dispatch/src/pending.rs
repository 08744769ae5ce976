// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending outbound tasks, queued per room while the room's secure channel
//! is still being established.
//!
//! Tasks are flushed in FIFO order the first time an invite-type membership
//! event is observed for the room. A failing task is logged and skipped so it
//! cannot block the rest of the queue.

use std::collections::HashMap;

use futures::future::BoxFuture;
use relaydesk_core::RelaydeskError;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A deferred outbound action bound to a target room.
pub struct PendingRoomTask {
    label: String,
    task: Box<dyn FnOnce() -> BoxFuture<'static, Result<(), RelaydeskError>> + Send>,
}

/// Per-room FIFO queues of deferred outbound tasks.
#[derive(Default)]
pub struct PendingRoomTasks {
    inner: Mutex<HashMap<String, Vec<PendingRoomTask>>>,
}

impl PendingRoomTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task against `room_id`. The label names the action for logs.
    pub async fn defer<F>(&self, room_id: &str, label: impl Into<String>, task: F)
    where
        F: FnOnce() -> BoxFuture<'static, Result<(), RelaydeskError>> + Send + 'static,
    {
        let label = label.into();
        debug!(room_id = room_id, label = %label, "deferring task until room is ready");
        let mut inner = self.inner.lock().await;
        inner.entry(room_id.to_string()).or_default().push(PendingRoomTask {
            label,
            task: Box::new(task),
        });
    }

    /// Run and clear all tasks queued for `room_id`, in enqueue order.
    ///
    /// Individual task failures are logged, never propagated.
    pub async fn flush(&self, room_id: &str) {
        // Take the queue out under the lock, then run without holding it.
        let tasks = {
            let mut inner = self.inner.lock().await;
            inner.remove(room_id)
        };
        let Some(tasks) = tasks else {
            return;
        };
        debug!(room_id = room_id, count = tasks.len(), "flushing pending room tasks");
        for pending in tasks {
            if let Err(e) = (pending.task)().await {
                warn!(
                    room_id = room_id,
                    label = %pending.label,
                    error = %e,
                    "pending room task failed"
                );
            }
        }
    }

    /// Number of tasks currently queued for `room_id`.
    pub async fn queued(&self, room_id: &str) -> usize {
        self.inner
            .lock()
            .await
            .get(room_id)
            .map(|v| v.len())
            .unwrap_or(0)
    }
}
