use std::collections::HashMap;
use std::sync::Arc;

use enrichment_common::{JobType, Operation};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::Mutex;

/// Capacity of each room's broadcast channel. Generous enough that a
/// subscriber reading at a normal pace never lags the publisher within one
/// job's lifetime; a lagging subscriber sees `RecvError::Lagged` rather than
/// blocking the publisher. Rooms are not persisted — a subscriber that joins
/// late simply misses whatever already fired.
const ROOM_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "operation", rename_all = "kebab-case")]
pub enum OperationData {
    VerifyEmail { email_verified: bool },
    PhoneLookup { phone: Option<String>, provider: String, cost: Decimal },
}

/// One publication on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ProgressEvent {
    OperationComplete {
        lead_id: i64,
        #[serde(flatten)]
        data: OperationData,
        progress: Progress,
    },
    OperationError {
        lead_id: i64,
        operation: Operation,
        error: String,
    },
    JobComplete {
        job_id: String,
        #[serde(rename = "type")]
        kind: JobType,
        total_processed: usize,
    },
}

/// Delivers `(room, event)` publications to any subscribers of `room`,
/// where `room = jobId`. Rooms are created lazily on first publish or
/// subscribe and torn down by `JobTracker`'s delayed cleanup.
#[derive(Clone)]
pub struct ProgressBus {
    rooms: Arc<Mutex<HashMap<String, broadcast::Sender<ProgressEvent>>>>,
}

impl ProgressBus {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn room(&self, job_id: &str) -> broadcast::Sender<ProgressEvent> {
        let mut rooms = self.rooms.lock().await;
        rooms
            .entry(job_id.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .clone()
    }

    /// Publish `event` to `job_id`'s room. A room with no subscribers simply
    /// drops the event — publishing never blocks or fails the caller.
    pub async fn publish(&self, job_id: &str, event: ProgressEvent) {
        let sender = self.room(job_id).await;
        let _ = sender.send(event);
    }

    pub async fn subscribe(&self, job_id: &str) -> broadcast::Receiver<ProgressEvent> {
        self.room(job_id).await.subscribe()
    }

    /// Drops the room for `job_id`, disconnecting any remaining subscribers.
    /// Called by `JobTracker`'s delayed cleanup alongside job-record removal.
    pub async fn remove_room(&self, job_id: &str) {
        self.rooms.lock().await.remove(job_id);
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new()
    }
}
