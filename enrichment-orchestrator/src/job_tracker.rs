use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use enrichment_common::{JobSnapshot, JobType, Operation};
use tokio::sync::Mutex;
use tracing::info;

/// Delay before a finished job's record (and progress-bus room) is dropped,
/// long enough for a late subscriber to still observe the terminal event.
const DEFAULT_CLEANUP_DELAY: Duration = Duration::from_secs(60);

struct JobRecord {
    id: String,
    kind: JobType,
    operations: Option<HashSet<Operation>>,
    total_leads: usize,
    processed_leads: AtomicUsize,
    started_at: DateTime<Utc>,
    completed_at: Mutex<Option<DateTime<Utc>>>,
}

impl JobRecord {
    fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id.clone(),
            kind: self.kind,
            operations: self.operations.clone(),
            total_leads: self.total_leads,
            processed_leads: self.processed_leads.load(Ordering::SeqCst),
            started_at: self.started_at,
            completed_at: *self.completed_at.try_lock().expect("uncontended on read path"),
        }
    }
}

/// Maintains per-process job records keyed by an opaque id.
/// Cheap to clone: internals are behind an `Arc`, so every handle observes
/// the same job state.
#[derive(Clone)]
pub struct JobTracker {
    jobs: Arc<Mutex<HashMap<String, Arc<JobRecord>>>>,
    cleanup_delay: Duration,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::with_cleanup_delay(DEFAULT_CLEANUP_DELAY)
    }

    pub fn with_cleanup_delay(cleanup_delay: Duration) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            cleanup_delay,
        }
    }

    async fn create(&self, kind: JobType, total_leads: usize, operations: Option<HashSet<Operation>>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let record = Arc::new(JobRecord {
            id: id.clone(),
            kind,
            operations,
            total_leads,
            processed_leads: AtomicUsize::new(0),
            started_at: Utc::now(),
            completed_at: Mutex::new(None),
        });

        self.jobs.lock().await.insert(id.clone(), record);
        id
    }

    pub async fn create_job(&self, kind: JobType, total_leads: usize) -> String {
        self.create(kind, total_leads, None).await
    }

    pub async fn create_enrichment_job(&self, total_leads: usize, operations: HashSet<Operation>) -> String {
        self.create(JobType::Enrichment, total_leads, Some(operations)).await
    }

    /// Increments `processedLeads` for `job_id`, stamping `completedAt`
    /// exactly once when it reaches `totalLeads`. Returns the updated
    /// processed count, or `None` if the job is unknown — a tracker lookup
    /// miss is silently ignored, not an error.
    pub async fn increment_progress(&self, job_id: &str) -> Option<usize> {
        let record = self.jobs.lock().await.get(job_id).cloned()?;
        let processed = record.processed_leads.fetch_add(1, Ordering::SeqCst) + 1;

        if processed >= record.total_leads {
            let mut completed_at = record.completed_at.lock().await;
            if completed_at.is_none() {
                let now = Utc::now();
                *completed_at = Some(now);
                let duration_ms = (now - record.started_at).num_milliseconds();
                info!(job_id, total_leads = record.total_leads, duration_ms, "job completed");
                metrics::histogram!("enrichment_job_duration_ms", "kind" => record.kind.as_str())
                    .record(duration_ms as f64);
            }
        }

        Some(processed)
    }

    pub async fn get_job(&self, job_id: &str) -> Option<JobSnapshot> {
        let record = self.jobs.lock().await.get(job_id).cloned()?;
        Some(record.snapshot())
    }

    pub async fn is_complete(&self, job_id: &str) -> bool {
        self.get_job(job_id).await.is_some_and(|job| job.is_complete())
    }

    pub fn cleanup_delay(&self) -> Duration {
        self.cleanup_delay
    }

    /// Schedules removal of `job_id`'s record after the configured cleanup
    /// delay. Fire-and-forget: callers don't await the removal.
    pub fn cleanup(&self, job_id: String) {
        let jobs = self.jobs.clone();
        let delay = self.cleanup_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            jobs.lock().await.remove(&job_id);
        });
    }
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_job_with_zero_progress() {
        let tracker = JobTracker::new();
        let job_id = tracker.create_job(JobType::PhoneLookup, 3).await;

        let job = tracker.get_job(&job_id).await.unwrap();
        assert_eq!(job.total_leads, 3);
        assert_eq!(job.processed_leads, 0);
        assert!(!job.is_complete());
    }

    #[tokio::test]
    async fn stamps_completed_at_exactly_once_when_total_reached() {
        let tracker = JobTracker::new();
        let job_id = tracker.create_job(JobType::PhoneLookup, 2).await;

        assert_eq!(tracker.increment_progress(&job_id).await, Some(1));
        assert!(!tracker.is_complete(&job_id).await);

        assert_eq!(tracker.increment_progress(&job_id).await, Some(2));
        assert!(tracker.is_complete(&job_id).await);

        let first_completion = tracker.get_job(&job_id).await.unwrap().completed_at;

        // A further increment (e.g. a duplicate delivery) must not move
        // completed_at.
        tracker.increment_progress(&job_id).await;
        let second_completion = tracker.get_job(&job_id).await.unwrap().completed_at;
        assert_eq!(first_completion, second_completion);
    }

    #[tokio::test]
    async fn increment_on_unknown_job_is_ignored() {
        let tracker = JobTracker::new();
        assert_eq!(tracker.increment_progress("missing").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_removes_job_after_delay() {
        let tracker = JobTracker::with_cleanup_delay(Duration::from_millis(50));
        let job_id = tracker.create_job(JobType::PhoneLookup, 1).await;

        tracker.cleanup(job_id.clone());
        assert!(tracker.get_job(&job_id).await.is_some());

        tokio::time::advance(Duration::from_millis(60)).await;
        tokio::task::yield_now().await;

        assert!(tracker.get_job(&job_id).await.is_none());
    }

    #[tokio::test]
    async fn create_enrichment_job_records_selected_operations() {
        let tracker = JobTracker::new();
        let mut operations = HashSet::new();
        operations.insert(Operation::PhoneLookup);

        let job_id = tracker.create_enrichment_job(5, operations.clone()).await;
        let job = tracker.get_job(&job_id).await.unwrap();

        assert_eq!(job.kind, JobType::Enrichment);
        assert_eq!(job.operations, Some(operations));
    }
}
