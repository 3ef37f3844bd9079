use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    VerifyEmail,
    PhoneLookup,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::VerifyEmail => "verify-email",
            Operation::PhoneLookup => "phone-lookup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    EmailVerification,
    PhoneLookup,
    Enrichment,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            JobType::EmailVerification => "email-verification",
            JobType::PhoneLookup => "phone-lookup",
            JobType::Enrichment => "enrichment",
        }
    }
}

/// Immutable point-in-time snapshot of a job's progress, as returned by
/// `JobTracker::get_job`. The mutable, concurrently-updated counters live
/// in `enrichment-orchestrator::job_tracker` — this type is the read-only
/// view handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: String,
    pub kind: JobType,
    pub operations: Option<HashSet<Operation>>,
    pub total_leads: usize,
    pub processed_leads: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobSnapshot {
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_as_str_matches_wire_tags() {
        assert_eq!(Operation::VerifyEmail.as_str(), "verify-email");
        assert_eq!(Operation::PhoneLookup.as_str(), "phone-lookup");
    }

    #[test]
    fn job_type_as_str_matches_wire_tags() {
        assert_eq!(JobType::EmailVerification.as_str(), "email-verification");
        assert_eq!(JobType::PhoneLookup.as_str(), "phone-lookup");
        assert_eq!(JobType::Enrichment.as_str(), "enrichment");
    }

    #[test]
    fn snapshot_is_complete_iff_completed_at_set() {
        let mut snapshot = JobSnapshot {
            id: "job-1".to_string(),
            kind: JobType::PhoneLookup,
            operations: None,
            total_leads: 10,
            processed_leads: 10,
            started_at: Utc::now(),
            completed_at: None,
        };
        assert!(!snapshot.is_complete());

        snapshot.completed_at = Some(Utc::now());
        assert!(snapshot.is_complete());
    }
}
