use serde::{Deserialize, Serialize};

/// Whether a lead's email address has been run through the (external,
/// opaque) email-verification activity yet.
///
/// Modeled as an explicit three-state enum rather than `Option<bool>` so
/// that "unknown" and "known false" are never conflated — the orchestrator
/// (`enrichment-orchestrator`) relies on that distinction to decide whether
/// a `verify-email` cell can be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    #[default]
    Unknown,
    True,
    False,
}

impl TriState {
    pub fn is_known(self) -> bool {
        !matches!(self, TriState::Unknown)
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            TriState::Unknown => None,
            TriState::True => Some(true),
            TriState::False => Some(false),
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value {
            TriState::True
        } else {
            TriState::False
        }
    }
}

/// A lead record as read from, and partially written back to, the
/// persistence store. The orchestrator only ever reads a lead by id and
/// writes back `phone_number` and `email_verified`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email_verified: TriState,
}

impl Lead {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
