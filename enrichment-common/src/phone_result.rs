use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const NONE_PROVIDER: &str = "None";

/// Outcome of one waterfall pass, or of a single provider attempt.
///
/// Invariant: `phone.is_none() => provider == "None" && cost == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneResult {
    pub phone: Option<String>,
    pub provider: String,
    pub cost: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl PhoneResult {
    /// Terminal "no result" outcome, as returned when every provider is exhausted.
    pub fn none() -> Self {
        Self {
            phone: None,
            provider: NONE_PROVIDER.to_string(),
            cost: dec!(0),
            timestamp: Utc::now(),
        }
    }

    pub fn found(phone: String, provider: impl Into<String>, cost: Decimal) -> Self {
        Self {
            phone: Some(phone),
            provider: provider.into(),
            cost,
            timestamp: Utc::now(),
        }
    }

    /// A result for a provider attempt that ran but did not find a phone.
    /// Unlike [`PhoneResult::none`], the provider and cost are attributed —
    /// the attempt was billed even though it found nothing.
    pub fn not_found(provider: impl Into<String>, cost: Decimal) -> Self {
        Self {
            phone: None,
            provider: provider.into(),
            cost,
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.phone.as_deref().is_some_and(|p| !p.is_empty())
    }
}
