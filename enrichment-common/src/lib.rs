pub mod error;
pub mod job;
pub mod lead;
pub mod lookup;
pub mod phone_result;
pub mod provider_config;
pub mod retry;

pub use error::LookupError;
pub use job::{JobSnapshot, JobType, Operation};
pub use lead::{Lead, TriState};
pub use lookup::LookupParams;
pub use phone_result::PhoneResult;
pub use provider_config::ProviderConfig;
pub use retry::RetryPolicy;
