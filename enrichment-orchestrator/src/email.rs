use async_trait::async_trait;
use enrichment_common::Lead;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("email verification activity failed for {workflow_id}: {message}")]
pub struct EmailVerificationError {
    pub workflow_id: String,
    pub message: String,
}

/// The email-verification activity, modeled as an opaque capability — its
/// implementation (an external call, e.g. to a durable-workflow activity)
/// is deliberately left out of this crate. `workflow_id` carries the
/// idempotency key the orchestrator derives per-cell, so a real
/// implementation can de-duplicate re-delivered activity calls.
#[async_trait]
pub trait EmailVerifier: Send + Sync {
    async fn verify(&self, workflow_id: &str, lead: &Lead) -> Result<bool, EmailVerificationError>;
}

/// Always returns a fixed verdict. Useful for running the core end-to-end
/// without a real email-verification backend, and in tests.
pub struct FixedEmailVerifier {
    pub verdict: bool,
}

impl FixedEmailVerifier {
    pub fn new(verdict: bool) -> Self {
        Self { verdict }
    }
}

#[async_trait]
impl EmailVerifier for FixedEmailVerifier {
    async fn verify(&self, _workflow_id: &str, _lead: &Lead) -> Result<bool, EmailVerificationError> {
        Ok(self.verdict)
    }
}
