use thiserror::Error;

/// Outcome of one HTTP attempt against a provider backend: transport/5xx/
/// timeout errors are retryable, 4xx is terminal for the attempt.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("transport error calling {provider}: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("provider {provider} returned server error {status}")]
    ServerError { provider: String, status: u16 },

    #[error("provider {provider} returned client error {status}")]
    ClientError { provider: String, status: u16 },

    #[error("provider {provider} timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("provider {provider} returned an unparseable response: {message}")]
    Decode { provider: String, message: String },
}

impl LookupError {
    /// Transient transport/5xx/timeout errors are retried inside the
    /// provider's own retry loop; 4xx and decode errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LookupError::Transport { .. } | LookupError::ServerError { .. } | LookupError::Timeout { .. }
        )
    }

    pub fn provider(&self) -> &str {
        match self {
            LookupError::Transport { provider, .. }
            | LookupError::ServerError { provider, .. }
            | LookupError::ClientError { provider, .. }
            | LookupError::Timeout { provider, .. }
            | LookupError::Decode { provider, .. } => provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_and_timeout_are_retryable() {
        assert!(LookupError::ServerError {
            provider: "Orion".to_string(),
            status: 500
        }
        .is_retryable());
        assert!(LookupError::Timeout {
            provider: "Orion".to_string(),
            timeout_ms: 10_000
        }
        .is_retryable());
    }

    #[test]
    fn client_error_and_decode_are_not_retryable() {
        assert!(!LookupError::ClientError {
            provider: "Orion".to_string(),
            status: 404
        }
        .is_retryable());
        assert!(!LookupError::Decode {
            provider: "Orion".to_string(),
            message: "bad json".to_string()
        }
        .is_retryable());
    }
}
