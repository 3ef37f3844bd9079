use std::time::Duration;

use envconfig::Envconfig;

/// Process-level configuration. Provider configs are static Rust
/// construction; only the API keys and bind address they close over come
/// from the environment.
#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(from = "BIND_HOST", default = "0.0.0.0")]
    pub bind_host: String,

    #[envconfig(from = "BIND_PORT", default = "3000")]
    pub bind_port: u16,

    #[envconfig(from = "ORION_API_KEY", default = "mySecretKey123")]
    pub orion_api_key: String,

    #[envconfig(from = "ASTRA_API_KEY", default = "1234jhgf")]
    pub astra_api_key: String,

    #[envconfig(from = "JOB_CLEANUP_DELAY_SECS", default = "60")]
    pub job_cleanup_delay_secs: u64,
}

impl Config {
    pub fn job_cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.job_cleanup_delay_secs)
    }
}
