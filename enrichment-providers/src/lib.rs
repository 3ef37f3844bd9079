mod astra;
pub mod config;
mod http;
mod nimbus;
mod orion;
pub mod provider;
pub mod registry;

pub use astra::AstraProvider;
pub use nimbus::NimbusProvider;
pub use orion::OrionProvider;
pub use provider::{PhoneProvider, ProviderStats};
pub use registry::ProviderRegistry;
