pub mod app;
pub mod credentials;
pub mod error;
pub mod loader;

pub use app::{AppConfig, EndpointConfig, RetryConfig};
pub use credentials::{CredentialSource, ProcessEnv};
pub use error::ConfigError;
pub use loader::ensure_env_loaded;
