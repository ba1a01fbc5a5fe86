//! Model infrastructure module
//!
//! Provides LLM judge adapters behind a factory.
//!
//! # Structure
//! - `types` - provider identity, failure classification, error types
//! - `traits` - GenerativeModel, ProviderClient traits
//! - `adapter` - history translators for each provider format
//! - `retry` - bounded fixed-backoff retry policy
//! - `rotation` - API key pool with shared current index
//! - `generative` - ModelAdapter: retry + rotation + cancellation over a client
//! - `clients` - Gemini, Anthropic and OpenAI-compatible wire clients
//! - `factory` - model-name resolution

pub mod adapter;
pub mod clients;
pub mod factory;
pub mod generative;
pub mod retry;
pub mod rotation;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use factory::{FactoryError, ModelFactory};
pub use generative::ModelAdapter;
pub use retry::RetryPolicy;
pub use rotation::KeyRotation;
pub use traits::{GenerativeModel, ProviderClient};
pub use types::{FailureClass, ModelError, ProviderError, ProviderKind};
