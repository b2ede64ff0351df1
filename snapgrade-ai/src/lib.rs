pub mod basic;
pub mod local;
pub mod models;
pub mod provider;
pub mod validation;

// Re-export public APIs
pub use basic::{FallbackBasicProvider, RemoteBasicProvider, fallback_report};
pub use local::{LocalBasicProvider, inspect_image, local_report};
pub use models::ProviderConfig;
pub use provider::{GeminiProvider, UnconfiguredFullBackend};
