//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + CLI overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed to HttpServer at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the blocklist is read exactly once
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_blocklist_file, load_config, parse_config, ConfigError};
pub use schema::{
    BlocklistConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, ProxySettings,
    SessionConfig, TlsConfig,
};
pub use validation::{validate_config, ValidationError};
