//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize, DDB_* environment overrides)
//!     → validation.rs (semantic checks)
//!     → CoordinatorConfig (validated, immutable)
//!     → published through ArcSwap to every run
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<CoordinatorConfig>
//!     → the next run observes the new retry/TTL settings
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod duration;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use duration::{parse_duration, GoDuration};
pub use loader::{resolve_config, resolve_config_with, ConfigError};
pub use schema::{
    CircuitConfig, CoordinatorConfig, InvocationConfig, JitterStrategy, ListenerConfig, LogFormat,
    ObservabilityConfig, ReadFailurePolicy, RetryConfig, StoreBackend, StoreConfig, TargetConfig,
};
pub use watcher::{ConfigWatcher, SharedConfig};
