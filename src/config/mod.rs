//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional; path from CHRONOBOND_CONFIG)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - A missing swap backend URL is a valid mode: quotes are unavailable

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{AppConfig, ChainConfig, ObservabilityConfig, ServerConfig, SwapConfig};
