//! a11ypilot Core - Foundation crate for the a11ypilot accessibility platform
//!
//! This crate provides the shared functionality used by the scanning, scoring
//! and CLI crates:
//!
//! # Modules
//!
//! - [`config`]: Strongly-typed configuration with TOML and environment variable support
//! - [`domain`]: Violations, scan results, site context and remediation value objects
//! - [`infrastructure`]: In-memory implementations of the collaborator ports
//! - [`logging`]: Structured logging with tracing
//!
//! # Architecture
//!
//! ```text
//! a11ypilot-core/
//! ├── domain/
//! │   └── audit/        # Value objects, entities and collaborator traits
//! ├── infrastructure/   # In-memory scan repository, usage gates
//! └── config/           # Configuration management and validation
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use a11ypilot_core::Config;
//!
//! let config = Config::load()?;
//! ```
//!
//! Environment variables use the `A11YPILOT__` prefix with double underscore separators:
//!
//! ```bash
//! A11YPILOT__RENDERER__NAVIGATION_TIMEOUT_SECONDS=45
//! A11YPILOT__LLM__OPENAI__API_KEY=sk-...
//! ```

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
