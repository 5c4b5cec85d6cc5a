//! Shared utilities for stockchat
//!
//! Logging setup and the small amount of environment handling the binaries
//! need before they build explicit configuration values.

pub mod config;
pub mod logging;

pub use config::{env_non_empty, load_dotenv, non_empty};
pub use logging::init_tracing_with;
