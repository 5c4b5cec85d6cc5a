//! Environment helpers
//!
//! Only binaries read the process environment. Libraries receive explicit
//! configuration values built from these helpers.

use std::path::PathBuf;

/// Load a `.env` file from the current directory or its parents, if any
pub fn load_dotenv() -> Option<PathBuf> {
    dotenv::dotenv().ok()
}

/// Read an environment variable, treating blank values as unset
pub fn env_non_empty(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

/// Trim a value and drop it if nothing is left
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
