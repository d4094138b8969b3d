//! CLI configuration.
//!
//! Resolution order for the data file: the `--data` flag, then the
//! `SCHETOVOD_DATA` environment variable, then `schetovod.json` in the
//! working directory.

use std::env;
use std::path::PathBuf;

/// Environment variable naming the data file.
pub const DATA_ENV: &str = "SCHETOVOD_DATA";

/// Default data file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "schetovod.json";

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the JSON snapshot file.
    pub data_path: PathBuf,
}

impl Config {
    /// Resolves configuration from the flag and the environment.
    pub fn resolve(data_flag: Option<PathBuf>) -> Self {
        let data_path = data_flag
            .or_else(|| env::var_os(DATA_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));
        Config { data_path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins() {
        let config = Config::resolve(Some(PathBuf::from("/tmp/x.json")));
        assert_eq!(config.data_path, PathBuf::from("/tmp/x.json"));
    }

    #[test]
    fn test_default_file() {
        // The env var is not set under `cargo test` unless exported.
        if env::var_os(DATA_ENV).is_none() {
            let config = Config::resolve(None);
            assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_FILE));
        }
    }
}
