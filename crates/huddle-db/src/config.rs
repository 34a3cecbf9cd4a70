use std::env;
use std::path::{Path, PathBuf};

/// Snapshot storage configuration.
///
/// Reads from the `HUDDLE_DATA_DIR` environment variable, falling back to
/// `$XDG_DATA_HOME/huddle` or `~/.local/share/huddle` when unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding one `<key>.json` snapshot per collection.
    pub data_dir: PathBuf,
}

impl StoreConfig {
    /// Environment variable that overrides the data directory.
    pub const DATA_DIR_ENV: &str = "HUDDLE_DATA_DIR";

    /// Build a config from the environment.
    ///
    /// Priority: `HUDDLE_DATA_DIR` env var, then [`Self::default_data_dir`].
    pub fn from_env() -> Self {
        let data_dir = env::var_os(Self::DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_data_dir);
        Self { data_dir }
    }

    /// Build a config from an explicit directory (useful for tests and CLI flags).
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The XDG data directory for huddle.
    ///
    /// Uses the XDG layout on every platform rather than `dirs::data_dir()`,
    /// which points into `~/Library/Application Support` on macOS.
    pub fn default_data_dir() -> PathBuf {
        if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("huddle");
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".local")
            .join("share")
            .join("huddle")
    }

    /// Path of the snapshot file backing `key`.
    pub fn snapshot_path(&self, key: &str) -> PathBuf {
        snapshot_path_in(&self.data_dir, key)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

pub(crate) fn snapshot_path_in(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_new() {
        let cfg = StoreConfig::new("/tmp/huddle-data");
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/huddle-data"));
    }

    #[test]
    fn snapshot_path_appends_json_extension() {
        let cfg = StoreConfig::new("/var/lib/huddle");
        assert_eq!(
            cfg.snapshot_path("saved_plans"),
            PathBuf::from("/var/lib/huddle/saved_plans.json")
        );
    }

    #[test]
    fn default_data_dir_ends_with_huddle() {
        assert!(StoreConfig::default_data_dir().ends_with("huddle"));
    }
}
