//! Configuration file management for huddle.
//!
//! Provides a TOML-based config file at `~/.config/huddle/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use huddle_core::generate::{Audience, CommandGenerator};
use huddle_db::config::StoreConfig;

/// Environment variable that overrides the generator command.
pub const GENERATOR_COMMAND_ENV: &str = "HUDDLE_GENERATOR_COMMAND";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub generator: GeneratorSection,
    #[serde(default)]
    pub organization: OrganizationSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSection {
    /// Program that reads a prompt on stdin and prints the reply.
    pub command: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            command: CommandGenerator::DEFAULT_COMMAND.to_string(),
            args: vec!["-p".to_string()],
            timeout_secs: CommandGenerator::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationSection {
    pub name: String,
    pub region: String,
}

impl Default for OrganizationSection {
    fn default() -> Self {
        let audience = Audience::default();
        Self {
            name: audience.organization,
            region: audience.region,
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the huddle config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/huddle` or `~/.config/huddle`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("huddle");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("huddle")
}

/// Return the path to the huddle config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    parse_config(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))
}

/// Like [`load_config`], but a missing file is `Ok(None)`. A file that
/// exists and does not parse is still an error.
pub fn load_config_if_present() -> Result<Option<ConfigFile>> {
    if !config_path().is_file() {
        return Ok(None);
    }
    load_config().map(Some)
}

fn parse_config(contents: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(contents)?)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct HuddleConfig {
    pub store: StoreConfig,
    pub generator: GeneratorSection,
    pub audience: Audience,
}

impl HuddleConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Data dir: `cli_data_dir` > `HUDDLE_DATA_DIR` env > `storage.data_dir` > XDG data dir
    /// - Generator command: `HUDDLE_GENERATOR_COMMAND` env > `generator.command` > `claude`
    /// - Organization: `organization.name` / `organization.region` > defaults
    pub fn resolve(cli_data_dir: Option<&Path>) -> Result<Self> {
        let file_config = load_config_if_present()?.unwrap_or_default();

        let data_dir = if let Some(dir) = cli_data_dir {
            dir.to_path_buf()
        } else if let Some(dir) = std::env::var_os(StoreConfig::DATA_DIR_ENV) {
            PathBuf::from(dir)
        } else if let Some(dir) = file_config.storage.data_dir {
            dir
        } else {
            StoreConfig::default_data_dir()
        };

        let mut generator = file_config.generator;
        if let Ok(command) = std::env::var(GENERATOR_COMMAND_ENV) {
            generator.command = command;
        }

        let audience = Audience {
            organization: file_config.organization.name,
            region: file_config.organization.region,
        };

        debug!(
            data_dir = %data_dir.display(),
            generator = %generator.command,
            "resolved configuration"
        );

        Ok(Self {
            store: StoreConfig::new(data_dir),
            generator,
            audience,
        })
    }

    /// The subprocess generator described by the `[generator]` settings.
    pub fn command_generator(&self) -> CommandGenerator {
        CommandGenerator::new(self.generator.command.clone(), self.generator.args.clone())
            .with_timeout(Duration::from_secs(self.generator.timeout_secs))
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
