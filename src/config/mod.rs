//! Configuration management for `civic_issues`.
//!
//! Configuration is loaded from YAML files with support for:
//! - User config (`$XDG_CONFIG_HOME/civic/config.yaml`, or `~/.config/civic/config.yaml`)
//! - Workspace config (`.civic/config.yaml`)
//! - An explicit `--config` file
//! - Environment variable overrides (`CIVIC_*`)
//! - Command-line overrides
//!
//! Later layers win field by field; a layer only sets what it names.

use std::fs;
use std::path::{Path, PathBuf};

use civic_lib::{CivicError, Coordinates, FixedGeolocator, SortBy, TransitionPolicy};
use serde::{Deserialize, Serialize};

/// Workspace directory name.
pub const WORKSPACE_DIR: &str = ".civic";
/// Config file name inside each config directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CivicConfig {
    /// Display name used as reporter and comment author.
    pub user: String,
    /// Whether this session may change statuses and post official replies.
    pub admin: bool,
    /// Identity keying the upvote ledger.
    pub client_id: String,
    /// Where the upvote ledger lives.
    pub data_dir: PathBuf,
    pub id_prefix: String,
    pub default_sort: SortBy,
    /// Load the demonstration feed at session start.
    pub seed_sample_data: bool,
    /// Reject status moves back to an earlier stage.
    pub strict_status_transitions: bool,
    /// Fixed device position; without one, location detection fails.
    pub location: Option<LocationConfig>,
    pub log_file: Option<PathBuf>,
}

impl Default for CivicConfig {
    fn default() -> Self {
        Self {
            user: "Current User".to_string(),
            admin: false,
            client_id: "default".to_string(),
            data_dir: PathBuf::from(WORKSPACE_DIR),
            id_prefix: "civ".to_string(),
            default_sort: SortBy::Newest,
            seed_sample_data: true,
            strict_status_transitions: false,
            location: None,
            log_file: None,
        }
    }
}

/// Position reported by the device's geolocation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// One config layer as read from a file: every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    pub user: Option<String>,
    pub admin: Option<bool>,
    pub client_id: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub id_prefix: Option<String>,
    pub default_sort: Option<String>,
    pub seed_sample_data: Option<bool>,
    pub strict_status_transitions: Option<bool>,
    pub location: Option<LocationConfig>,
    pub log_file: Option<PathBuf>,
}

/// Overrides from command-line flags; highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub user: Option<String>,
    pub admin: bool,
    /// Start with an empty feed.
    pub empty: bool,
}

impl CivicConfig {
    fn merge(&mut self, layer: PartialConfig) {
        if let Some(user) = layer.user {
            self.user = user;
        }
        if let Some(admin) = layer.admin {
            self.admin = admin;
        }
        if let Some(client_id) = layer.client_id {
            self.client_id = client_id;
        }
        if let Some(data_dir) = layer.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(prefix) = layer.id_prefix {
            self.id_prefix = prefix;
        }
        if let Some(sort) = layer.default_sort {
            match SortBy::parse_lenient(&sort) {
                Some(sort) => self.default_sort = sort,
                None => tracing::warn!(sort, "ignoring unknown default_sort"),
            }
        }
        if let Some(seed) = layer.seed_sample_data {
            self.seed_sample_data = seed;
        }
        if let Some(strict) = layer.strict_status_transitions {
            self.strict_status_transitions = strict;
        }
        if layer.location.is_some() {
            self.location = layer.location;
        }
        if layer.log_file.is_some() {
            self.log_file = layer.log_file;
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), CivicError> {
        if let Some(user) = lookup("CIVIC_USER") {
            self.user = user;
        }
        if let Some(admin) = lookup("CIVIC_ADMIN") {
            self.admin = parse_bool("CIVIC_ADMIN", &admin)?;
        }
        if let Some(client_id) = lookup("CIVIC_CLIENT_ID") {
            self.client_id = client_id;
        }
        if let Some(dir) = lookup("CIVIC_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(user) = &cli.user {
            self.user.clone_from(user);
        }
        if cli.admin {
            self.admin = true;
        }
        if cli.empty {
            self.seed_sample_data = false;
        }
    }

    /// Reject values that would make a session unusable.
    fn check(&self) -> Result<(), CivicError> {
        if self.user.trim().is_empty() {
            return Err(CivicError::Config("user cannot be empty".to_string()));
        }
        if self.client_id.trim().is_empty() {
            return Err(CivicError::Config("client_id cannot be empty".to_string()));
        }
        let prefix = self.id_prefix.trim();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CivicError::Config(format!(
                "id_prefix must be non-empty and alphanumeric, got {:?}",
                self.id_prefix
            )));
        }
        Ok(())
    }

    #[must_use]
    pub const fn transition_policy(&self) -> TransitionPolicy {
        if self.strict_status_transitions {
            TransitionPolicy::ForwardOnly
        } else {
            TransitionPolicy::Permissive
        }
    }

    /// Geolocator answering with the configured position, or one that
    /// always fails when no position is configured.
    #[must_use]
    pub fn geolocator(&self) -> FixedGeolocator {
        match &self.location {
            Some(loc) => {
                let geo = FixedGeolocator::new(Coordinates::new(loc.latitude, loc.longitude));
                match &loc.address {
                    Some(address) => geo.with_address(address.clone()),
                    None => geo,
                }
            }
            None => FixedGeolocator::unavailable(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, CivicError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(CivicError::Config(format!("{key}: expected a boolean, got {other:?}"))),
    }
}

/// User-level config path.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed).join("civic").join(CONFIG_FILE));
        }
    }
    std::env::var("HOME").ok().and_then(|home| {
        let trimmed = home.trim();
        (!trimmed.is_empty()).then(|| {
            PathBuf::from(trimmed)
                .join(".config")
                .join("civic")
                .join(CONFIG_FILE)
        })
    })
}

/// Workspace config path relative to `root`.
#[must_use]
pub fn workspace_config_path(root: &Path) -> PathBuf {
    root.join(WORKSPACE_DIR).join(CONFIG_FILE)
}

/// Read one layer. A missing optional file is an empty layer.
///
/// # Errors
///
/// Returns `FileNotFound` for a missing required file, or `Config` if the
/// file is unreadable or not valid YAML for this schema.
pub fn load_layer(path: &Path, required: bool) -> Result<PartialConfig, CivicError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                return Err(CivicError::FileNotFound(path.to_path_buf()));
            }
            return Ok(PartialConfig::default());
        }
        Err(e) => return Err(CivicError::Io(e)),
    };
    if text.trim().is_empty() {
        return Ok(PartialConfig::default());
    }
    tracing::debug!(path = %path.display(), "loading config layer");
    serde_yaml::from_str(&text)
        .map_err(|e| CivicError::Config(format!("{}: {e}", path.display())))
}

/// Resolve the full configuration for a session rooted at `root`.
///
/// # Errors
///
/// Returns an error if any config file is invalid, an explicit `--config`
/// file is missing, or the merged result fails validation.
pub fn load_config(root: &Path, cli: &CliOverrides) -> Result<CivicConfig, CivicError> {
    load_config_with(root, cli, user_config_path().as_deref(), |key| {
        std::env::var(key).ok()
    })
}

/// [`load_config`] with the user config path and environment injected.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with(
    root: &Path,
    cli: &CliOverrides,
    user_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<CivicConfig, CivicError> {
    let mut config = CivicConfig::default();

    if let Some(path) = user_path {
        config.merge(load_layer(path, false)?);
    }
    config.merge(load_layer(&workspace_config_path(root), false)?);
    if let Some(path) = &cli.config_path {
        config.merge(load_layer(path, true)?);
    }
    config.apply_env(env)?;
    config.apply_cli(cli);

    if config.data_dir.is_relative() {
        config.data_dir = root.join(&config.data_dir);
    }
    config.check()?;
    Ok(config)
}
