/// `load_config` module: loads an optional YAML config file, injects
/// environment overrides and merges CLI flags into [`DigestOptions`].
///
/// This is the only place where user-supplied YAML is parsed.
///
/// # Responsibilities
/// - Parse the YAML file into [`CliConfig`] (every key optional)
/// - Append extra ignore directories from `REPO_DIGEST_IGNORE` (comma-separated)
/// - Merge command-line overrides: `--format` replaces the configured format,
///   `--ignore` values are appended to the configured list
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use repo_digest_core::config::{DigestFormat, DigestOptions, FetchConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Environment variable holding extra ignore directories.
pub const IGNORE_ENV_VAR: &str = "REPO_DIGEST_IGNORE";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub ignore: Vec<String>,
    pub format: Option<DigestFormat>,
    pub fetch: FetchConfig,
}

impl CliConfig {
    /// Fold env and command-line overrides into the options the core expects.
    pub fn into_options(self, extra_ignore: &[String], format: Option<DigestFormat>) -> DigestOptions {
        let mut ignore_dirs = self.ignore;
        ignore_dirs.extend(env_ignore_dirs());
        ignore_dirs.extend(extra_ignore.iter().cloned());

        DigestOptions {
            ignore_dirs,
            format: format.or(self.format).unwrap_or_default(),
            fetch: self.fetch,
        }
    }
}

/// Loads the YAML config file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // serde_yaml reads an empty document as null
    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(CliConfig::default());
    }

    match serde_yaml::from_str::<CliConfig>(&config_content) {
        Ok(config) => {
            info!(config_path = ?path_ref, ignore = ?config.ignore, "Parsed config YAML successfully");
            Ok(config)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Directory names from `REPO_DIGEST_IGNORE`, empty when unset.
pub fn env_ignore_dirs() -> Vec<String> {
    match std::env::var(IGNORE_ENV_VAR) {
        Ok(value) => value
            .split(',')
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    }
}
