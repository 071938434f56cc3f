use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Everything a digest run needs besides the source descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestOptions {
    /// Extra directory names pruned during traversal, on top of the defaults.
    pub ignore_dirs: Vec<String>,
    pub format: DigestFormat,
    pub fetch: FetchConfig,
}

impl DigestOptions {
    pub fn trace_loaded(&self) {
        info!(
            ignore_dirs = ?self.ignore_dirs,
            format = ?self.format,
            "Loaded DigestOptions"
        );
        debug!(?self, "DigestOptions loaded (full debug)");
    }
}

/// Output flavour of the digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestFormat {
    /// Reduced sections behind `<marker> File: <path>` headers
    #[default]
    Annotated,
    /// Unreduced files in fenced markdown blocks behind `## <path>` headers
    Markdown,
}

/// Timeout/retry policy for remote archives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Branch, tag or commit requested from the archive endpoint; `HEAD`
    /// (the default branch) when unset.
    pub reference: Option<String>,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            reference: None,
            timeout_secs: 30,
            max_attempts: 2,
            initial_backoff_ms: 500,
        }
    }
}

impl FetchConfig {
    pub fn reference(&self) -> &str {
        self.reference.as_deref().unwrap_or("HEAD")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Never fewer than one attempt, whatever the config says.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}
