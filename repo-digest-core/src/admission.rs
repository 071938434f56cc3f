//! File admission: decides which repository paths make it into the digest.
//!
//! Admission is a heuristic relevance filter. A wrong rejection only makes the
//! digest less complete and a wrong admission only adds noise, so every rule
//! here is pure string logic over the slash-separated virtual path: no I/O, no
//! globbing, no gitignore parsing.
//!
//! # Rules (all must hold)
//! 1. The path is a file (no trailing `/`) with a supported extension.
//! 2. No path segment starts with `.`.
//! 3. The lower-cased path does not contain `test` anywhere. This is
//!    intentionally coarse: `latest_feature.py` is rejected too.
//! 4. No directory segment is in the [`IgnoreSet`].
//! 5. The path does not contain a known boilerplate file name.

use std::collections::BTreeSet;

use crate::language::SUPPORTED_EXTENSIONS;

/// Directories excluded from every digest.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    "docs",
    "examples",
    "tests",
    "test",
    "__pycache__",
    "scripts",
    "utils",
    "benchmarks",
    "node_modules",
    "env",
    "venv",
    ".venv",
];

/// Packaging, lock-file and doc-generation scripts matched as substrings.
pub const BOILERPLATE_NAMES: &[&str] = &[
    "hubconf.py",
    "setup.py",
    "package-lock.json",
    "stale.py",
    "gen-card-",
    "write_model_card",
];

/// Directory names excluded from admission and pruned during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet {
    dirs: BTreeSet<String>,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self {
            dirs: DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl IgnoreSet {
    /// Built-in defaults plus caller-supplied directory names.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for dir in extra {
            let dir = dir.as_ref().trim().trim_matches('/');
            if !dir.is_empty() {
                set.dirs.insert(dir.to_string());
            }
        }
        set
    }

    pub fn contains(&self, dir_name: &str) -> bool {
        self.dirs.contains(dir_name)
    }

    /// Whether a directory with this name should be skipped before descending
    /// into it. Dot-directories are pruned as well since nothing under them
    /// can be admitted.
    pub fn prunes(&self, dir_name: &str) -> bool {
        dir_name.starts_with('.') || self.contains(dir_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// Composite admission predicate over virtual paths.
#[derive(Debug, Clone, Default)]
pub struct AdmissionFilter {
    ignore: IgnoreSet,
}

impl AdmissionFilter {
    pub fn new(ignore: IgnoreSet) -> Self {
        Self { ignore }
    }

    pub fn ignore_set(&self) -> &IgnoreSet {
        &self.ignore
    }

    pub fn is_admitted(&self, virtual_path: &str) -> bool {
        let path = virtual_path.replace('\\', "/");
        has_supported_extension(&path)
            && !has_hidden_segment(&path)
            && !mentions_test(&path)
            && !self.in_ignored_dir(&path)
            && !is_boilerplate(&path)
    }

    fn in_ignored_dir(&self, path: &str) -> bool {
        let mut segments: Vec<&str> = path.split('/').collect();
        // the last segment is the file name
        segments.pop();
        segments.iter().any(|segment| self.ignore.contains(segment))
    }
}

fn has_supported_extension(path: &str) -> bool {
    !path.ends_with('/') && SUPPORTED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn has_hidden_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment.starts_with('.'))
}

fn mentions_test(path: &str) -> bool {
    path.to_lowercase().contains("test")
}

fn is_boilerplate(path: &str) -> bool {
    BOILERPLATE_NAMES.iter().any(|name| path.contains(name))
}
