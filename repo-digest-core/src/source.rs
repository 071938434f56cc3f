//! Archive source adapter: turns a source descriptor into repository entries.
//!
//! Three input forms are supported and all end up as an ordered
//! `Vec<RepositoryEntry>`:
//!
//! - **URL** (`http…`): fetched through an [`ArchiveFetcher`], then read as zip.
//! - **Zip** (`….zip`): read from disk.
//! - **Directory** (anything else): walked recursively.
//!
//! # Ordering
//! Zip entries come out in member order. Directory entries come out in walk
//! order with siblings sorted by file name, so the same tree always yields the
//! same sequence.
//!
//! # Admission
//! The [`AdmissionFilter`] is consulted per entry *before* its bytes are read,
//! and ignored directories are pruned before the walk descends into them.
//!
//! # Errors
//! Every error here is fatal for the run; see [`SourceError`].

use std::fmt;
use std::fs::{self, File};
use std::io::{Cursor, ErrorKind, Read, Seek};
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::admission::AdmissionFilter;
use crate::config::FetchConfig;
use crate::contract::{ArchiveFetcher, RepositoryEntry};
use crate::error::{Result, SourceError};

/// Proxy that packages a sub-directory of a GitHub repository as a zip.
pub const DIRECTORY_DOWNLOAD_PROXY: &str = "https://download-directory.github.io/";

/// Where the repository comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    Url(String),
    Zip(PathBuf),
    Directory(PathBuf),
}

impl SourceDescriptor {
    /// Classify a descriptor: `http…` is a URL, `….zip` a local archive,
    /// anything else a directory.
    pub fn parse(descriptor: &str) -> Self {
        if descriptor.starts_with("http") {
            SourceDescriptor::Url(descriptor.to_string())
        } else if descriptor.ends_with(".zip") {
            SourceDescriptor::Zip(PathBuf::from(descriptor))
        } else {
            SourceDescriptor::Directory(PathBuf::from(descriptor))
        }
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDescriptor::Url(url) => write!(f, "{url}"),
            SourceDescriptor::Zip(path) | SourceDescriptor::Directory(path) => {
                write!(f, "{}", path.display())
            }
        }
    }
}

/// URL of the zip to download for a repository URL.
///
/// `/tree/` URLs point at a sub-directory and go through the directory
/// download proxy; anything else gets `/archive/<reference>.zip` appended.
pub fn archive_url(repo_url: &str, reference: &str) -> String {
    if repo_url.contains("/tree/") {
        format!("{DIRECTORY_DOWNLOAD_PROXY}?{repo_url}")
    } else {
        let base = repo_url.trim_end_matches('/');
        let base = base.strip_suffix(".git").unwrap_or(base);
        format!("{base}/archive/{reference}.zip")
    }
}

/// Enumerate the admitted entries of any source form.
pub async fn collect_entries<F>(
    source: &SourceDescriptor,
    admission: &AdmissionFilter,
    fetcher: &F,
    fetch: &FetchConfig,
    cancel: &CancellationToken,
) -> Result<Vec<RepositoryEntry>>
where
    F: ArchiveFetcher + ?Sized,
{
    if cancel.is_cancelled() {
        return Err(SourceError::Cancelled);
    }
    match source {
        SourceDescriptor::Url(repo_url) => {
            let url = archive_url(repo_url, fetch.reference());
            info!(repo_url = %repo_url, url = %url, "Fetching remote archive");
            let bytes = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                fetched = fetcher.fetch(&url) => fetched?,
            };
            info!(url = %url, size = bytes.len(), "Downloaded remote archive");
            let (admission, cancel) = (admission.clone(), cancel.clone());
            run_blocking(move || read_archive(&url, Cursor::new(bytes), &admission, &cancel)).await
        }
        SourceDescriptor::Zip(path) => {
            let (path, admission, cancel) = (path.clone(), admission.clone(), cancel.clone());
            run_blocking(move || read_zip_file(&path, &admission, &cancel)).await
        }
        SourceDescriptor::Directory(path) => {
            let (path, admission, cancel) = (path.clone(), admission.clone(), cancel.clone());
            run_blocking(move || walk_directory(&path, &admission, &cancel)).await
        }
    }
}

/// Filesystem and zip work runs on tokio's blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        warn!(error = %e, "Source enumeration task failed");
        SourceError::Task(e.to_string())
    })?
}

/// Read the admitted members of a zip file on disk.
pub fn read_zip_file(
    path: &Path,
    admission: &AdmissionFilter,
    cancel: &CancellationToken,
) -> Result<Vec<RepositoryEntry>> {
    let location = path.display().to_string();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %location, "Zip file not found");
            return Err(SourceError::not_found(location));
        }
        Err(e) => return Err(SourceError::io(location, e)),
    };
    read_archive(&location, file, admission, cancel)
}

/// Read the admitted members of any zip stream, in member order.
pub fn read_archive<R: Read + Seek>(
    location: &str,
    reader: R,
    admission: &AdmissionFilter,
    cancel: &CancellationToken,
) -> Result<Vec<RepositoryEntry>> {
    let mut archive = ZipArchive::new(reader).map_err(|e| {
        warn!(location, error = %e, "Not a valid zip archive");
        SourceError::invalid(location, e)
    })?;

    let mut entries = Vec::new();
    for index in 0..archive.len() {
        if cancel.is_cancelled() {
            return Err(SourceError::Cancelled);
        }
        let mut member = archive
            .by_index(index)
            .map_err(|e| SourceError::invalid(location, e))?;
        if member.is_dir() {
            continue;
        }
        let name = member.name().to_string();
        if !admission.is_admitted(&name) {
            debug!(path = %name, "Skipping archive member");
            continue;
        }
        // the declared size is untrusted; never allocate from it
        let mut content = Vec::new();
        member
            .read_to_end(&mut content)
            .map_err(|e| SourceError::invalid(location, e))?;
        if content.len() as u64 != member.size() {
            warn!(location, path = %name, declared = member.size(), actual = content.len(), "Archive member size mismatch");
            return Err(SourceError::invalid(
                location,
                format!("member {name} declares {} bytes but holds {}", member.size(), content.len()),
            ));
        }
        debug!(path = %name, size = content.len(), "Read archive member");
        entries.push(RepositoryEntry::new(name, content));
    }

    info!(location, admitted = entries.len(), members = archive.len(), "Enumerated zip archive");
    Ok(entries)
}

/// Walk a directory tree, pruning ignored directories before descending.
pub fn walk_directory(
    root: &Path,
    admission: &AdmissionFilter,
    cancel: &CancellationToken,
) -> Result<Vec<RepositoryEntry>> {
    let location = root.display().to_string();
    if !root.exists() {
        warn!(path = %location, "Source directory not found");
        return Err(SourceError::not_found(location));
    }
    if !root.is_dir() {
        return Err(SourceError::invalid(location, "not a directory or zip archive"));
    }

    let mut entries = Vec::new();
    visit_dir(root, root, admission, cancel, &mut entries)?;
    info!(path = %location, admitted = entries.len(), "Walked source directory");
    Ok(entries)
}

fn visit_dir(
    dir: &Path,
    root: &Path,
    admission: &AdmissionFilter,
    cancel: &CancellationToken,
    results: &mut Vec<RepositoryEntry>,
) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(SourceError::Cancelled);
    }
    let io_err = |path: &Path, e: std::io::Error| SourceError::io(path.display().to_string(), e);

    let mut children = fs::read_dir(dir)
        .and_then(|read| read.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| io_err(dir, e))?;
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
        let path = child.path();
        let file_type = child.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            let name = child.file_name().to_string_lossy().into_owned();
            if admission.ignore_set().prunes(&name) {
                debug!(path = %path.display(), "Pruning ignored directory");
                continue;
            }
            visit_dir(&path, root, admission, cancel, results)?;
        } else if file_type.is_file() {
            let virtual_path = virtual_path_of(&path, root);
            if !admission.is_admitted(&virtual_path) {
                continue;
            }
            let content = fs::read(&path).map_err(|e| io_err(&path, e))?;
            debug!(path = %virtual_path, size = content.len(), "Read source file");
            results.push(RepositoryEntry::new(virtual_path, content));
        }
    }
    Ok(())
}

/// Slash-separated path of `path` relative to `root`.
fn virtual_path_of(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
