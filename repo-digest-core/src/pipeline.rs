//! High-level pipeline: orchestrates enumerate → admit → reduce → assemble.
//!
//! This module wires the four pipeline components together for a single
//! source descriptor:
//!   - Enumerates the source (directory, local zip or remote zip) through
//!     [`source::collect_entries`], consulting the [`AdmissionFilter`] per entry
//!   - Reduces every admitted entry with the [`LanguageReducer`]
//!   - Folds the reduced sections into a [`Digest`] with the [`DigestAssembler`]
//!
//! # Responsibilities
//! - Fail-fast on archive-level errors: no partial digest is ever returned
//! - Never fail on file-level errors: parse failures degrade to a fallback tier
//! - Preserve enumeration order from source to digest
//! - Log milestones under the `[DIGEST]` prefix
//!
//! # Callable From
//! - The CLI crate and integration tests
//! - [`build_digest`] uses the default [`HttpFetcher`]; [`build_digest_with`]
//!   takes any [`ArchiveFetcher`] and a [`CancellationToken`]
//!
//! # Cancellation
//! The token is honoured while fetching and while enumerating. Reduction of
//! already-enumerated entries is synchronous and runs to completion.
//!
//! # Navigation
//! - Main entrypoints: [`build_digest`], [`build_digest_with`]
//! - Output: [`Digest`], [`crate::digest::SectionSummary`]

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::admission::{AdmissionFilter, IgnoreSet};
use crate::config::{DigestFormat, DigestOptions};
use crate::contract::ArchiveFetcher;
use crate::digest::{Digest, DigestAssembler};
use crate::error::Result;
use crate::fetch::HttpFetcher;
use crate::reduce::LanguageReducer;
use crate::source::{self, SourceDescriptor};

/// Build a digest with the default HTTP fetcher and no external cancellation.
pub async fn build_digest(descriptor: &str, options: &DigestOptions) -> Result<Digest> {
    let fetcher = HttpFetcher::new(&options.fetch)?;
    build_digest_with(descriptor, options, &fetcher, &CancellationToken::new()).await
}

/// Build a digest with an injected fetcher and cancellation token.
pub async fn build_digest_with<F>(
    descriptor: &str,
    options: &DigestOptions,
    fetcher: &F,
    cancel: &CancellationToken,
) -> Result<Digest>
where
    F: ArchiveFetcher + ?Sized,
{
    let source = SourceDescriptor::parse(descriptor);
    info!(source = %source, format = ?options.format, "[DIGEST] Starting digest pipeline");

    let ignore = IgnoreSet::with_extra(options.ignore_dirs.iter().map(String::as_str));
    debug!(ignore = ?ignore.iter().collect::<Vec<_>>(), "[DIGEST] Effective ignore set");
    let admission = AdmissionFilter::new(ignore);

    // --- Step 1: Enumerate ---
    let entries =
        match source::collect_entries(&source, &admission, fetcher, &options.fetch, cancel).await {
            Ok(entries) => {
                info!(source = %source, entries = entries.len(), "[DIGEST] Enumeration succeeded");
                entries
            }
            Err(e) => {
                error!(source = %source, error = %e, "[DIGEST][ERROR] Enumeration failed");
                return Err(e);
            }
        };

    // --- Step 2 & 3: Reduce and assemble, in enumeration order ---
    let reducer = LanguageReducer::new();
    let mut assembler = DigestAssembler::new(options.format);
    for entry in &entries {
        match options.format {
            DigestFormat::Annotated => {
                let result = reducer.reduce(&entry.virtual_path, &entry.text());
                debug!(
                    path = %entry.virtual_path,
                    tier = ?result.tier,
                    input_bytes = entry.content.len(),
                    output_bytes = result.text.len(),
                    "[DIGEST] Reduced entry"
                );
                assembler.push_reduced(entry, &result);
            }
            DigestFormat::Markdown => assembler.push_markdown(entry),
        }
    }

    let digest = assembler.finish();
    info!(
        sections = digest.sections.len(),
        fallbacks = digest.fallbacks().count(),
        bytes = digest.text.len(),
        "[DIGEST] Digest assembled"
    );
    match serde_json::to_string(&digest.sections) {
        Ok(json) => debug!(sections = %json, "[DIGEST] Section report"),
        Err(e) => debug!(error = %e, "[DIGEST] Could not serialise section report"),
    }

    Ok(digest)
}
