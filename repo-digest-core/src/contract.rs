//! # contract: shared data types and the pipeline's pluggable seams
//!
//! This module defines the plain data passed between pipeline stages and the
//! two traits the pipeline is generic over:
//!
//! - [`ArchiveFetcher`]: turns a remote archive URL into zip bytes. The default
//!   implementation is [`crate::fetch::HttpFetcher`]; tests plug in mocks.
//! - [`Reducer`]: reduces one file of a single language family to its
//!   structurally significant parts. One implementation per family lives in
//!   [`crate::reduce`].
//!
//! ## Mocking & Testing
//! - [`ArchiveFetcher`] is annotated for `mockall` so the URL path of the
//!   pipeline can be exercised without a network.
//!
//! ## Error contract
//! - Fetchers return [`SourceError`]; any error they return is fatal to the run.
//! - Reducers never fail. A parse failure degrades to a weaker
//!   [`ReductionTier`] instead.

use async_trait::async_trait;
use serde::Serialize;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::SourceError;
use crate::language::LanguageFamily;

/// One file enumerated from a source, relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryEntry {
    /// Slash-separated path relative to the source root (zip member name for archives)
    pub virtual_path: String,
    pub content: Vec<u8>,
    /// Extension of the file name without the dot
    pub extension: String,
}

impl RepositoryEntry {
    pub fn new(virtual_path: impl Into<String>, content: Vec<u8>) -> Self {
        let virtual_path = virtual_path.into();
        let extension = crate::language::extension_of(&virtual_path);
        Self {
            virtual_path,
            content,
            extension,
        }
    }

    /// Content decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    pub fn family(&self) -> LanguageFamily {
        LanguageFamily::from_path(&self.virtual_path)
    }
}

/// How far a reducer got before it had to give up on structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReductionTier {
    /// Declarations extracted from a clean syntax tree
    Structural,
    /// Parse failed; comments removed with regexes
    CommentStripped,
    /// Parse failed or language unsupported; content left as-is
    Raw,
}

/// Reduced text for one entry. Always present, even when parsing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionResult {
    pub text: String,
    pub tier: ReductionTier,
}

impl ReductionResult {
    pub fn structural(text: String) -> Self {
        Self {
            text,
            tier: ReductionTier::Structural,
        }
    }

    pub fn comment_stripped(text: String) -> Self {
        Self {
            text,
            tier: ReductionTier::CommentStripped,
        }
    }

    pub fn raw(text: String) -> Self {
        Self {
            text,
            tier: ReductionTier::Raw,
        }
    }

    pub fn fell_back(&self) -> bool {
        self.tier != ReductionTier::Structural
    }
}

/// Fetches remote archives as raw bytes.
///
/// Implementors own the timeout and retry policy; the pipeline calls `fetch`
/// exactly once per run.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Download the archive at `url` and return its bytes.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceError>;
}

/// Structural reduction for one language family.
///
/// Implementations must not panic or return errors on malformed input; they
/// pick the weakest tier that still produces text.
pub trait Reducer: Send + Sync {
    fn family(&self) -> LanguageFamily;

    /// Reduce `content`, which was read from `virtual_path`. The path selects
    /// the dialect within the family (for example `.tsx` versus `.js`).
    fn reduce(&self, virtual_path: &str, content: &str) -> ReductionResult;
}
