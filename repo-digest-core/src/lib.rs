#![doc = "repo-digest-core: core logic library for repo-digest."]

//! This crate contains the whole repository-to-digest pipeline: source
//! enumeration, file admission, per-language structural reduction and digest
//! assembly. CLI glue and config-file parsing live in the `repo-digest` crate.
//!
//! # Usage
//! Call [`pipeline::build_digest`] with a source descriptor (URL, zip path or
//! directory path) and [`config::DigestOptions`]; hand the returned
//! [`digest::Digest`] text to whatever consumes it.

pub mod admission;
pub mod config;
pub mod contract;
pub mod digest;
pub mod error;
pub mod fetch;
pub mod language;
pub mod pipeline;
pub mod reduce;
pub mod source;
