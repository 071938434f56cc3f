/// # repo-digest CLI Interface (Module)
///
/// Command parsing and user-visible invocation for repo-digest.
///
/// All pipeline logic lives in the [`repo-digest-core`] crate; this module
/// resolves options, runs the pipeline and writes the digest where the user
/// asked for it.
///
/// ## How To Use
/// - From the shell: `repo-digest digest <SOURCE> [--ignore DIR]... [--output FILE]`.
/// - Programmatically: call [`run`] with a constructed [`Cli`].
///
/// [`repo-digest-core`]: ../../repo-digest-core/
use crate::load_config::{load_config, CliConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use repo_digest_core::config::{DigestFormat, DigestOptions};
use repo_digest_core::pipeline::build_digest;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// CLI for repo-digest: condense a repository into one LLM-ready text.
#[derive(Parser)]
#[clap(
    name = "repo-digest",
    version,
    about = "Condense a repository directory, zip archive or archive URL into a structural digest"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a digest of one source and print it (or write it to --output)
    Digest {
        /// Repository URL, path to a .zip archive, or directory
        source: String,
        /// Extra directory names to skip (repeatable)
        #[clap(long = "ignore", value_name = "DIR")]
        ignore: Vec<String>,
        /// Write the digest to this file instead of stdout
        #[clap(long, short)]
        output: Option<PathBuf>,
        /// Output format; overrides the config file
        #[clap(long, value_enum)]
        format: Option<OutputFormat>,
        /// Path to an optional YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Annotated,
    Markdown,
}

impl From<OutputFormat> for DigestFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Annotated => DigestFormat::Annotated,
            OutputFormat::Markdown => DigestFormat::Markdown,
        }
    }
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Digest {
            source,
            ignore,
            output,
            format,
            config,
        } => {
            let options = resolve_options(config.as_deref(), &ignore, format)?;
            options.trace_loaded();
            tracing::info!(command = "digest", source = %source, "Starting digest");

            let digest = match build_digest(&source, &options).await {
                Ok(digest) => digest,
                Err(e) => {
                    tracing::error!(command = "digest", source = %source, error = %e, "Digest failed");
                    return Err(
                        anyhow::Error::new(e).context(format!("Failed to build digest for {source}"))
                    );
                }
            };

            match output {
                Some(path) => write_output(&path, digest.as_str())?,
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout
                        .write_all(digest.as_str().as_bytes())
                        .context("Failed to write digest to stdout")?;
                    stdout.flush().context("Failed to flush stdout")?;
                }
            }
            tracing::info!(
                command = "digest",
                sections = digest.sections.len(),
                fallbacks = digest.fallbacks().count(),
                "Digest complete"
            );
            Ok(())
        }
    }
}

fn resolve_options(
    config: Option<&Path>,
    ignore: &[String],
    format: Option<OutputFormat>,
) -> Result<DigestOptions> {
    let file_config = match config {
        Some(path) => load_config(path)?,
        None => CliConfig::default(),
    };
    Ok(file_config.into_options(ignore, format.map(DigestFormat::from)))
}

fn write_output(path: &Path, digest: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    fs::write(path, digest).with_context(|| format!("Failed to write digest to {}", path.display()))?;
    tracing::info!(output = %path.display(), bytes = digest.len(), "Wrote digest");
    Ok(())
}
