//! CLI for stitch, the resumable playlist downloader.

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use stitch_core::config;
use stitch_core::registry::{JobRegistry, RegistryError};
use stitch_core::session::{exit_code, SessionError};

use commands::{run_completions, run_fetch, run_forget, run_status};

/// Top-level CLI. Without a subcommand, downloads and merges the given playlist.
#[derive(Debug, Parser)]
#[command(name = "stitch")]
#[command(about = "stitch: resumable segmented-playlist downloader", long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

/// Arguments of the default download-and-merge invocation.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Playlist manifest URL (http or https).
    #[arg(required = true)]
    pub url: Option<String>,

    /// Working directory name for a new job; also the output file name.
    /// Ignored when the URL is already tracked.
    pub working_dir: Option<String>,

    /// Directory for the merged file (default: the Downloads directory).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Let the remux tool replace an existing output file.
    #[arg(long)]
    pub overwrite: bool,

    /// Remux executable to use instead of the configured one.
    #[arg(long, value_name = "PATH")]
    pub remux_tool: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List tracked (unfinished) jobs.
    Status,

    /// Stop tracking a job.
    Forget {
        /// Manifest URL of the job.
        url: String,

        /// Also delete the job's working directory.
        #[arg(long)]
        delete_files: bool,
    },

    /// Print a shell completion script.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        if let Some(CliCommand::Completions { shell }) = cli.command {
            run_completions(shell);
            return Ok(());
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let mut registry = JobRegistry::open_file(&cfg.registry_path, cfg.registry_persist);

        match cli.command {
            None => run_fetch(&mut registry, &cfg, cli.fetch)?,
            Some(CliCommand::Status) => run_status(&registry, &cfg.resolved_work_root())?,
            Some(CliCommand::Forget { url, delete_files }) => {
                run_forget(&mut registry, &cfg.resolved_work_root(), &url, delete_files)?;
            }
            Some(CliCommand::Completions { .. }) => {}
        }

        registry.flush().context("saving job registry")?;
        Ok(())
    }
}

/// Process exit code for an error returned by `run_from_args`. Context
/// wrappers are looked through; registry failures outside a session count
/// as registry errors too.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<SessionError>() {
            return e.exit_code();
        }
        if cause.downcast_ref::<RegistryError>().is_some() {
            return exit_code::REGISTRY;
        }
    }
    exit_code::GENERAL
}

#[cfg(test)]
mod tests;
