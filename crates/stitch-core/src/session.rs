//! One end-to-end run for a manifest URL: resolve job, fetch and parse the
//! manifest, download, merge, clean up.

use std::path::{Path, PathBuf};

use crate::cleanup::{finalize_job, CleanupError};
use crate::config::StitchConfig;
use crate::engine::{DownloadEngine, EngineError, EngineReport, Progress, SegmentFailure};
use crate::fetch::{FetchError, Fetcher};
use crate::job::Job;
use crate::merge::{output_path, MergeCoordinator, MergeError};
use crate::playlist::{parse_manifest, validate_manifest_url, ParseError};
use crate::registry::{JobRegistry, RegistryError};

/// Process exit codes, one per failure category.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    /// Config, logging, or other failures outside a session.
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const FETCH: i32 = 3;
    pub const PARSE: i32 = 4;
    pub const REGISTRY: i32 = 5;
    pub const TOOL_MISSING: i32 = 6;
    pub const TOOL_FAILED: i32 = 7;
    pub const FILESYSTEM: i32 = 8;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("could not fetch manifest: {0}")]
    Manifest(#[source] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Download(#[from] EngineError),
    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl SessionError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionError::Registry(_) => exit_code::REGISTRY,
            SessionError::Manifest(_) => exit_code::FETCH,
            SessionError::Parse(_) => exit_code::PARSE,
            SessionError::Download(EngineError::Segment {
                source: SegmentFailure::Fetch(_),
                ..
            }) => exit_code::FETCH,
            SessionError::Download(_) => exit_code::FILESYSTEM,
            SessionError::Merge(MergeError::ToolMissing { .. }) => exit_code::TOOL_MISSING,
            SessionError::Merge(MergeError::ToolExecution { .. } | MergeError::Spawn { .. }) => {
                exit_code::TOOL_FAILED
            }
            SessionError::Merge(MergeError::OutputDir(_)) => exit_code::FILESYSTEM,
        }
    }
}

/// Where things go and which tool merges them.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub work_root: PathBuf,
    pub output_dir: PathBuf,
    pub output_extension: String,
    pub remux_tool: PathBuf,
    pub overwrite: bool,
}

impl SessionOptions {
    pub fn from_config(cfg: &StitchConfig) -> Self {
        Self {
            work_root: cfg.resolved_work_root(),
            output_dir: cfg.resolved_output_dir(),
            output_extension: cfg.output_extension.clone(),
            remux_tool: cfg.remux_tool.clone(),
            overwrite: false,
        }
    }
}

/// Things the caller may want to show while a session runs.
#[derive(Debug)]
pub enum SessionEvent<'a> {
    JobOpened { job: &'a Job, working_dir: &'a Path },
    ManifestParsed { segments: usize },
    Progress(&'a Progress),
    Merging { output: &'a Path },
    ToolOutput(&'a str),
}

/// Result of a session whose merge succeeded.
#[derive(Debug)]
pub struct SessionOutcome {
    pub job: Job,
    pub output: PathBuf,
    pub report: EngineReport,
    /// Cleanup runs after the output exists, so its failure does not fail the session.
    pub cleanup_error: Option<CleanupError>,
}

pub struct Session<'r, F> {
    fetcher: F,
    registry: &'r mut JobRegistry,
    options: SessionOptions,
}

impl<'r, F: Fetcher> Session<'r, F> {
    pub fn new(fetcher: F, registry: &'r mut JobRegistry, options: SessionOptions) -> Self {
        Self {
            fetcher,
            registry,
            options,
        }
    }

    /// Download and merge `url`. The job is removed from the registry and its
    /// working directory deleted only when the merge succeeds.
    pub fn run(
        &mut self,
        url: &str,
        requested_dir: Option<&str>,
        mut on_event: impl FnMut(SessionEvent<'_>),
    ) -> Result<SessionOutcome, SessionError> {
        validate_manifest_url(url)?;
        let job = Job::open(self.registry, url, requested_dir)?;
        let working_dir = job.dir_in(&self.options.work_root);
        on_event(SessionEvent::JobOpened {
            job: &job,
            working_dir: &working_dir,
        });

        let body = self
            .fetcher
            .fetch_text(url)
            .map_err(SessionError::Manifest)?;
        let segments = parse_manifest(&body, url)?;
        on_event(SessionEvent::ManifestParsed {
            segments: segments.len(),
        });

        let report = DownloadEngine::new(&self.fetcher, &working_dir)
            .run(&segments, |p| on_event(SessionEvent::Progress(p)))?;

        let output = output_path(
            &self.options.output_dir,
            &job.working_dir,
            &self.options.output_extension,
        );
        on_event(SessionEvent::Merging { output: &output });
        MergeCoordinator::new(&self.options.remux_tool)
            .overwrite(self.options.overwrite)
            .merge(&report.merge_list, &output, |line| {
                on_event(SessionEvent::ToolOutput(line))
            })?;

        let cleanup_error = match finalize_job(self.registry, url, &working_dir) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("cleanup after merge failed: {}", e);
                Some(e)
            }
        };

        Ok(SessionOutcome {
            job,
            output,
            report,
            cleanup_error,
        })
    }
}
