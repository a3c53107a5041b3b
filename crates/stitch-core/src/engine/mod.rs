//! Sequential, resumable segment download loop.
//!
//! Segments are evaluated strictly in manifest order. A segment whose file
//! already exists with a nonzero size is resumed without a request; any other
//! segment is fetched and written through a `.part` temp file. The first
//! failure stops the run: later segments are not attempted, and everything
//! already on disk stays valid for the next run.

mod progress;

pub use progress::{Progress, SegmentState};

use std::path::{Path, PathBuf};

use crate::fetch::{FetchError, Fetcher};
use crate::fs_util::{self, FsError};
use crate::merge_list::MergeList;
use crate::playlist::Segment;

/// Why one segment could not be completed.
#[derive(Debug, thiserror::Error)]
pub enum SegmentFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Fs(#[from] FsError),
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("could not prepare merge list: {0}")]
    MergeList(#[source] FsError),
    #[error("segment {index} ({filename}) failed: {source}")]
    Segment {
        index: usize,
        filename: String,
        #[source]
        source: SegmentFailure,
    },
}

/// Outcome of a run that reached every segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReport {
    pub total: usize,
    /// Segments downloaded during this run.
    pub fetched: usize,
    /// Segments found complete on disk and skipped.
    pub resumed: usize,
    pub merge_list: PathBuf,
}

/// Drives one run over a job's working directory.
pub struct DownloadEngine<F> {
    fetcher: F,
    working_dir: PathBuf,
}

impl<F: Fetcher> DownloadEngine<F> {
    pub fn new(fetcher: F, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Resume or fetch every segment in order, rebuilding the merge list.
    /// `on_progress` is called before each fetch and after each completed segment.
    pub fn run(
        &self,
        segments: &[Segment],
        mut on_progress: impl FnMut(&Progress),
    ) -> Result<EngineReport, EngineError> {
        let mut merge_list = MergeList::start(&self.working_dir).map_err(EngineError::MergeList)?;
        let total = segments.len();
        let mut fetched = 0usize;
        let mut resumed = 0usize;

        for segment in segments {
            let completed = resumed + fetched;
            let announce =
                |state| on_progress(&Progress::new(segment.index, completed, total, state));
            let state = match self.complete_segment(segment, &mut merge_list, announce) {
                Ok(state) => state,
                Err(source) => {
                    on_progress(&Progress::new(segment.index, completed, total, SegmentState::Failed));
                    return Err(EngineError::Segment {
                        index: segment.index,
                        filename: segment.local_filename.clone(),
                        source,
                    });
                }
            };
            match state {
                SegmentState::Resumed => resumed += 1,
                _ => fetched += 1,
            }
            on_progress(&Progress::new(segment.index, resumed + fetched, total, state));
        }

        tracing::info!(
            total,
            fetched,
            resumed,
            "all segments present in {}",
            self.working_dir.display()
        );
        Ok(EngineReport {
            total,
            fetched,
            resumed,
            merge_list: merge_list.path().to_path_buf(),
        })
    }

    /// Returns `Resumed` or `Fetched`; any failure leaves no file for the segment.
    /// `announce` receives `Fetching` right before a request is made.
    fn complete_segment(
        &self,
        segment: &Segment,
        merge_list: &mut MergeList,
        announce: impl FnOnce(SegmentState),
    ) -> Result<SegmentState, SegmentFailure> {
        let path = self.working_dir.join(&segment.local_filename);

        let state = if fs_util::is_nonempty_file(&path) {
            tracing::debug!(index = segment.index, "resuming after {}", segment.local_filename);
            SegmentState::Resumed
        } else {
            tracing::debug!(
                index = segment.index,
                url = %segment.resolved_url,
                state = SegmentState::Fetching.as_str(),
                "fetching segment"
            );
            announce(SegmentState::Fetching);
            let body = match self.fetcher.fetch_bytes(&segment.resolved_url) {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!(index = segment.index, "{} failed: {}", segment.local_filename, e);
                    return Err(e.into());
                }
            };
            if body.is_empty() {
                tracing::warn!(index = segment.index, "{} has an empty body", segment.local_filename);
            }
            fs_util::write_atomic(&path, &body)?;
            SegmentState::Fetched
        };

        if !merge_list.append(&segment.local_filename)? {
            tracing::warn!(
                index = segment.index,
                "{} already listed for merge; duplicate manifest entry",
                segment.local_filename
            );
        }
        Ok(state)
    }
}
