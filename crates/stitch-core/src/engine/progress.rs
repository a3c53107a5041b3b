//! Progress snapshots emitted by the download loop.

/// Per-segment lifecycle within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    /// Found complete on disk; not fetched.
    Resumed,
    /// Request in flight.
    Fetching,
    /// Downloaded and written this run.
    Fetched,
    /// Fetch or write failed; the run stops here.
    Failed,
}

impl SegmentState {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentState::Resumed => "resumed",
            SegmentState::Fetching => "fetching",
            SegmentState::Fetched => "fetched",
            SegmentState::Failed => "failed",
        }
    }
}

/// Snapshot of one segment's state change within a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Manifest index of the segment this snapshot is about.
    pub index: usize,
    /// Segments completed so far this run (resumed + fetched).
    pub completed: usize,
    pub total: usize,
    /// `completed / total` as a percentage in [0, 100].
    pub percent: f64,
    pub state: SegmentState,
}

impl Progress {
    pub fn new(index: usize, completed: usize, total: usize, state: SegmentState) -> Self {
        let percent = if total == 0 {
            100.0
        } else {
            (completed as f64 / total as f64 * 100.0).min(100.0)
        };
        Self {
            index,
            completed,
            total,
            percent,
            state,
        }
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}
