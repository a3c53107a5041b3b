//! Concatenate downloaded segments with an external remux tool (ffmpeg's
//! concat demuxer, stream copy).
//!
//! The tool is located before anything is launched. Its stdout and stderr are
//! forwarded line by line as they are produced; the exit status decides
//! whether the job may be cleaned up.

mod tool;

pub use tool::locate_tool;

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

use crate::fs_util::{ensure_dir, FsError};

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("remux tool not found: {}", tool.display())]
    ToolMissing { tool: PathBuf },
    #[error("remux tool exited with code {code}")]
    ToolExecution { code: i32 },
    #[error("failed to launch {}: {source}", tool.display())]
    Spawn {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    OutputDir(#[from] FsError),
}

/// `<output_dir>/<job_name>.<ext>`.
pub fn output_path(output_dir: &Path, job_name: &str, extension: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", job_name, extension))
}

/// Runs the remux tool over a merge list.
#[derive(Debug, Clone)]
pub struct MergeCoordinator {
    tool: PathBuf,
    overwrite: bool,
}

impl MergeCoordinator {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            overwrite: false,
        }
    }

    /// Pass `-y` so an existing output file is replaced instead of failing the merge.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Arguments after the program name.
    pub fn args(&self, merge_list: &Path, output: &Path) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = ["-f", "concat", "-safe", "0", "-i"]
            .into_iter()
            .map(Into::into)
            .collect();
        args.push(merge_list.into());
        args.push("-c".into());
        args.push("copy".into());
        if self.overwrite {
            args.push("-y".into());
        }
        args.push(output.into());
        args
    }

    /// Concatenate the files listed in `merge_list` into `output`.
    ///
    /// Every line the tool prints is logged and handed to `on_line`.
    pub fn merge(
        &self,
        merge_list: &Path,
        output: &Path,
        mut on_line: impl FnMut(&str),
    ) -> Result<(), MergeError> {
        let program = locate_tool(&self.tool).ok_or_else(|| MergeError::ToolMissing {
            tool: self.tool.clone(),
        })?;
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir(parent)?;
            }
        }

        tracing::info!(
            tool = %program.display(),
            list = %merge_list.display(),
            "merging into {}",
            output.display()
        );
        let spawn_err = |source| MergeError::Spawn {
            tool: program.clone(),
            source,
        };
        let mut child = Command::new(&program)
            .args(self.args(merge_list, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        let (tx, rx) = mpsc::channel::<String>();
        let mut readers = Vec::with_capacity(2);
        if let Some(out) = child.stdout.take() {
            readers.push(forward_lines(out, tx.clone()));
        }
        if let Some(err) = child.stderr.take() {
            readers.push(forward_lines(err, tx.clone()));
        }
        drop(tx);

        for line in rx {
            tracing::info!(target: "stitch::remux", "{}", line);
            on_line(&line);
        }
        for r in readers {
            let _ = r.join();
        }

        let status = child.wait().map_err(spawn_err)?;
        if status.success() {
            tracing::info!("merge finished: {}", output.display());
            return Ok(());
        }
        // Terminated by a signal: no exit code.
        let code = status.code().unwrap_or(-1);
        tracing::warn!("remux tool exited with code {}", code);
        Err(MergeError::ToolExecution { code })
    }
}

fn forward_lines<R: Read + Send + 'static>(
    stream: R,
    tx: mpsc::Sender<String>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for line in BufReader::new(stream).lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    })
}
