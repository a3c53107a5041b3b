//! Playlist manifest parsing and segment URL resolution.
//!
//! The manifest is plain text: one segment reference per line, `#` comments
//! and blank lines ignored. References are either absolute (`http...`) or
//! relative to the manifest URL's directory.

mod parse;
mod resolve;

pub use parse::segment_references;
pub use resolve::{local_filename, resolve_segment_url, validate_manifest_url};

use crate::merge_list::MERGE_LIST_FILE;

/// One fetchable chunk of the media resource, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 0-based position among the manifest's segment lines.
    pub index: usize,
    /// Trimmed manifest line.
    pub raw_line: String,
    pub resolved_url: String,
    /// File name inside the job's working directory. Never empty and never
    /// the merge list's name.
    pub local_filename: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("manifest body is empty")]
    EmptyManifest,
    #[error("manifest contains no segment references")]
    NoSegments,
    #[error("invalid manifest URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Parse `body` fetched from `manifest_url` into resolved segments.
pub fn parse_manifest(body: &str, manifest_url: &str) -> Result<Vec<Segment>, ParseError> {
    if body.trim().is_empty() {
        return Err(ParseError::EmptyManifest);
    }
    let segments: Vec<Segment> = segment_references(body)
        .filter_map(|line| {
            let name = local_filename(line);
            if name.is_empty() {
                tracing::debug!("skipping reference without a file name: {}", line);
                return None;
            }
            Some((line, name))
        })
        .enumerate()
        .map(|(index, (line, name))| Segment {
            index,
            raw_line: line.to_string(),
            resolved_url: resolve_segment_url(manifest_url, line),
            local_filename: storage_name(index, name),
        })
        .collect();
    if segments.is_empty() {
        return Err(ParseError::NoSegments);
    }
    tracing::debug!(count = segments.len(), "parsed manifest {}", manifest_url);
    Ok(segments)
}

/// File name for a segment on disk. A name that would clobber the merge list
/// gets the segment index as a prefix.
fn storage_name(index: usize, name: &str) -> String {
    if name == MERGE_LIST_FILE {
        let renamed = format!("{:05}-{}", index, name);
        tracing::warn!("segment {} is named {}; storing it as {}", index, name, renamed);
        return renamed;
    }
    name.to_string()
}
