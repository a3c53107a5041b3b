//! Segment URL resolution relative to the manifest URL.

use super::ParseError;

/// Fetch URL for `reference`.
///
/// References starting with `http` are used verbatim. Anything else is
/// joined onto the manifest URL with its last `/` component dropped. `.` and
/// `..` components are passed through untouched.
pub fn resolve_segment_url(manifest_url: &str, reference: &str) -> String {
    if reference.starts_with("http") {
        return reference.to_string();
    }
    let base = match manifest_url.rfind('/') {
        Some(pos) => &manifest_url[..pos],
        None => "",
    };
    format!("{}/{}", base, reference)
}

/// Last non-empty `/`-delimited component of a trimmed reference line.
/// Empty only when the reference has no such component (e.g. `//`).
pub fn local_filename(reference: &str) -> &str {
    let reference = reference.trim().trim_end_matches('/');
    reference.rsplit('/').next().unwrap_or(reference).trim()
}

/// Accepts only absolute `http`/`https` manifest URLs.
pub fn validate_manifest_url(manifest_url: &str) -> Result<(), ParseError> {
    let parsed = url::Url::parse(manifest_url).map_err(|e| ParseError::InvalidUrl {
        url: manifest_url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ParseError::InvalidUrl {
            url: manifest_url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_reference_joins_manifest_directory() {
        assert_eq!(
            resolve_segment_url("http://host/a/b/playlist.m3u8", "seg001.ts"),
            "http://host/a/b/seg001.ts"
        );
    }

    #[test]
    fn absolute_reference_is_unchanged() {
        assert_eq!(
            resolve_segment_url("http://host/a/b/playlist.m3u8", "http://other/seg002.ts"),
            "http://other/seg002.ts"
        );
    }

    #[test]
    fn dot_segments_are_not_normalized() {
        assert_eq!(
            resolve_segment_url("http://host/a/b/playlist.m3u8", "../c/./seg.ts"),
            "http://host/a/b/../c/./seg.ts"
        );
    }

    #[test]
    fn query_string_on_manifest_stays_out_of_base() {
        assert_eq!(
            resolve_segment_url("http://host/a/playlist.m3u8?token=1", "s.ts"),
            "http://host/a/s.ts"
        );
    }

    #[test]
    fn local_filename_takes_last_component() {
        assert_eq!(local_filename("seg001.ts"), "seg001.ts");
        assert_eq!(local_filename("a/b/seg001.ts"), "seg001.ts");
        assert_eq!(local_filename("  http://cdn/x/y/seg9.ts "), "seg9.ts");
    }

    #[test]
    fn local_filename_ignores_trailing_slashes() {
        assert_eq!(local_filename("chunks/"), "chunks");
        assert_eq!(local_filename("a/b//"), "b");
        assert_eq!(local_filename("//"), "");
    }

    #[test]
    fn manifest_url_validation() {
        assert!(validate_manifest_url("https://host/p.m3u8").is_ok());
        assert!(validate_manifest_url("http://host/p.m3u8").is_ok());
        assert!(matches!(
            validate_manifest_url("ftp://host/p.m3u8"),
            Err(ParseError::InvalidUrl { .. })
        ));
        assert!(matches!(
            validate_manifest_url("not a url"),
            Err(ParseError::InvalidUrl { .. })
        ));
    }
}
