//! Line filter for the plain manifest format.

/// Segment reference lines of `body`, trimmed, in file order.
///
/// Lines starting with `#` and lines of at most one character are skipped;
/// nothing else is validated.
pub fn segment_references(body: &str) -> impl Iterator<Item = &str> {
    body.split('\n')
        .map(str::trim)
        .filter(|line| line.chars().count() > 1 && !line.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blank_lines() {
        let body = "#EXTM3U\n\n  a.ts  \n#EXTINF:1,\nb.ts\r\n";
        let refs: Vec<&str> = segment_references(body).collect();
        assert_eq!(refs, vec!["a.ts", "b.ts"]);
    }

    #[test]
    fn skips_single_character_lines() {
        let refs: Vec<&str> = segment_references("x\nab\n \n").collect();
        assert_eq!(refs, vec!["ab"]);
    }

    #[test]
    fn keeps_malformed_lines_verbatim() {
        let refs: Vec<&str> = segment_references("not a url at all\n../up/seg.ts").collect();
        assert_eq!(refs, vec!["not a url at all", "../up/seg.ts"]);
    }
}
