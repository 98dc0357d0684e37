// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zero-context unified diff parsing into change blocks

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::engine::range::{parse_range, Range};
use crate::errors::{Result, SearchError};

static HUNK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@@ -(?P<del>\d+(?:,\d+)?) \+(?P<ins>\d+(?:,\d+)?) @@").expect("hunk regex")
});

/// One hunk of a diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeBlock {
    /// Pre-image path of the file the hunk belongs to
    pub file: String,
    pub insertions: Range,
    pub deletions: Range,
    /// Raw `+`/`-` lines following the hunk header
    pub text: Vec<String>,
}

/// Parse a full multi-file diff into change blocks, in order
///
/// Hunks are scoped to the file named by the most recent `--- a/<path>`
/// header (falling back to the `diff --git` line).
pub fn parse_diff(diff: &str) -> Result<Vec<ChangeBlock>> {
    let mut blocks: Vec<ChangeBlock> = Vec::new();
    let mut file: Option<String> = None;
    let mut in_header = false;

    for line in diff.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            file = path_from_diff_git(rest);
            in_header = true;
            continue;
        }

        if line.starts_with("@@") {
            let path = file.clone().unwrap_or_default();
            blocks.push(parse_hunk_header(&path, line)?);
            in_header = false;
            continue;
        }

        if in_header {
            if let Some(path) = line.strip_prefix("--- ") {
                if let Some(stripped) = strip_side_prefix(path, "a/") {
                    file = Some(stripped);
                }
            }
            continue;
        }

        if let Some(block) = blocks.last_mut() {
            block.text.push(line.to_string());
        }
    }

    Ok(blocks)
}

/// Parse a `@@ -a,b +c,d @@` header line into an empty change block
pub fn parse_hunk_header(file: &str, header: &str) -> Result<ChangeBlock> {
    let caps = HUNK_HEADER
        .captures(header)
        .ok_or_else(|| SearchError::MalformedHunk {
            file: file.to_string(),
            header: header.to_string(),
        })?;

    let deletions = parse_side(&caps["del"])?;
    let insertions = parse_side(&caps["ins"])?;

    Ok(ChangeBlock {
        file: file.to_string(),
        insertions,
        deletions,
        text: Vec::new(),
    })
}

// Zero-context hunks use `0,0` for the empty side at the top of a file.
fn parse_side(token: &str) -> Result<Range> {
    if token == "0,0" {
        return Ok(Range::empty());
    }
    parse_range(token)
}

fn path_from_diff_git(rest: &str) -> Option<String> {
    let (a_side, _) = rest.split_once(" b/")?;
    strip_side_prefix(a_side, "a/")
}

fn strip_side_prefix(path: &str, prefix: &str) -> Option<String> {
    let path = path.trim_end();
    if path == "/dev/null" {
        return None;
    }
    let path = match path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) {
        Some(quoted) => unquote_c_path(quoted),
        None => path.to_string(),
    };
    Some(path.strip_prefix(prefix).unwrap_or(&path).to_string())
}

/// Undo git's C-style path quoting (`\t`, `\"`, `\\`, octal byte escapes)
fn unquote_c_path(quoted: &str) -> String {
    let mut bytes: Vec<u8> = Vec::with_capacity(quoted.len());
    let mut chars = quoted.bytes().peekable();

    while let Some(b) = chars.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match chars.next() {
            Some(b'n') => bytes.push(b'\n'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b'f') => bytes.push(0x0c),
            Some(b'v') => bytes.push(0x0b),
            Some(d @ b'0'..=b'7') => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&next @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(next - b'0');
                            chars.next();
                        }
                        _ => break,
                    }
                }
                bytes.push((value & 0xff) as u8);
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FILES: &str = "\
diff --git a/a.txt b/a.txt
index 1111111..2222222 100644
--- a/a.txt
+++ b/a.txt
@@ -10,3 +10,4 @@ fn context()
-old ten
-old eleven
-old twelve
+new ten
+new eleven
+new twelve
+new thirteen
@@ -20 +21,0 @@
-gone
diff --git a/src/lib.rs b/src/lib.rs
index 3333333..4444444 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -0,0 +1,2 @@
+// header
+
";

    #[test]
    fn single_hunk_yields_ranges() {
        let diff = "diff --git a/a.txt b/a.txt\n--- a/a.txt\n+++ b/a.txt\n@@ -10,3 +10,4 @@\n-x\n";
        let blocks = parse_diff(diff).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].file, "a.txt");
        assert_eq!(blocks[0].deletions, Range::new(10, 3).unwrap());
        assert_eq!(blocks[0].insertions, Range::new(10, 4).unwrap());
        assert_eq!(blocks[0].text, vec!["-x".to_string()]);
    }

    #[test]
    fn blocks_keep_file_scope_and_order() {
        let blocks = parse_diff(TWO_FILES).unwrap();
        assert_eq!(blocks.len(), 3);

        assert_eq!(blocks[0].file, "a.txt");
        assert_eq!(blocks[0].text.len(), 7);

        assert_eq!(blocks[1].file, "a.txt");
        assert_eq!(blocks[1].deletions, Range::new(20, 1).unwrap());
        assert!(blocks[1].insertions.is_empty());
        assert_eq!(blocks[1].text, vec!["-gone".to_string()]);

        assert_eq!(blocks[2].file, "src/lib.rs");
        assert!(blocks[2].deletions.is_empty());
        assert_eq!(blocks[2].insertions, Range::new(1, 2).unwrap());
    }

    #[test]
    fn header_missing_range_is_malformed() {
        let diff = "diff --git a/a.txt b/a.txt\n--- a/a.txt\n+++ b/a.txt\n@@ -10,3 @@\n";
        match parse_diff(diff) {
            Err(SearchError::MalformedHunk { file, header }) => {
                assert_eq!(file, "a.txt");
                assert_eq!(header, "@@ -10,3 @@");
            }
            other => panic!("expected malformed hunk, got {other:?}"),
        }
    }

    #[test]
    fn empty_diff_has_no_blocks() {
        assert!(parse_diff("").unwrap().is_empty());
    }

    #[test]
    fn quoted_non_ascii_path_is_unescaped() {
        let diff = "diff --git \"a/caf\\303\\251.txt\" \"b/caf\\303\\251.txt\"\n\
--- \"a/caf\\303\\251.txt\"\n\
+++ \"b/caf\\303\\251.txt\"\n\
@@ -2 +2 @@\n-TWO\n+three\n";
        let blocks = parse_diff(diff).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].file, "café.txt");
    }

    #[test]
    fn quoted_path_with_tab_and_quote_is_unescaped() {
        assert_eq!(unquote_c_path(r#"a/x\ty\"z\\w"#), "a/x\ty\"z\\w");
        assert_eq!(unquote_c_path("plain"), "plain");
    }

    #[test]
    fn unquoted_non_ascii_path_is_kept() {
        let diff = "diff --git a/café.txt b/café.txt\n--- a/café.txt\n+++ b/café.txt\n@@ -2 +2 @@\n-x\n+y\n";
        assert_eq!(parse_diff(diff).unwrap()[0].file, "café.txt");
    }

    #[test]
    fn payload_lines_that_look_like_headers_stay_in_block() {
        let diff = "diff --git a/a.txt b/a.txt\n--- a/a.txt\n+++ b/a.txt\n@@ -3 +3 @@\n--- dashes\n+++ pluses\n";
        let blocks = parse_diff(diff).unwrap();
        assert_eq!(blocks[0].text, vec!["--- dashes", "+++ pluses"]);
    }
}
