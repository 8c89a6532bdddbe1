//! Commentable lines in a pull request patch
//!
//! GitHub only accepts review comments on lines that appear in the diff:
//! added and context lines on the new side, removed and context lines on the
//! old side. `gh comment lines` uses this to explain 422 responses.

use serde::{Deserialize, Serialize};

use crate::comment::{LineRange, Side};

/// A file changed by a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path relative to the repository root
    pub path: String,
    /// `added`, `modified`, `removed`, `renamed`, ...
    pub status: String,
    /// Unified diff hunks; GitHub leaves this out for binary and huge files
    pub patch: Option<String>,
}

impl ChangedFile {
    /// Lines of this file that accept review comments
    pub fn commentable_lines(&self) -> CommentableLines {
        self.patch
            .as_deref()
            .map(commentable_lines)
            .unwrap_or_default()
    }
}

/// Line numbers that accept review comments, per diff side, ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentableLines {
    /// New-file lines (`side: right`)
    pub right: Vec<u32>,
    /// Old-file lines (`side: left`)
    pub left: Vec<u32>,
}

impl CommentableLines {
    pub fn side(&self, side: Side) -> &[u32] {
        match side {
            Side::Right => &self.right,
            Side::Left => &self.left,
        }
    }

    /// Whether every line of `range` can be commented on
    pub fn accepts(&self, side: Side, range: LineRange) -> bool {
        let lines = self.side(side);
        (range.start..=range.end).all(|line| lines.binary_search(&line).is_ok())
    }

    pub fn is_empty(&self) -> bool {
        self.right.is_empty() && self.left.is_empty()
    }
}

/// `@@ -old_start,old_count +new_start,new_count @@`
fn parse_hunk_header(line: &str) -> Option<(u32, u32)> {
    let mut fields = line.strip_prefix("@@")?.split_whitespace();
    let start = |field: Option<&str>, sign: char| -> Option<u32> {
        let digits = field?.strip_prefix(sign)?;
        digits.split(',').next()?.parse().ok()
    };
    let old = start(fields.next(), '-')?;
    let new = start(fields.next(), '+')?;
    Some((old, new))
}

/// Walk a patch and collect the lines each side accepts comments on
pub fn commentable_lines(patch: &str) -> CommentableLines {
    let mut lines = CommentableLines::default();
    let mut cursor: Option<(u32, u32)> = None;

    for line in patch.lines() {
        if line.starts_with("@@") {
            cursor = parse_hunk_header(line);
            continue;
        }
        let Some((old, new)) = cursor.as_mut() else {
            continue;
        };

        match line.chars().next() {
            Some('+') => {
                lines.right.push(*new);
                *new += 1;
            }
            Some('-') => {
                lines.left.push(*old);
                *old += 1;
            }
            // "\ No newline at end of file"
            Some('\\') => {}
            _ => {
                lines.right.push(*new);
                lines.left.push(*old);
                *new += 1;
                *old += 1;
            }
        }
    }

    for side in [&mut lines.right, &mut lines.left] {
        side.sort_unstable();
        side.dedup();
    }
    lines
}

/// Collapse ascending line numbers into ranges of consecutive lines
pub fn group_ranges(lines: &[u32]) -> Vec<LineRange> {
    let mut ranges: Vec<LineRange> = Vec::new();
    for &line in lines {
        match ranges.last_mut() {
            Some(range) if range.end + 1 == line => range.end = line,
            _ => ranges.push(LineRange::single(line)),
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATCH: &str = "@@ -1,4 +1,5 @@\n fn main() {\n-    old();\n+    new();\n+    extra();\n }\n@@ -20,2 +21,3 @@\n a\n+b\n c\n\\ No newline at end of file";

    #[test]
    fn test_parse_hunk_header() {
        assert_eq!(parse_hunk_header("@@ -1,4 +1,5 @@"), Some((1, 1)));
        assert_eq!(parse_hunk_header("@@ -10,3 +15,7 @@ fn name()"), Some((10, 15)));
        assert_eq!(parse_hunk_header("@@ -1 +1 @@"), Some((1, 1)));
        assert_eq!(parse_hunk_header("@@ garbage @@"), None);
    }

    #[test]
    fn test_commentable_lines_per_side() {
        let lines = commentable_lines(PATCH);
        assert_eq!(lines.right, vec![1, 2, 3, 4, 21, 22, 23]);
        assert_eq!(lines.left, vec![1, 2, 3, 20, 21]);
    }

    #[test]
    fn test_accepts_whole_range_only() {
        let lines = commentable_lines(PATCH);
        assert!(lines.accepts(Side::Right, LineRange::new(2, 4).unwrap()));
        assert!(!lines.accepts(Side::Right, LineRange::new(4, 5).unwrap()));
        assert!(lines.accepts(Side::Left, LineRange::single(2)));
        assert!(!lines.accepts(Side::Left, LineRange::single(22)));
    }

    #[test]
    fn test_new_file_has_only_right_lines() {
        let lines = commentable_lines("@@ -0,0 +1,3 @@\n+a\n+b\n+c");
        assert_eq!(lines.right, vec![1, 2, 3]);
        assert!(lines.left.is_empty());
    }

    #[test]
    fn test_missing_patch_has_no_lines() {
        let file = ChangedFile {
            path: "logo.png".to_string(),
            status: "added".to_string(),
            patch: None,
        };
        assert!(file.commentable_lines().is_empty());
    }

    #[test]
    fn test_group_ranges() {
        let ranges = group_ranges(&[1, 2, 3, 7, 9, 10]);
        let text: Vec<String> = ranges.iter().map(ToString::to_string).collect();
        assert_eq!(text, vec!["1-3", "7", "9-10"]);
        assert!(group_ranges(&[]).is_empty());
    }
}
