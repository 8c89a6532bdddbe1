//! Suggestion marker expansion
//!
//! Authors write suggestions with one of three markers:
//!
//! ```text
//! suggest: let count = items.len();
//! Use [SUGGEST: items.len()] instead.
//! <<<SUGGEST
//! fn total(&self) -> usize {
//!     self.items.len()
//! }
//! SUGGEST>>>
//! ```
//!
//! Each marker becomes one GitHub suggestion fence. Lines already inside a
//! fenced block are copied verbatim, which is what makes expansion
//! idempotent.

use tracing::debug;

use crate::comment::LineRange;
use crate::markdown::{FenceTracker, LineClass};

const LINE_MARKER: &str = "suggest:";
const INLINE_MARKER: &str = "[SUGGEST:";
const BLOCK_OPEN: &str = "<<<SUGGEST";
const BLOCK_CLOSE: &str = "SUGGEST>>>";

/// What the comment body will be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Specific lines of a file in the diff
    Lines(LineRange),
    /// A reply inside an existing review thread (inherits its lines)
    Thread,
    /// A comment with no line anchor; GitHub will not render suggestions
    Unanchored,
}

impl Anchor {
    /// Whether suggestion blocks make sense for this anchor
    pub fn accepts_suggestions(self) -> bool {
        !matches!(self, Anchor::Unanchored)
    }
}

/// Expand suggestion markers into ```` ```suggestion ```` fences
///
/// Bodies for [`Anchor::Unanchored`] comments are returned unchanged.
pub fn expand(body: &str, anchor: Anchor) -> String {
    if !anchor.accepts_suggestions() || !has_markers(body) {
        return body.to_string();
    }

    let lines: Vec<&str> = body.split_inclusive('\n').collect();
    let mut out = String::with_capacity(body.len() + 64);
    let mut tracker = FenceTracker::new();
    let mut fences = 0usize;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if tracker.classify(line) != LineClass::Text {
            out.push_str(line);
            i += 1;
            continue;
        }

        let (content, terminator) = split_terminator(line);

        if content.trim() == BLOCK_OPEN {
            if let Some(close) = find_block_close(&lines, i + 1) {
                let code: String = lines[i + 1..close].concat();
                out.push_str(&suggestion_fence(trim_blank_lines(&code)));
                out.push_str(split_terminator(lines[close]).1);
                fences += 1;
                i = close + 1;
                continue;
            }
        }

        let mut segments = expand_text_line(content);
        if segments.fences == 0 {
            out.push_str(line);
            i += 1;
            continue;
        }

        // A block opener left over after inline markers must open here too,
        // or a second pass would expand it
        let trailing_open = segments
            .parts
            .last()
            .is_some_and(|part| part.trim() == BLOCK_OPEN);
        let close = if trailing_open {
            find_block_close(&lines, i + 1)
        } else {
            None
        };

        fences += segments.fences;
        match close {
            Some(close) => {
                segments.parts.pop();
                let code: String = lines[i + 1..close].concat();
                segments.parts.push(suggestion_fence(trim_blank_lines(&code)));
                fences += 1;
                out.push_str(&segments.parts.join("\n"));
                out.push_str(split_terminator(lines[close]).1);
                i = close + 1;
            }
            None => {
                out.push_str(&segments.parts.join("\n"));
                out.push_str(terminator);
                i += 1;
            }
        }
    }

    debug!(?anchor, fences, "Expanded suggestion markers");
    out
}

/// Whether the body contains anything that looks like a suggestion marker
pub fn has_markers(body: &str) -> bool {
    body.contains(INLINE_MARKER)
        || body.contains(BLOCK_OPEN)
        || body
            .lines()
            .any(|line| line.trim_start().starts_with(LINE_MARKER))
}

/// Number of suggestion fences in an (expanded) body
pub fn count_suggestion_blocks(body: &str) -> usize {
    let mut tracker = FenceTracker::new();
    body.split_inclusive('\n')
        .filter(|line| matches!(tracker.classify(line), LineClass::Open(f) if f.is_suggestion()))
        .count()
}

struct Segments {
    parts: Vec<String>,
    fences: usize,
}

/// Expand the line and inline markers of a single text line
fn expand_text_line(content: &str) -> Segments {
    let mut parts = Vec::new();
    let mut fences = 0;
    let mut rest = content;

    loop {
        if let Some(code) = rest.trim_start().strip_prefix(LINE_MARKER) {
            parts.push(suggestion_fence(code.trim()));
            fences += 1;
            break;
        }

        match split_inline_marker(rest) {
            Some((before, code, after)) => {
                let before = before.trim_end();
                if !before.is_empty() {
                    parts.push(before.to_string());
                }
                parts.push(suggestion_fence(code.trim()));
                fences += 1;
                rest = after.trim_start();
            }
            None => {
                if !rest.is_empty() {
                    parts.push(rest.to_string());
                }
                break;
            }
        }
    }

    Segments { parts, fences }
}

/// Split `before [SUGGEST: code] after`, matching nested brackets
fn split_inline_marker(text: &str) -> Option<(&str, &str, &str)> {
    let start = text.find(INLINE_MARKER)?;
    let code_start = start + INLINE_MARKER.len();
    let mut depth = 0usize;

    for (offset, c) in text[code_start..].char_indices() {
        match c {
            '[' => depth += 1,
            ']' if depth == 0 => {
                let end = code_start + offset;
                return Some((&text[..start], &text[code_start..end], &text[end + 1..]));
            }
            ']' => depth -= 1,
            _ => {}
        }
    }

    None
}

fn find_block_close(lines: &[&str], from: usize) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, line)| line.trim() == BLOCK_CLOSE)
        .map(|(index, _)| index)
}

fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

fn trim_blank_lines(code: &str) -> &str {
    code.trim_start_matches(['\r', '\n'])
        .trim_end_matches(['\r', '\n'])
}

/// Render one suggestion fence, long enough not to be closed by the code
fn suggestion_fence(code: &str) -> String {
    let longest_run = code
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            let run = trimmed.chars().take_while(|c| *c == '`').count();
            (run >= 3).then_some(run)
        })
        .max()
        .unwrap_or(0);
    let ticks = "`".repeat(longest_run.max(2) + 1);

    if code.is_empty() {
        format!("{ticks}suggestion\n{ticks}")
    } else {
        format!("{ticks}suggestion\n{code}\n{ticks}")
    }
}
