//! Minimal fenced-code-block scanning for comment bodies
//!
//! Only what the validator and the suggestion expander need: recognising
//! fence lines (```` ``` ```` and `~~~`, three or more markers, optional info
//! string) and tracking whether a line sits inside a fenced block.

/// An opening or closing fence line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence<'a> {
    /// Fence character (`` ` `` or `~`)
    pub marker: char,
    /// Number of fence characters
    pub len: usize,
    /// Info string after the fence (e.g. `suggestion`), trimmed
    pub info: &'a str,
}

impl Fence<'_> {
    /// Whether this fence opens a GitHub suggestion block
    pub fn is_suggestion(&self) -> bool {
        self.marker == '`' && is_suggestion_info(self.info)
    }

    /// Whether `other` (a fence without info string) closes this fence
    pub fn is_closed_by(&self, other: &Fence<'_>) -> bool {
        other.marker == self.marker && other.len >= self.len && other.info.is_empty()
    }
}

/// `suggestion`, optionally followed by GitHub's `:+N`/`:-N` offset form
fn is_suggestion_info(info: &str) -> bool {
    match info.strip_prefix("suggestion") {
        Some(rest) => rest.is_empty() || rest.starts_with(':') || rest.starts_with(' '),
        None => false,
    }
}

/// Parse a line as a fence, allowing up to three spaces of indentation
pub fn parse_fence(line: &str) -> Option<Fence<'_>> {
    let line = line.trim_end_matches(['\n', '\r']);
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = rest.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    let info = rest[len..].trim();
    // Backtick fences cannot carry backticks in their info string
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some(Fence { marker, len, info })
}

/// One line of a body together with its fence context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// A fence that opens a block
    Open(Fence<'a>),
    /// A fence that closes the currently open block
    Close,
    /// Content inside a fenced block
    Fenced,
    /// Ordinary markdown outside any fence
    Text,
}

/// Walks the lines of a body (keeping line terminators) and classifies each
#[derive(Debug)]
pub struct FenceTracker<'a> {
    open: Option<Fence<'a>>,
}

impl<'a> FenceTracker<'a> {
    /// Create a tracker starting outside any fence
    pub fn new() -> Self {
        Self { open: None }
    }

    /// The currently open fence, if any
    pub fn open_fence(&self) -> Option<&Fence<'a>> {
        self.open.as_ref()
    }

    /// Classify the next line and advance
    pub fn classify(&mut self, line: &'a str) -> LineClass<'a> {
        let fence = parse_fence(line);
        match (self.open, fence) {
            (Some(open), Some(f)) if open.is_closed_by(&f) => {
                self.open = None;
                LineClass::Close
            }
            (Some(_), _) => LineClass::Fenced,
            (None, Some(f)) => {
                self.open = Some(f);
                LineClass::Open(f)
            }
            (None, None) => LineClass::Text,
        }
    }
}

impl Default for FenceTracker<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_fence() {
        let fence = parse_fence("```\n").unwrap();
        assert_eq!(fence.marker, '`');
        assert_eq!(fence.len, 3);
        assert!(fence.info.is_empty());
    }

    #[test]
    fn test_parse_suggestion_fence() {
        assert!(parse_fence("```suggestion").unwrap().is_suggestion());
        assert!(parse_fence("````suggestion\r\n").unwrap().is_suggestion());
        assert!(parse_fence("```suggestion:+2").unwrap().is_suggestion());
        assert!(!parse_fence("```suggestions").unwrap().is_suggestion());
        assert!(!parse_fence("~~~suggestion").unwrap().is_suggestion());
    }

    #[test]
    fn test_not_a_fence() {
        assert!(parse_fence("``inline``").is_none());
        assert!(parse_fence("    ```").is_none());
        assert!(parse_fence("``` has `tick`").is_none());
        assert!(parse_fence("text ```").is_none());
    }

    #[test]
    fn test_tracker_classifies_block() {
        let body = "before\n```rust\nlet x = 1;\n```\nafter";
        let mut tracker = FenceTracker::new();
        let classes: Vec<_> = body
            .split_inclusive('\n')
            .map(|l| tracker.classify(l))
            .collect();

        assert_eq!(classes[0], LineClass::Text);
        assert!(matches!(classes[1], LineClass::Open(f) if f.info == "rust"));
        assert_eq!(classes[2], LineClass::Fenced);
        assert_eq!(classes[3], LineClass::Close);
        assert_eq!(classes[4], LineClass::Text);
        assert!(tracker.open_fence().is_none());
    }

    #[test]
    fn test_shorter_fence_does_not_close() {
        let mut tracker = FenceTracker::new();
        tracker.classify("````\n");
        assert_eq!(tracker.classify("```\n"), LineClass::Fenced);
        assert_eq!(tracker.classify("````\n"), LineClass::Close);
    }
}
