//! Comment data model shared by the parser, dispatcher and classifier

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum comment body length GitHub accepts, in characters
pub const MAX_COMMENT_LENGTH: usize = 65_536;

/// Maximum accepted length of a file path, in characters
pub const MAX_FILE_PATH_LENGTH: usize = 4096;

/// What an operation does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Create a new comment
    Add,
    /// Reply to an existing comment
    Reply,
    /// Resolve the review thread containing a comment
    Resolve,
    /// React to an existing comment, or take a reaction back
    React,
    /// Replace the body of an existing comment
    Edit,
}

impl OperationKind {
    /// Whether operations of this kind carry a comment body
    pub fn has_body(self) -> bool {
        matches!(
            self,
            OperationKind::Add | OperationKind::Reply | OperationKind::Edit
        )
    }

    /// The `gh comment` subcommand that performs this kind of operation
    pub fn command(self) -> &'static str {
        match self {
            OperationKind::Add => "add",
            OperationKind::Reply => "reply",
            OperationKind::Resolve => "resolve",
            OperationKind::React => "react",
            OperationKind::Edit => "edit",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Add => "ADD",
            OperationKind::Reply => "REPLY",
            OperationKind::Resolve => "RESOLVE",
            OperationKind::React => "REACT",
            OperationKind::Edit => "EDIT",
        })
    }
}

/// The two comment object types GitHub exposes on a pull request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentType {
    /// Line-anchored review comment ("Files changed" tab)
    #[default]
    Review,
    /// General conversation comment on the pull request
    Issue,
}

impl CommentType {
    /// The other comment type
    pub fn other(self) -> Self {
        match self {
            CommentType::Review => CommentType::Issue,
            CommentType::Issue => CommentType::Review,
        }
    }

    /// Lowercase name as accepted by `--type`
    pub fn as_str(self) -> &'static str {
        match self {
            CommentType::Review => "review",
            CommentType::Issue => "issue",
        }
    }
}

impl fmt::Display for CommentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "review" => Ok(CommentType::Review),
            "issue" => Ok(CommentType::Issue),
            other => Err(format!("type must be 'review' or 'issue', got '{other}'")),
        }
    }
}

/// Diff side a review comment is anchored to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Deleted/old lines
    Left,
    /// Added/new lines
    #[default]
    Right,
}

impl Side {
    /// API representation
    pub fn as_api_str(self) -> &'static str {
        match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
        }
    }
}

/// Inclusive, 1-based range of lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    /// First line
    pub start: u32,
    /// Last line (equal to `start` for a single line)
    pub end: u32,
}

impl LineRange {
    /// A single-line range
    pub fn single(line: u32) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    /// Build a range, rejecting zero lines and inverted bounds
    pub fn new(start: u32, end: u32) -> Result<Self, String> {
        if start == 0 || end == 0 {
            return Err("line numbers must be positive".to_string());
        }
        if start > end {
            return Err(format!(
                "start line ({start}) cannot be greater than end line ({end})"
            ));
        }
        Ok(Self { start, end })
    }

    /// Whether the range covers more than one line
    pub fn is_multi_line(&self) -> bool {
        self.end > self.start
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_multi_line() {
            write!(f, "{}-{}", self.start, self.end)
        } else {
            write!(f, "{}", self.start)
        }
    }
}

impl FromStr for LineRange {
    type Err = String;

    /// Parse `"10"` or `"10-15"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_line = |part: &str, what: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid {what} '{}'", part.trim()))
        };

        match s.split_once('-') {
            Some((start, end)) => {
                LineRange::new(parse_line(start, "start line")?, parse_line(end, "end line")?)
            }
            None => {
                let line = parse_line(s, "line")?;
                LineRange::new(line, line)
            }
        }
    }
}

/// Reaction content accepted by GitHub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reaction {
    #[serde(rename = "+1")]
    PlusOne,
    #[serde(rename = "-1")]
    MinusOne,
    #[serde(rename = "laugh")]
    Laugh,
    #[serde(rename = "confused")]
    Confused,
    #[serde(rename = "heart")]
    Heart,
    #[serde(rename = "hooray")]
    Hooray,
    #[serde(rename = "rocket")]
    Rocket,
    #[serde(rename = "eyes")]
    Eyes,
}

impl Reaction {
    /// Every reaction, in GitHub's display order
    pub const ALL: [Reaction; 8] = [
        Reaction::PlusOne,
        Reaction::MinusOne,
        Reaction::Laugh,
        Reaction::Confused,
        Reaction::Heart,
        Reaction::Hooray,
        Reaction::Rocket,
        Reaction::Eyes,
    ];

    /// API content string
    pub fn as_str(self) -> &'static str {
        match self {
            Reaction::PlusOne => "+1",
            Reaction::MinusOne => "-1",
            Reaction::Laugh => "laugh",
            Reaction::Confused => "confused",
            Reaction::Heart => "heart",
            Reaction::Hooray => "hooray",
            Reaction::Rocket => "rocket",
            Reaction::Eyes => "eyes",
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reaction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Reaction::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "reaction '{wanted}' must be one of: {}",
                    Reaction::ALL.map(Reaction::as_str).join(", ")
                )
            })
    }
}

/// Where an operation applies
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "on", rename_all = "snake_case")]
pub enum CommentTarget {
    /// A location in the pull request diff
    Line {
        path: String,
        range: LineRange,
        #[serde(default)]
        side: Side,
    },
    /// An existing comment
    Comment { id: u64 },
    /// The pull request conversation itself
    PullRequest,
}

impl CommentTarget {
    /// The comment id, for operations on existing comments
    pub fn comment_id(&self) -> Option<u64> {
        match self {
            CommentTarget::Comment { id } => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for CommentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentTarget::Line { path, range, .. } => write!(f, "{path}:{range}"),
            CommentTarget::Comment { id } => write!(f, "comment #{id}"),
            CommentTarget::PullRequest => f.write_str("pull request"),
        }
    }
}

/// Per-operation details that do not fit the target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// Comment object type the operation works with
    pub comment_type: CommentType,
    /// Id of the comment being replied to
    pub reply_to: Option<u64>,
    /// Reaction to add or remove (React only)
    pub reaction: Option<Reaction>,
    /// Remove `reaction` instead of adding it
    #[serde(default)]
    pub remove_reaction: bool,
}

/// One unit of work in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentOperation {
    /// What to do
    pub kind: OperationKind,
    /// Where to do it
    pub target: CommentTarget,
    /// Body as written by the author
    pub body: String,
    /// Body after suggestion expansion; this is what gets sent
    pub expanded_body: String,
    /// Extra details
    pub metadata: OperationMetadata,
}

impl CommentOperation {
    /// One-line description used in progress and dry-run output
    pub fn summary(&self) -> String {
        match self.kind {
            OperationKind::Add => format!(
                "{} {} comment on {}",
                self.kind, self.metadata.comment_type, self.target
            ),
            OperationKind::Reply => format!("{} to {}", self.kind, self.target),
            OperationKind::Resolve => format!("{} thread of {}", self.kind, self.target),
            OperationKind::React => format!(
                "{}{} {} on {}",
                self.kind,
                if self.metadata.remove_reaction { " (remove)" } else { "" },
                self.metadata
                    .reaction
                    .map(Reaction::as_str)
                    .unwrap_or("?"),
                self.target
            ),
            OperationKind::Edit => format!(
                "{} {} {}",
                self.kind, self.metadata.comment_type, self.target
            ),
        }
    }
}

/// Request payload for a new comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    /// Body to post (already expanded)
    pub body: String,
    /// Where to post it
    pub target: CommentTarget,
}

/// A comment as returned by the hosting service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment id
    pub id: u64,
    /// Comment type
    pub comment_type: CommentType,
    /// Body text
    pub body: String,
    /// Author login
    pub author: String,
    /// File path (review comments)
    pub path: Option<String>,
    /// Line number (review comments)
    pub line: Option<u32>,
    /// Review this comment was submitted with (review comments)
    pub review_id: Option<u64>,
    /// Parent comment for threaded replies
    pub in_reply_to: Option<u64>,
    /// Creation time
    pub created_at: Option<DateTime<Utc>>,
}

/// What the hosting service knows about an existing comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentMetadata {
    /// Comment id
    pub id: u64,
    /// Object type the comment actually is
    pub comment_type: CommentType,
    /// Review submission the comment belongs to, if any
    pub parent_review_id: Option<u64>,
    /// Whether the comment accepts direct REST replies
    pub is_standalone: bool,
    /// File path for review comments
    pub path: Option<String>,
    /// Line for review comments
    pub line: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_range_parse_single() {
        let range: LineRange = "42".parse().unwrap();
        assert_eq!(range, LineRange::single(42));
        assert!(!range.is_multi_line());
    }

    #[test]
    fn test_line_range_parse_span() {
        let range: LineRange = "10 - 15".parse().unwrap();
        assert_eq!(range.start, 10);
        assert_eq!(range.end, 15);
        assert_eq!(range.to_string(), "10-15");
    }

    #[test]
    fn test_line_range_rejects_inverted_and_zero() {
        assert!("15-10".parse::<LineRange>().is_err());
        assert!("0".parse::<LineRange>().is_err());
        assert!("abc".parse::<LineRange>().is_err());
    }

    #[test]
    fn test_reaction_parse() {
        assert_eq!("+1".parse::<Reaction>().unwrap(), Reaction::PlusOne);
        assert_eq!("eyes".parse::<Reaction>().unwrap(), Reaction::Eyes);
        let err = "thumbsup".parse::<Reaction>().unwrap_err();
        assert!(err.contains("+1, -1, laugh"));
    }

    #[test]
    fn test_reaction_serde_names() {
        let json = serde_json::to_string(&Reaction::PlusOne).unwrap();
        assert_eq!(json, "\"+1\"");
    }

    #[test]
    fn test_comment_type_other() {
        assert_eq!(CommentType::Review.other(), CommentType::Issue);
        assert_eq!("ISSUE".parse::<CommentType>().unwrap(), CommentType::Issue);
    }

    #[test]
    fn test_target_display() {
        let target = CommentTarget::Line {
            path: "src/lib.rs".to_string(),
            range: LineRange::new(3, 4).unwrap(),
            side: Side::Right,
        };
        assert_eq!(target.to_string(), "src/lib.rs:3-4");
        assert_eq!(CommentTarget::Comment { id: 7 }.to_string(), "comment #7");
    }

    #[test]
    fn test_summary_names_edit_and_reaction_removal() {
        let mut op = CommentOperation {
            kind: OperationKind::Edit,
            target: CommentTarget::Comment { id: 7 },
            body: "fixed typo".to_string(),
            expanded_body: "fixed typo".to_string(),
            metadata: OperationMetadata {
                comment_type: CommentType::Issue,
                ..OperationMetadata::default()
            },
        };
        assert_eq!(op.summary(), "EDIT issue comment #7");
        assert!(OperationKind::Edit.has_body());

        op.kind = OperationKind::React;
        op.metadata.reaction = Some(Reaction::Heart);
        op.metadata.remove_reaction = true;
        assert_eq!(op.summary(), "REACT (remove) heart on comment #7");
    }
}
