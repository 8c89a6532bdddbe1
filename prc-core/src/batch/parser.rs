//! Batch file parsing: YAML/JSON → validated, expanded operations

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{BatchDefaults, BatchDocument, BatchEntry, BatchSpec, ParseError, ParsedBatch, TargetRef};
use crate::comment::{
    CommentOperation, CommentTarget, CommentType, LineRange, OperationKind, OperationMetadata,
    Reaction, MAX_FILE_PATH_LENGTH,
};
use crate::suggest::{self, Anchor};
use crate::validate::{self, ValidationIssue};

/// Knobs that come from the command line and configuration
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Expand suggestion markers; the batch file can only turn this off
    pub expand_suggestions: bool,
    /// Comment type used when neither the entry nor the batch defaults name one
    pub comment_type: Option<CommentType>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            expand_suggestions: true,
            comment_type: None,
        }
    }
}

/// Parse batch bytes with default options
pub fn parse(raw: &[u8]) -> Result<ParsedBatch, ParseError> {
    Parser::default().parse(raw)
}

/// Turns batch documents into [`BatchSpec`]s
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    /// Create a parser with the given options
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse raw batch bytes (YAML, or JSON as a YAML subset)
    ///
    /// Returns `Err` only when the document itself is unreadable. Problems
    /// with individual entries are reported as issues on the result; if any
    /// of them is an error the spec has no operations.
    pub fn parse(&self, raw: &[u8]) -> Result<ParsedBatch, ParseError> {
        let text = std::str::from_utf8(raw)?;

        let document: BatchDocument = if is_blank_document(text) {
            BatchDocument::default()
        } else {
            serde_yaml::from_str(text)?
        };

        Ok(self.build(document))
    }

    /// Read and parse a batch file
    pub fn parse_file(&self, path: &Path) -> Result<ParsedBatch, ParseError> {
        let raw = std::fs::read(path).map_err(|source| ParseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = raw.len(), "Read batch file");
        self.parse(&raw)
    }

    /// Read and parse a batch from a stream such as stdin
    pub fn parse_reader<R: Read>(&self, mut reader: R) -> Result<ParsedBatch, ParseError> {
        let mut raw = Vec::new();
        reader
            .read_to_end(&mut raw)
            .map_err(|source| ParseError::Read {
                path: PathBuf::from("-"),
                source,
            })?;
        self.parse(&raw)
    }

    /// Validate and expand an already deserialised document
    pub fn build(&self, document: BatchDocument) -> ParsedBatch {
        let expand = self.options.expand_suggestions && document.expand_suggestions.unwrap_or(true);
        let mut issues = Vec::new();

        if document.pr == Some(0) {
            issues.push(ValidationIssue::error("pr", "pull request number must be positive"));
        }
        if let Some(repo) = &document.repo {
            if !is_owner_repo(repo) {
                issues.push(ValidationIssue::error(
                    "repo",
                    format!("repository '{repo}' must be in owner/name form"),
                ));
            }
        }

        let mut operations = Vec::with_capacity(document.comments.len());
        for (index, entry) in document.comments.iter().enumerate() {
            let mut builder = EntryBuilder {
                entry,
                defaults: &document.defaults,
                options: &self.options,
                expand,
                issues: Vec::new(),
            };
            if let Some(operation) = builder.build() {
                operations.push(operation);
            }
            issues.extend(builder.issues.into_iter().map(|issue| issue.at(index)));
        }

        if validate::has_errors(&issues) {
            let errors = issues.iter().filter(|i| i.is_error()).count();
            info!(entries = document.comments.len(), errors, "Batch rejected");
            operations.clear();
        } else {
            debug!(operations = operations.len(), warnings = issues.len(), "Batch parsed");
        }

        ParsedBatch {
            spec: BatchSpec {
                pr: document.pr,
                repo: document.repo,
                defaults: document.defaults,
                operations,
            },
            issues,
        }
    }
}

/// Reject absolute paths, parent traversal and absurd lengths
pub fn validate_file_path(path: &str) -> Result<(), String> {
    if path.trim().is_empty() {
        return Err("file path is empty".to_string());
    }
    if path.chars().count() > MAX_FILE_PATH_LENGTH {
        return Err(format!(
            "file path too long (maximum {MAX_FILE_PATH_LENGTH} characters)"
        ));
    }
    if path.starts_with('/') || path.starts_with('\\') || has_drive_prefix(path) {
        return Err(format!(
            "file path '{path}' must be relative to the repository root"
        ));
    }
    if path.split(['/', '\\']).any(|component| component == "..") {
        return Err(format!("file path '{path}' must not contain '..'"));
    }
    if path.chars().any(char::is_control) {
        return Err("file path contains control characters".to_string());
    }
    Ok(())
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn is_owner_repo(repo: &str) -> bool {
    matches!(repo.split_once('/'), Some((owner, name))
        if !owner.is_empty() && !name.is_empty() && !name.contains('/'))
}

/// Comments and document markers only, which serde_yaml refuses to read
fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

/// Builds one operation while collecting its issues
struct EntryBuilder<'a> {
    entry: &'a BatchEntry,
    defaults: &'a BatchDefaults,
    options: &'a ParseOptions,
    expand: bool,
    issues: Vec<ValidationIssue>,
}

impl EntryBuilder<'_> {
    fn build(&mut self) -> Option<CommentOperation> {
        let kind = self.entry.effective_kind();
        let comment_type = self
            .entry
            .comment_type
            .or(self.defaults.comment_type)
            .or(self.options.comment_type)
            .unwrap_or_default();

        self.warn_ignored_fields(kind);

        let target = match kind {
            OperationKind::Add => self.add_target(comment_type),
            OperationKind::Reply
            | OperationKind::Resolve
            | OperationKind::React
            | OperationKind::Edit => self.comment_target(kind),
        };

        let reaction = match kind {
            OperationKind::React => self.reaction(),
            _ => None,
        };

        let body = self.entry.body.clone().unwrap_or_default();
        let expanded_body = if kind.has_body() {
            self.expand_body(&body, anchor_for(kind, comment_type, target.as_ref()))
        } else {
            body.clone()
        };
        self.issues.extend(validate::validate(&expanded_body, kind));

        let target = target?;
        if kind == OperationKind::React && reaction.is_none() {
            return None;
        }

        let reply_to = match kind {
            OperationKind::Reply => target.comment_id(),
            _ => None,
        };

        Some(CommentOperation {
            kind,
            target,
            body,
            expanded_body,
            metadata: OperationMetadata {
                comment_type,
                reply_to,
                reaction,
                remove_reaction: kind == OperationKind::React && self.entry.remove == Some(true),
            },
        })
    }

    fn error(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue::error(field, message));
    }

    fn warn_ignored_fields(&mut self, kind: OperationKind) {
        let entry = self.entry;
        let mut ignored = Vec::new();

        if kind != OperationKind::Add {
            if entry.file.is_some() {
                ignored.push("file");
            }
            if entry.line.is_some() {
                ignored.push("line");
            }
            if entry.range.is_some() {
                ignored.push("range");
            }
            if entry.side.is_some() {
                ignored.push("side");
            }
        }
        if kind != OperationKind::React && entry.reaction.is_some() {
            ignored.push("reaction");
        }
        if kind != OperationKind::React && entry.remove == Some(true) {
            ignored.push("remove");
        }
        if kind != OperationKind::Resolve && entry.resolve == Some(true) {
            ignored.push("resolve");
        }
        if kind == OperationKind::Add && entry.reply_to.is_some() {
            ignored.push("reply_to");
        }
        if kind == OperationKind::Add && entry.comment.is_some() {
            ignored.push("comment");
        }

        for field in ignored {
            self.issues.push(ValidationIssue::warning(
                field,
                format!("'{field}' is ignored for {kind} operations"),
            ));
        }
    }

    fn add_target(&mut self, comment_type: CommentType) -> Option<CommentTarget> {
        let entry = self.entry;

        if comment_type == CommentType::Issue {
            if entry.target.is_some() || entry.file.is_some() || entry.line.is_some() || entry.range.is_some() {
                self.issues.push(ValidationIssue::warning(
                    "target",
                    "issue comments are not anchored to lines; location is ignored",
                ));
            }
            return Some(CommentTarget::PullRequest);
        }

        let (path, range) = match &entry.target {
            Some(target) => {
                if entry.file.is_some() || entry.line.is_some() || entry.range.is_some() {
                    self.error("target", "'target' cannot be combined with 'file', 'line' or 'range'");
                    return None;
                }
                match target {
                    TargetRef::Text(text) if !is_comment_id(text) => match parse_location(text) {
                        Ok(location) => location,
                        Err(message) => {
                            self.error("target", message);
                            return None;
                        }
                    },
                    _ => {
                        self.error(
                            "target",
                            "add operations need a file location ('path:line'), not a comment id",
                        );
                        return None;
                    }
                }
            }
            None => {
                let Some(path) = entry.file.clone().or_else(|| self.defaults.file.clone()) else {
                    self.error(
                        "file",
                        "file is required for review comments (or use type: issue for a general comment)",
                    );
                    return None;
                };
                (path, self.line_range()?)
            }
        };

        if let Err(message) = validate_file_path(&path) {
            self.error("file", message);
            return None;
        }

        Some(CommentTarget::Line {
            path,
            range,
            side: entry.side.unwrap_or_default(),
        })
    }

    fn line_range(&mut self) -> Option<LineRange> {
        let entry = self.entry;
        let result = match (entry.line, &entry.range) {
            (Some(_), Some(_)) => Err("specify either 'line' or 'range', not both".to_string()),
            (None, Some(range)) => range.parse::<LineRange>(),
            (Some(line), None) => LineRange::new(line, line),
            (None, None) => match self.defaults.line {
                Some(line) => LineRange::new(line, line),
                None => Err("line is required for review comments".to_string()),
            },
        };

        result
            .map_err(|message| {
                let field = if entry.range.is_some() { "range" } else { "line" };
                self.error(field, message);
            })
            .ok()
    }

    fn comment_target(&mut self, kind: OperationKind) -> Option<CommentTarget> {
        let entry = self.entry;

        let from_target = match &entry.target {
            Some(TargetRef::Id(id)) => Some(*id),
            Some(TargetRef::Text(text)) => match text.trim().parse::<u64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    self.error(
                        "target",
                        format!("{kind} operations need a comment id, got '{text}'"),
                    );
                    return None;
                }
            },
            None => None,
        };

        let id = match kind {
            OperationKind::Reply => entry.reply_to.or(entry.comment).or(from_target),
            _ => entry.comment.or(from_target).or(entry.reply_to),
        };

        match id {
            Some(0) => {
                self.error("comment", "comment id must be positive");
                None
            }
            Some(id) => Some(CommentTarget::Comment { id }),
            None => {
                let field = if kind == OperationKind::Reply { "reply_to" } else { "comment" };
                self.error(field, format!("{kind} operations need the id of an existing comment"));
                None
            }
        }
    }

    fn reaction(&mut self) -> Option<Reaction> {
        match &self.entry.reaction {
            Some(content) => match content.parse::<Reaction>() {
                Ok(reaction) => Some(reaction),
                Err(message) => {
                    self.error("reaction", message);
                    None
                }
            },
            None => {
                self.error("reaction", "reaction is required for react operations");
                None
            }
        }
    }

    fn expand_body(&mut self, body: &str, anchor: Anchor) -> String {
        if !self.expand {
            return body.to_string();
        }
        if !anchor.accepts_suggestions() && suggest::has_markers(body) {
            self.issues.push(ValidationIssue::warning(
                "body",
                "suggestion markers only work on line comments; left as text",
            ));
        }
        suggest::expand(body, anchor)
    }
}

fn anchor_for(kind: OperationKind, comment_type: CommentType, target: Option<&CommentTarget>) -> Anchor {
    match (kind, comment_type, target) {
        (_, _, Some(CommentTarget::Line { range, .. })) => Anchor::Lines(*range),
        (OperationKind::Reply | OperationKind::Edit, CommentType::Review, _) => Anchor::Thread,
        _ => Anchor::Unanchored,
    }
}

fn is_comment_id(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Parse `path:10` or `path:10-12`
fn parse_location(text: &str) -> Result<(String, LineRange), String> {
    let Some((path, lines)) = text.rsplit_once(':') else {
        return Err(format!(
            "target '{text}' must be 'path:line', 'path:start-end' or a comment id"
        ));
    };
    let range = lines
        .parse::<LineRange>()
        .map_err(|e| format!("target '{text}': {e}"))?;
    Ok((path.trim().to_string(), range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::Side;
    use crate::validate::Severity;

    fn parse_str(yaml: &str) -> ParsedBatch {
        parse(yaml.as_bytes()).unwrap()
    }

    fn error_fields(parsed: &ParsedBatch) -> Vec<(Option<usize>, &str)> {
        parsed
            .issues
            .iter()
            .filter(|i| i.is_error())
            .map(|i| (i.operation, i.field.as_str()))
            .collect()
    }

    #[test]
    fn test_add_with_line_marker() {
        let parsed = parse_str(
            r#"
comments:
  - kind: add
    target: "a.go:10"
    body: "nit: rename\nsuggest: newName"
"#,
        );

        assert!(!parsed.has_errors(), "{:?}", parsed.issues);
        assert_eq!(parsed.spec.len(), 1);
        let op = &parsed.spec.operations[0];
        assert_eq!(op.kind, OperationKind::Add);
        assert_eq!(
            op.target,
            CommentTarget::Line {
                path: "a.go".to_string(),
                range: LineRange::single(10),
                side: Side::Right,
            }
        );
        assert_eq!(op.body, "nit: rename\nsuggest: newName");
        assert_eq!(op.expanded_body, "nit: rename\n```suggestion\nnewName\n```");
        assert_eq!(suggest::count_suggestion_blocks(&op.expanded_body), 1);
    }

    #[test]
    fn test_kind_derivation_and_order() {
        let parsed = parse_str(
            r#"
pr: 7
comments:
  - file: src/lib.rs
    line: 3
    body: first
  - reply_to: 11
    body: second
  - reaction: "+1"
    comment: 12
  - resolve: true
    comment: 13
"#,
        );

        assert!(!parsed.has_errors(), "{:?}", parsed.issues);
        assert_eq!(parsed.spec.pr, Some(7));
        let kinds: Vec<_> = parsed.spec.operations.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OperationKind::Add,
                OperationKind::Reply,
                OperationKind::React,
                OperationKind::Resolve
            ]
        );
        let reply = &parsed.spec.operations[1];
        assert_eq!(reply.target, CommentTarget::Comment { id: 11 });
        assert_eq!(reply.metadata.reply_to, Some(11));
        assert_eq!(parsed.spec.operations[2].metadata.reaction, Some(Reaction::PlusOne));
    }

    #[test]
    fn test_edit_and_reaction_removal() {
        let parsed = parse_str(
            r#"
comments:
  - kind: edit
    comment: 31
    body: "Better:\nsuggest: let total = 0;"
  - kind: edit
    target: "32"
    type: issue
    body: "suggest: stays as text"
  - reaction: eyes
    comment: 33
    remove: true
"#,
        );

        assert!(!parsed.has_errors(), "{:?}", parsed.issues);
        let ops = &parsed.spec.operations;
        assert_eq!(ops[0].kind, OperationKind::Edit);
        assert_eq!(ops[0].target, CommentTarget::Comment { id: 31 });
        assert_eq!(ops[0].expanded_body, "Better:\n```suggestion\nlet total = 0;\n```");
        assert_eq!(ops[1].expanded_body, "suggest: stays as text");
        assert_eq!(ops[1].metadata.comment_type, CommentType::Issue);
        assert_eq!(ops[2].kind, OperationKind::React);
        assert!(ops[2].metadata.remove_reaction);
        assert_eq!(ops[2].metadata.reaction, Some(Reaction::Eyes));
    }

    #[test]
    fn test_edit_needs_body_and_comment() {
        let parsed = parse_str("comments:\n  - kind: edit\n    comment: 4\n  - kind: edit\n    body: x\n");
        assert_eq!(
            error_fields(&parsed),
            vec![(Some(0), "body"), (Some(1), "comment")]
        );
    }

    #[test]
    fn test_remove_ignored_outside_react() {
        let parsed = parse_str("comments:\n  - reply_to: 5\n    body: ok\n    remove: true\n");
        assert!(!parsed.has_errors());
        assert_eq!(parsed.issues.len(), 1);
        assert_eq!(parsed.issues[0].field, "remove");
    }

    #[test]
    fn test_one_bad_entry_rejects_whole_batch() {
        let parsed = parse_str(
            r#"
comments:
  - file: a.rs
    line: 1
    body: fine
  - file: ../etc/passwd
    line: 2
    body: sneaky
  - file: b.rs
    line: 3
    body: also fine
"#,
        );

        assert!(parsed.has_errors());
        assert!(parsed.spec.is_empty());
        assert_eq!(error_fields(&parsed), vec![(Some(1), "file")]);
    }

    #[test]
    fn test_errors_from_every_entry_are_reported() {
        let parsed = parse_str(
            r#"
comments:
  - file: a.rs
    line: 1
    body: ""
  - kind: react
    comment: 5
    reaction: thumbsup
"#,
        );

        assert_eq!(
            error_fields(&parsed),
            vec![(Some(0), "body"), (Some(1), "reaction")]
        );
        let reaction = parsed.issues.iter().find(|i| i.field == "reaction").unwrap();
        assert!(reaction.message.contains("+1, -1, laugh"));
    }

    #[test]
    fn test_empty_batch_is_valid() {
        for input in ["", "# nothing yet\n", "comments: []", "{}"] {
            let parsed = parse_str(input);
            assert!(parsed.issues.is_empty(), "{input:?}");
            assert!(parsed.spec.is_empty());
        }
    }

    #[test]
    fn test_duplicate_targets_are_kept() {
        let parsed = parse_str(
            r#"
comments:
  - target: "a.rs:4"
    body: one
  - target: "a.rs:4"
    body: two
"#,
        );
        assert_eq!(parsed.spec.len(), 2);
        assert_eq!(parsed.spec.operations[0].body, "one");
        assert_eq!(parsed.spec.operations[1].body, "two");
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let parsed = parse_str(
            r#"
defaults:
  file: src/main.rs
  line: 20
comments:
  - body: uses both defaults
  - line: 5
    body: uses default file
  - range: "7-9"
    side: left
    body: ranged
"#,
        );

        assert!(!parsed.has_errors(), "{:?}", parsed.issues);
        let targets: Vec<String> = parsed.spec.operations.iter().map(|o| o.target.to_string()).collect();
        assert_eq!(targets, vec!["src/main.rs:20", "src/main.rs:5", "src/main.rs:7-9"]);
        assert!(matches!(
            parsed.spec.operations[2].target,
            CommentTarget::Line { side: Side::Left, .. }
        ));
    }

    #[test]
    fn test_issue_type_targets_pull_request() {
        let parsed = parse_str(
            r#"
defaults:
  type: issue
comments:
  - body: "General note, suggest: nothing here"
"#,
        );
        let op = &parsed.spec.operations[0];
        assert_eq!(op.target, CommentTarget::PullRequest);
        assert_eq!(op.metadata.comment_type, CommentType::Issue);
    }

    #[test]
    fn test_markers_on_unanchored_comment_warn() {
        let parsed = parse_str(
            r#"
comments:
  - type: issue
    body: "suggest: x"
"#,
        );
        assert!(!parsed.has_errors());
        assert_eq!(parsed.spec.operations[0].expanded_body, "suggest: x");
        assert_eq!(parsed.warnings().count(), 1);
    }

    #[test]
    fn test_expansion_can_be_disabled() {
        let yaml = "comments:\n  - target: \"a.rs:1\"\n    body: \"suggest: x\"\n";
        let parser = Parser::new(ParseOptions {
            expand_suggestions: false,
            ..ParseOptions::default()
        });
        let parsed = parser.parse(yaml.as_bytes()).unwrap();
        assert_eq!(parsed.spec.operations[0].expanded_body, "suggest: x");

        let parsed = parse_str(&format!("expand_suggestions: false\n{yaml}"));
        assert_eq!(parsed.spec.operations[0].expanded_body, "suggest: x");
    }

    #[test]
    fn test_line_and_range_conflict() {
        let parsed = parse_str(
            r#"
comments:
  - file: a.rs
    line: 3
    range: "3-4"
    body: x
"#,
        );
        assert_eq!(error_fields(&parsed), vec![(Some(0), "range")]);
    }

    #[test]
    fn test_inverted_range_is_error() {
        let parsed = parse_str("comments:\n  - target: \"a.rs:9-2\"\n    body: x\n");
        assert_eq!(error_fields(&parsed), vec![(Some(0), "target")]);
    }

    #[test]
    fn test_missing_comment_id_is_error() {
        let parsed = parse_str("comments:\n  - kind: resolve\n");
        assert_eq!(error_fields(&parsed), vec![(Some(0), "comment")]);
    }

    #[test]
    fn test_numeric_target_for_reply() {
        let parsed = parse_str("comments:\n  - kind: reply\n    target: \"99\"\n    body: ok\n");
        assert_eq!(parsed.spec.operations[0].target, CommentTarget::Comment { id: 99 });
    }

    #[test]
    fn test_ignored_fields_warn() {
        let parsed = parse_str("comments:\n  - kind: resolve\n    comment: 1\n    body: done\n");
        assert!(!parsed.has_errors());
        assert!(parsed.issues.iter().all(|i| i.severity == Severity::Warning));
        assert_eq!(parsed.issues.len(), 1);
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let err = parse(b"comments:\n  - file: a.rs\n    colour: red\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax(_)));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        assert!(matches!(
            parse(b"comments: [unclosed").unwrap_err(),
            ParseError::Syntax(_)
        ));
        assert!(matches!(
            parse(&[0xff, 0xfe]).unwrap_err(),
            ParseError::Encoding(_)
        ));
    }

    #[test]
    fn test_json_and_operations_alias() {
        let json = r#"{"pr": 3, "operations": [{"file": "x.rs", "line": 1, "message": "hi"}]}"#;
        let parsed = parse_str(json);
        assert_eq!(parsed.spec.len(), 1);
        assert_eq!(parsed.spec.operations[0].body, "hi");
    }

    #[test]
    fn test_bad_repo_is_error() {
        let parsed = parse_str("repo: justaname\n");
        assert_eq!(error_fields(&parsed), vec![(None, "repo")]);
    }

    #[test]
    fn test_validate_file_path() {
        assert!(validate_file_path("src/lib.rs").is_ok());
        assert!(validate_file_path("/etc/passwd").is_err());
        assert!(validate_file_path("C:\\x").is_err());
        assert!(validate_file_path("a/../b").is_err());
        assert!(validate_file_path("a/..b/c").is_ok());
        assert!(validate_file_path(&"a".repeat(MAX_FILE_PATH_LENGTH + 1)).is_err());
        assert!(validate_file_path("  ").is_err());
    }

    #[test]
    fn test_parse_file_and_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.yaml");
        std::fs::write(&path, "comments:\n  - target: \"a.rs:2\"\n    body: hello\n").unwrap();

        let parser = Parser::default();
        assert_eq!(parser.parse_file(&path).unwrap().spec.len(), 1);

        let missing = parser.parse_file(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(missing, ParseError::Read { .. }));

        let from_reader = parser.parse_reader(&b"comments: []"[..]).unwrap();
        assert!(from_reader.spec.is_empty());
    }
}
