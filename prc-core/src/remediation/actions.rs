//! `gh comment` command lines suggested in remediation plans

use std::fmt;

use crate::comment::{CommentOperation, CommentTarget, CommentType, OperationKind, Reaction};

const MAX_INLINE_MESSAGE: usize = 72;

/// Flags that pin a command to the repository and pull request of the batch
#[derive(Debug, Clone, Copy)]
pub(super) struct Scope<'a> {
    pub repo: Option<&'a str>,
    pub pr: u64,
}

impl fmt::Display for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(repo) = self.repo {
            write!(f, "--repo {} ", quote_arg(repo))?;
        }
        write!(f, "--pr {}", self.pr)
    }
}

/// Single-quote an argument unless it is made of shell-safe characters only
pub fn quote_arg(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./+:@%,=".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Quote a message for a shell, or use a placeholder for long/multi-line text
pub(super) fn quote_message(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() || body.contains('\n') || body.chars().count() > MAX_INLINE_MESSAGE {
        return "\"<message>\"".to_string();
    }
    format!("'{}'", body.replace('\'', r"'\''"))
}

fn type_flag(comment_type: CommentType) -> &'static str {
    match comment_type {
        CommentType::Review => "",
        CommentType::Issue => " --type issue",
    }
}

pub(super) fn add_line(scope: Scope<'_>, location: Option<(&str, String)>, body: &str) -> String {
    let (path, line) = match location {
        Some((path, line)) => (quote_arg(path), line),
        None => ("<file>".to_string(), "<line>".to_string()),
    };
    format!("gh comment add {path} {line} {} {scope}", quote_message(body))
}

pub(super) fn add_general(scope: Scope<'_>, body: &str) -> String {
    format!("gh comment add {} --type issue {scope}", quote_message(body))
}

pub(super) fn reply(scope: Scope<'_>, id: u64, body: &str, comment_type: CommentType) -> String {
    format!(
        "gh comment reply {id} {}{} {scope}",
        quote_message(body),
        type_flag(comment_type)
    )
}

pub(super) fn react(
    scope: Scope<'_>,
    id: u64,
    reaction: Reaction,
    comment_type: CommentType,
    remove: bool,
) -> String {
    let remove = if remove { " --remove" } else { "" };
    format!(
        "gh comment react {id} {reaction}{remove}{} {scope}",
        type_flag(comment_type)
    )
}

pub(super) fn edit(scope: Scope<'_>, id: u64, body: &str, comment_type: CommentType) -> String {
    format!(
        "gh comment edit {id} {}{} {scope}",
        quote_message(body),
        type_flag(comment_type)
    )
}

pub(super) fn resolve(scope: Scope<'_>, id: u64) -> String {
    format!("gh comment resolve {id} {scope}")
}

pub(super) fn list(scope: Scope<'_>) -> String {
    format!("gh comment list {scope}")
}

pub(super) fn lines(scope: Scope<'_>, path: &str) -> String {
    format!("gh comment lines {} {scope}", quote_arg(path))
}

/// `gh pr view`, for when the pull request itself is in doubt
pub(super) fn view_pr(scope: Scope<'_>) -> String {
    match scope.repo {
        Some(repo) => format!("gh pr view {} --repo {}", scope.pr, quote_arg(repo)),
        None => format!("gh pr view {}", scope.pr),
    }
}

/// The command that repeats `op`, optionally with a different comment type
pub(super) fn rerun(
    op: &CommentOperation,
    scope: Scope<'_>,
    comment_type: Option<CommentType>,
) -> String {
    let comment_type = comment_type.unwrap_or(op.metadata.comment_type);
    let id = op.target.comment_id().unwrap_or_default();

    match (op.kind, &op.target) {
        (OperationKind::Add, CommentTarget::Line { path, range, .. }) => {
            add_line(scope, Some((path, range.to_string())), &op.body)
        }
        (OperationKind::Add, _) => add_general(scope, &op.body),
        (OperationKind::Reply, _) => reply(scope, id, &op.body, comment_type),
        (OperationKind::React, _) => react(
            scope,
            id,
            op.metadata.reaction.unwrap_or(Reaction::PlusOne),
            comment_type,
            op.metadata.remove_reaction,
        ),
        (OperationKind::Resolve, _) => resolve(scope, id),
        (OperationKind::Edit, _) => edit(scope, id, &op.body, comment_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::{LineRange, OperationMetadata, Side};

    const SCOPE: Scope<'static> = Scope {
        repo: Some("octo/widgets"),
        pr: 9,
    };

    #[test]
    fn test_quote_message() {
        assert_eq!(quote_message("looks good"), "'looks good'");
        assert_eq!(quote_message("it's fine"), r"'it'\''s fine'");
        assert_eq!(quote_message("two\nlines"), "\"<message>\"");
        assert_eq!(quote_message(&"x".repeat(100)), "\"<message>\"");
    }

    #[test]
    fn test_quote_arg() {
        assert_eq!(quote_arg("src/a.rs"), "src/a.rs");
        assert_eq!(quote_arg("docs/My Notes.md"), "'docs/My Notes.md'");
        assert_eq!(quote_arg("it's.md"), r"'it'\''s.md'");
        assert_eq!(quote_arg("$HOME"), "'$HOME'");
    }

    #[test]
    fn test_scope_flags() {
        assert_eq!(SCOPE.to_string(), "--repo octo/widgets --pr 9");
        assert_eq!(Scope { repo: None, pr: 3 }.to_string(), "--pr 3");
    }

    fn add_op(path: &str) -> CommentOperation {
        CommentOperation {
            kind: OperationKind::Add,
            target: CommentTarget::Line {
                path: path.to_string(),
                range: LineRange::new(3, 5).unwrap(),
                side: Side::Right,
            },
            body: "tidy".to_string(),
            expanded_body: "tidy".to_string(),
            metadata: OperationMetadata::default(),
        }
    }

    #[test]
    fn test_rerun_add() {
        assert_eq!(
            rerun(&add_op("src/a.rs"), SCOPE, None),
            "gh comment add src/a.rs 3-5 'tidy' --repo octo/widgets --pr 9"
        );
    }

    #[test]
    fn test_rerun_add_quotes_path_with_spaces() {
        assert_eq!(
            rerun(&add_op("docs/My Notes.md"), SCOPE, None),
            "gh comment add 'docs/My Notes.md' 3-5 'tidy' --repo octo/widgets --pr 9"
        );
    }

    #[test]
    fn test_rerun_reply_with_other_type() {
        let op = CommentOperation {
            kind: OperationKind::Reply,
            target: CommentTarget::Comment { id: 77 },
            body: "done".to_string(),
            expanded_body: "done".to_string(),
            metadata: OperationMetadata {
                reply_to: Some(77),
                ..OperationMetadata::default()
            },
        };
        assert_eq!(
            rerun(&op, Scope { repo: None, pr: 2 }, Some(CommentType::Issue)),
            "gh comment reply 77 'done' --type issue --pr 2"
        );
    }

    #[test]
    fn test_rerun_reaction_removal_and_edit() {
        let mut op = CommentOperation {
            kind: OperationKind::React,
            target: CommentTarget::Comment { id: 5 },
            body: String::new(),
            expanded_body: String::new(),
            metadata: OperationMetadata {
                reaction: Some(Reaction::Heart),
                remove_reaction: true,
                ..OperationMetadata::default()
            },
        };
        assert_eq!(
            rerun(&op, SCOPE, None),
            "gh comment react 5 heart --remove --repo octo/widgets --pr 9"
        );

        op.kind = OperationKind::Edit;
        op.body = "better".to_string();
        assert_eq!(
            rerun(&op, SCOPE, Some(CommentType::Issue)),
            "gh comment edit 5 'better' --type issue --repo octo/widgets --pr 9"
        );
    }

    #[test]
    fn test_lines_and_view_pr() {
        assert_eq!(
            lines(SCOPE, "src/a b.rs"),
            "gh comment lines 'src/a b.rs' --repo octo/widgets --pr 9"
        );
        assert_eq!(view_pr(SCOPE), "gh pr view 9 --repo octo/widgets");
    }
}
