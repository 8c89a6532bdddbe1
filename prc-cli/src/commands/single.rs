//! Single-operation commands: add, reply, react, resolve, edit
//!
//! Each one builds a one-entry batch, so arguments get the same validation,
//! suggestion expansion and failure remediation as batch files.

use clap::Args;
use prc_core::batch::{BatchDocument, BatchEntry};
use prc_core::{CommentType, OperationKind, Parser, Side};

use super::batch::parse_options;
use super::run::{run, RunOptions};
use super::Context;

/// Add a line comment or a general pull request comment
#[derive(Args, Debug)]
pub struct AddArgs {
    /// `<message>` for a pull request comment, or `<file> <line|start-end> <message>`
    #[arg(num_args = 1..=3, required = true, value_name = "ARGS")]
    pub args: Vec<String>,

    /// Comment on deleted lines instead of added ones
    #[arg(long)]
    pub left: bool,

    /// Send suggestion markers as written
    #[arg(long)]
    pub no_expand_suggestions: bool,
}

impl AddArgs {
    fn entry(&self) -> anyhow::Result<BatchEntry> {
        let mut entry = BatchEntry {
            kind: Some(OperationKind::Add),
            ..BatchEntry::default()
        };

        match self.args.as_slice() {
            [message] => {
                entry.body = Some(message.clone());
                entry.comment_type = Some(CommentType::Issue);
            }
            [file, lines, message] => {
                entry.file = Some(file.clone());
                entry.range = Some(lines.clone());
                entry.body = Some(message.clone());
                entry.comment_type = Some(CommentType::Review);
                entry.side = self.left.then_some(Side::Left);
            }
            _ => anyhow::bail!(
                "expected <message> or <file> <line|start-end> <message>, got {} argument(s)",
                self.args.len()
            ),
        }
        Ok(entry)
    }

    /// Execute the add command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        run_single(ctx, self.entry()?).await
    }
}

/// Reply to an existing comment
#[derive(Args, Debug)]
pub struct ReplyArgs {
    /// Comment id
    pub id: u64,

    /// Reply text
    pub message: String,

    /// Send suggestion markers as written
    #[arg(long)]
    pub no_expand_suggestions: bool,
}

impl ReplyArgs {
    /// Execute the reply command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let entry = BatchEntry {
            kind: Some(OperationKind::Reply),
            reply_to: Some(self.id),
            body: Some(self.message.clone()),
            ..BatchEntry::default()
        };
        run_single(ctx, entry).await
    }
}

/// React to an existing comment
#[derive(Args, Debug)]
pub struct ReactArgs {
    /// Comment id
    pub id: u64,

    /// One of +1, -1, laugh, confused, heart, hooray, rocket, eyes
    #[arg(allow_hyphen_values = true)]
    pub reaction: String,

    /// Take your reaction back instead of adding it
    #[arg(long)]
    pub remove: bool,
}

impl ReactArgs {
    fn entry(&self) -> BatchEntry {
        BatchEntry {
            kind: Some(OperationKind::React),
            comment: Some(self.id),
            reaction: Some(self.reaction.clone()),
            remove: self.remove.then_some(true),
            ..BatchEntry::default()
        }
    }

    /// Execute the react command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        run_single(ctx, self.entry()).await
    }
}

/// Replace the text of an existing comment
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Comment id
    pub id: u64,

    /// New comment text
    #[arg(required_unless_present = "message", conflicts_with = "message")]
    pub text: Option<String>,

    /// New comment text, one line per flag
    #[arg(short, long)]
    pub message: Vec<String>,

    /// Send suggestion markers as written
    #[arg(long)]
    pub no_expand_suggestions: bool,
}

impl EditArgs {
    fn entry(&self) -> BatchEntry {
        let body = match &self.text {
            Some(text) => text.clone(),
            None => self.message.join("\n"),
        };
        BatchEntry {
            kind: Some(OperationKind::Edit),
            comment: Some(self.id),
            body: Some(body),
            ..BatchEntry::default()
        }
    }

    /// Execute the edit command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        run_single(ctx, self.entry()).await
    }
}

/// Resolve the review thread that contains a comment
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Id of any comment in the thread
    pub id: u64,
}

impl ResolveArgs {
    /// Execute the resolve command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let entry = BatchEntry {
            kind: Some(OperationKind::Resolve),
            comment: Some(self.id),
            resolve: Some(true),
            ..BatchEntry::default()
        };
        run_single(ctx, entry).await
    }
}

async fn run_single(ctx: &Context, entry: BatchEntry) -> anyhow::Result<()> {
    let document = BatchDocument {
        comments: vec![entry],
        ..BatchDocument::default()
    };
    let parsed = Parser::new(parse_options(ctx)).build(document);

    let options = RunOptions {
        dry_run: false,
        timeout: ctx.config.batch.timeout,
    };
    run(ctx, &parsed, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser as _;

    #[derive(clap::Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        add: AddArgs,
    }

    #[derive(clap::Parser, Debug)]
    struct EditHarness {
        #[command(flatten)]
        edit: EditArgs,
    }

    #[derive(clap::Parser, Debug)]
    struct ReactHarness {
        #[command(flatten)]
        react: ReactArgs,
    }

    fn add(args: &[&str]) -> BatchEntry {
        let harness = Harness::try_parse_from(std::iter::once("add").chain(args.iter().copied()))
            .unwrap();
        harness.add.entry().unwrap()
    }

    fn edit(args: &[&str]) -> Result<BatchEntry, clap::Error> {
        EditHarness::try_parse_from(std::iter::once("edit").chain(args.iter().copied()))
            .map(|harness| harness.edit.entry())
    }

    #[test]
    fn test_add_message_only_is_conversation_comment() {
        let entry = add(&["Looks good overall"]);
        assert_eq!(entry.comment_type, Some(CommentType::Issue));
        assert_eq!(entry.file, None);
        assert_eq!(entry.body.as_deref(), Some("Looks good overall"));
    }

    #[test]
    fn test_add_line_comment() {
        let entry = add(&["src/lib.rs", "10-12", "nit", "--left"]);
        assert_eq!(entry.file.as_deref(), Some("src/lib.rs"));
        assert_eq!(entry.range.as_deref(), Some("10-12"));
        assert_eq!(entry.side, Some(Side::Left));
        assert_eq!(entry.comment_type, Some(CommentType::Review));
    }

    #[test]
    fn test_add_two_arguments_rejected() {
        let harness = Harness::try_parse_from(["add", "src/lib.rs", "10"]).unwrap();
        assert!(harness.add.entry().is_err());
    }

    #[test]
    fn test_edit_with_positional_text() {
        let entry = edit(&["42", "Reworded"]).unwrap();
        assert_eq!(entry.kind, Some(OperationKind::Edit));
        assert_eq!(entry.comment, Some(42));
        assert_eq!(entry.body.as_deref(), Some("Reworded"));
    }

    #[test]
    fn test_edit_joins_message_flags_as_lines() {
        let entry = edit(&["42", "-m", "first", "--message", "second"]).unwrap();
        assert_eq!(entry.body.as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn test_edit_needs_exactly_one_kind_of_text() {
        assert!(edit(&["42"]).is_err());
        assert!(edit(&["42", "text", "-m", "line"]).is_err());
    }

    #[test]
    fn test_react_remove_flag() {
        let harness = ReactHarness::try_parse_from(["react", "9", "heart", "--remove"]).unwrap();
        let entry = harness.react.entry();
        assert_eq!(entry.remove, Some(true));
        assert_eq!(entry.reaction.as_deref(), Some("heart"));

        let harness = ReactHarness::try_parse_from(["react", "9", "-1"]).unwrap();
        assert_eq!(harness.react.entry().remove, None);
    }
}
