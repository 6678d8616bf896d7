//! `tfeed react`: toggle the signed-in user's reaction on a dumped comment.

use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use trackfeed_core::model::{CurrentUser, IssueComment};
use trackfeed_core::reaction::{ReactionToggle, reaction_counts, toggle_reaction_with_outcome};

use super::load_entity;
use crate::output::{CliError, OutputMode, pretty_kv, render_error, render_mode};

#[derive(Args, Debug)]
pub struct ReactArgs {
    /// Comment JSON with `reactions` and `reactionOrder`.
    pub comment: PathBuf,

    /// Signed-in user JSON.
    #[arg(long)]
    pub user: PathBuf,

    /// Reaction key, e.g. `heart`.
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct ReactOutcome {
    pub outcome: ReactionToggle,
    pub counts: Vec<ReactionCount>,
    pub comment: IssueComment,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ReactionCount {
    pub reaction: String,
    pub count: usize,
}

/// Execute `tfeed react`.
///
/// # Errors
///
/// Returns an error if an input cannot be read or parsed, the key is not a
/// valid reaction key, or rendering fails.
pub fn run_react(args: &ReactArgs, output: OutputMode) -> anyhow::Result<()> {
    let comment: IssueComment = load_entity(output, "comment", &args.comment)?;
    let user: CurrentUser = load_entity(output, "user", &args.user)?;

    let (comment, outcome) = toggle_reaction_with_outcome(&comment, &user, &args.key);
    if outcome == ReactionToggle::Rejected {
        render_error(
            output,
            &CliError::with_details(
                format!("invalid reaction key '{}'", args.key),
                "use a non-empty key without '|'",
                "invalid_reaction_key",
            ),
        )?;
        anyhow::bail!("invalid reaction key '{}'", args.key);
    }

    let counts = reaction_counts(&comment)
        .into_iter()
        .map(|(reaction, count)| ReactionCount { reaction, count })
        .collect();
    let result = ReactOutcome {
        outcome,
        counts,
        comment,
    };

    render_mode(output, &result, render_text, render_pretty)
}

fn outcome_name(outcome: ReactionToggle) -> &'static str {
    match outcome {
        ReactionToggle::Added => "added",
        ReactionToggle::Removed => "removed",
        ReactionToggle::Rejected => "rejected",
    }
}

fn render_text(result: &ReactOutcome, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}\t{}", outcome_name(result.outcome), result.comment.reaction_order)?;
    for count in &result.counts {
        writeln!(w, "{}\t{}", count.reaction, count.count)?;
    }
    Ok(())
}

fn render_pretty(result: &ReactOutcome, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_kv(w, "comment", &result.comment.id)?;
    pretty_kv(w, "outcome", outcome_name(result.outcome))?;
    let summary = result
        .counts
        .iter()
        .map(|c| format!("{} {}", c.reaction, c.count))
        .collect::<Vec<_>>()
        .join("  ");
    pretty_kv(w, "reactions", if summary.is_empty() { "none".to_string() } else { summary })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_lists_order_then_counts() {
        let result = ReactOutcome {
            outcome: ReactionToggle::Added,
            counts: vec![
                ReactionCount {
                    reaction: "life".to_string(),
                    count: 2,
                },
                ReactionCount {
                    reaction: "heart".to_string(),
                    count: 1,
                },
            ],
            comment: IssueComment {
                reaction_order: "life|heart".to_string(),
                ..IssueComment::default()
            },
        };
        let mut buf = Vec::new();
        render_text(&result, &mut buf).expect("render");
        assert_eq!(
            String::from_utf8(buf).expect("utf8"),
            "added\tlife|heart\nlife\t2\nheart\t1\n"
        );
    }

    #[test]
    fn pretty_handles_no_reactions() {
        let result = ReactOutcome {
            outcome: ReactionToggle::Removed,
            counts: Vec::new(),
            comment: IssueComment {
                id: "4-1".to_string(),
                ..IssueComment::default()
            },
        };
        let mut buf = Vec::new();
        render_pretty(&result, &mut buf).expect("render");
        let out = String::from_utf8(buf).expect("utf8");
        assert!(out.contains("removed"));
        assert!(out.contains("none"));
    }
}
