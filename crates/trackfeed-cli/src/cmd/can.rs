//! `tfeed can`: answer permission queries for a dumped issue.

use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use trackfeed_core::model::{CurrentUser, Issue, IssueField};
use trackfeed_core::permissions::{Action, IssueActions, IssuePermissions, PermissionsStore};

use super::{fail, load_entity, read_input};
use crate::output::{CliError, OutputMode, render_error, render_mode};

#[derive(Args, Debug)]
pub struct CanArgs {
    /// Action name (e.g. `comment`, `update-field`, `tag`), or `all`.
    pub action: String,

    /// Issue JSON, including `project` and `reporter`.
    #[arg(long)]
    pub issue: PathBuf,

    /// Signed-in user JSON.
    #[arg(long)]
    pub user: PathBuf,

    /// Permission cache JSON (array of cache items).
    #[arg(long)]
    pub permissions: PathBuf,

    /// Issue field to check for `update-field`: field id, project field id, or name.
    #[arg(long)]
    pub field: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Verdict {
    pub action: String,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AllVerdicts {
    #[serde(flatten)]
    pub actions: IssueActions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_field: Option<bool>,
}

fn find_field<'a>(issue: &'a Issue, wanted: &str) -> Option<&'a IssueField> {
    issue.fields.iter().find(|f| {
        f.id == wanted
            || f.project_custom_field.id == wanted
            || f.project_custom_field.field.name == wanted
    })
}

/// Execute `tfeed can`.
///
/// # Errors
///
/// Returns an error if an input cannot be read or parsed, the action is
/// unknown, the requested field is missing, or rendering fails.
pub fn run_can(args: &CanArgs, output: OutputMode) -> anyhow::Result<()> {
    let cache = read_input(&args.permissions)?;
    let store = PermissionsStore::from_json(&cache).map_err(|err| fail(output, &err))?;
    let user: CurrentUser = load_entity(output, "user", &args.user)?;
    let issue: Issue = load_entity(output, "issue", &args.issue)?;
    debug!(grants = store.len(), issue = %issue.id, "loaded permission inputs");

    let field = match args.field.as_deref() {
        Some(wanted) => {
            if let Some(field) = find_field(&issue, wanted) {
                Some(field)
            } else {
                render_error(
                    output,
                    &CliError::with_details(
                        format!("issue has no field '{wanted}'"),
                        "pass a field id, project field id, or field name from the issue's `fields`",
                        "field_not_found",
                    ),
                )?;
                anyhow::bail!("field '{wanted}' not found");
            }
        }
        None => None,
    };

    let permissions = IssuePermissions::new(Arc::new(store), Some(user));

    if args.action == "all" {
        let verdicts = AllVerdicts {
            actions: permissions.action_set(&issue),
            update_field: field.map(|f| permissions.can_update_field(&issue, f)),
        };
        return render_mode(output, &verdicts, render_all_text, render_all_pretty);
    }

    let action: Action = args.action.parse().map_err(|err| fail(output, &err))?;
    let verdict = Verdict {
        action: action.to_string(),
        allowed: permissions.evaluate(action, &issue, field),
        field: field.map(|f| f.project_custom_field.field.name.clone()),
    };
    render_mode(
        output,
        &verdict,
        |v, w| writeln!(w, "{}\t{}", v.action, yes_no(v.allowed)),
        |v, w| writeln!(w, "{} {}", mark(v.allowed), v.action),
    )
}

const fn yes_no(allowed: bool) -> &'static str {
    if allowed { "yes" } else { "no" }
}

const fn mark(allowed: bool) -> &'static str {
    if allowed { "✓" } else { "✗" }
}

fn verdict_rows(all: &AllVerdicts) -> Vec<(&'static str, bool)> {
    let a = &all.actions;
    let mut rows = vec![
        (Action::UpdateGeneralInfo.as_str(), a.update_general_info),
        (Action::Comment.as_str(), a.comment),
        (Action::ChangeCommentVisibility.as_str(), a.change_comment_visibility),
        (Action::DeleteIssue.as_str(), a.delete_issue),
        (Action::Attach.as_str(), a.attach),
        (Action::DeleteAttachment.as_str(), a.delete_attachment),
        (Action::Link.as_str(), a.link),
        (Action::Tag.as_str(), a.tag),
        (Action::Vote.as_str(), a.vote),
        (Action::Star.as_str(), a.star),
        (Action::CreateWork.as_str(), a.create_work),
        (Action::RunCommand.as_str(), a.run_command),
    ];
    if let Some(allowed) = all.update_field {
        rows.push((Action::UpdateField.as_str(), allowed));
    }
    rows
}

fn render_all_text(all: &AllVerdicts, w: &mut dyn Write) -> std::io::Result<()> {
    for (action, allowed) in verdict_rows(all) {
        writeln!(w, "{action}\t{}", yes_no(allowed))?;
    }
    Ok(())
}

fn render_all_pretty(all: &AllVerdicts, w: &mut dyn Write) -> std::io::Result<()> {
    for (action, allowed) in verdict_rows(all) {
        writeln!(w, "{} {action}", mark(allowed))?;
    }
    Ok(())
}
