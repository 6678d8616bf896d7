//! `tfeed activity`: reconcile a dumped activity page into display groups.
//!
//! The page is sorted and filtered according to the project config, then
//! grouped and merged. Flags override the `[grouping]` section.

use chrono::{DateTime, Local, Utc};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use trackfeed_core::activity::category::category_of;
use trackfeed_core::activity::{
    ActivityGroup, GroupingOptions, filter_activities, reconcile, sort_feed,
};
use trackfeed_core::config::FeedConfig;
use trackfeed_core::model::{Activity, ActivityPage};

use super::{fail, read_input};
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ActivityArgs {
    /// Activity page JSON (object with `activities`, or a bare array).
    pub page: PathBuf,

    /// Grouping window in milliseconds; 0 disables it.
    #[arg(long)]
    pub window_ms: Option<i64>,

    /// Keep every field change instead of merging bursts.
    #[arg(long)]
    pub no_merge: bool,

    /// Include groups that are normally hidden.
    #[arg(long)]
    pub show_hidden: bool,
}

#[derive(Debug, Serialize)]
pub struct ActivityReport {
    pub activities: usize,
    pub hidden: usize,
    pub has_after: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_cursor: Option<String>,
    pub groups: Vec<ActivityGroup>,
}

fn options(args: &ActivityArgs, config: &FeedConfig) -> GroupingOptions {
    let mut options = config.grouping_options();
    if let Some(window) = args.window_ms {
        options.window_ms = (window > 0).then_some(window);
    }
    if args.no_merge {
        options.merge_fields = false;
    }
    options
}

/// Execute `tfeed activity`.
///
/// # Errors
///
/// Returns an error if the page cannot be read or parsed, if the config names
/// an unknown category, or if rendering fails.
pub fn run_activity(
    args: &ActivityArgs,
    config: &FeedConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let body = read_input(&args.page)?;
    let page = ActivityPage::from_json(&body).map_err(|err| fail(output, &err))?;
    let filter = config.category_filter().map_err(|err| fail(output, &err))?;

    let feed = sort_feed(&filter_activities(&page.activities, &filter), config.feed.order);
    let groups = reconcile(&feed, &options(args, config));
    let hidden = groups.iter().filter(|g| g.hidden).count();

    let report = ActivityReport {
        activities: page.activities.len(),
        hidden,
        has_after: page.has_after,
        after_cursor: page.after_cursor,
        groups: groups
            .into_iter()
            .filter(|g| args.show_hidden || g.visible())
            .collect(),
    };

    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &ActivityReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "group\tkind\tauthor\ttimestamp\tevents\tmerged\thidden")?;
    for group in &report.groups {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            group.id,
            group.kind.as_str(),
            group.author.as_ref().map_or("-", |a| a.display_name()),
            group.timestamp.map_or_else(|| "-".to_string(), |t| t.to_string()),
            group.len(),
            group.merged,
            group.hidden,
        )?;
    }
    Ok(())
}

fn render_pretty(report: &ActivityReport, w: &mut dyn Write) -> std::io::Result<()> {
    for group in &report.groups {
        if !group.merged {
            let author = group.author.as_ref().map_or("unknown", |a| a.display_name());
            let when = group.timestamp.map_or_else(|| "unknown time".to_string(), local_time);
            let hidden = if group.hidden { "  (hidden)" } else { "" };
            writeln!(w)?;
            pretty_section(w, &format!("{author}  {when}{hidden}"))?;
        }
        for activity in group.activities() {
            writeln!(w, "  {}", describe(activity))?;
        }
    }
    pretty_rule(w)?;
    pretty_kv(w, "activities", report.activities.to_string())?;
    pretty_kv(w, "groups", report.groups.len().to_string())?;
    if report.hidden > 0 {
        pretty_kv(w, "hidden", report.hidden.to_string())?;
    }
    if report.has_after {
        pretty_kv(w, "more", report.after_cursor.as_deref().unwrap_or("yes"))?;
    }
    Ok(())
}

fn local_time(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// One-line summary of an activity: category, field and the change.
fn describe(activity: &Activity) -> String {
    let category = category_of(activity);
    let field = activity
        .field
        .as_ref()
        .and_then(|f| f.presentation.as_deref())
        .or(activity.target_member.as_deref())
        .unwrap_or("");
    let removed = labels(&activity.removed);
    let added = labels(&activity.added);

    let change = match (removed.is_empty(), added.is_empty()) {
        (true, true) => String::new(),
        (true, false) => format!("+{added}"),
        (false, true) => format!("-{removed}"),
        (false, false) => format!("{removed} -> {added}"),
    };
    [category.to_string(), field.to_string(), change]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("  ")
}

fn labels(payload: &Value) -> String {
    trackfeed_core::model::activity::payload_items(payload)
        .into_iter()
        .map(label)
        .collect::<Vec<_>>()
        .join(", ")
}

fn label(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(map) => ["presentation", "name", "text", "login", "id"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map_or_else(|| item.to_string(), str::to_string),
        other => other.to_string(),
    }
}
