//! Grouping engine: fold a classified activity feed into display groups.
//!
//! # Joining rule
//!
//! An activity continues the current run iff, compared to the previous
//! activity:
//!
//! - both records are well formed (author and timestamp present),
//! - the author id is equal,
//! - the grouping class is equal ([`GroupKind`]: comment, work, VCS, history),
//! - the logical target is equal (the comment id for comments, the work item
//!   or change id for work/VCS, the issue itself for history),
//! - the timestamps are no further apart than the configured window.
//!
//! History activities in one run share a single group whose `events` are
//! field-merged. Comment, work and VCS groups hold exactly one activity in
//! their slot, so a run of those yields one group per activity, and every
//! group after the first in the run is flagged `merged` (header suppressed).
//!
//! Output order follows input order exactly; the engine never sorts.

use serde::Serialize;
use tracing::debug;

use super::category::{Category, GroupKind, category_of, classified};
use super::merge::merge_activities;
use crate::model::{Activity, UserRef};

/// Default window within which consecutive activities may share a group.
pub const DEFAULT_WINDOW_MS: i64 = 60_000;

/// Knobs for [`group_activities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingOptions {
    /// Maximum gap between neighbours in one run; `None` disables the check.
    pub window_ms: Option<i64>,
    /// Run the merge engine over history groups.
    pub merge_fields: bool,
    /// Flag groups containing the issue-created echo as hidden.
    pub hide_created: bool,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            window_ms: Some(DEFAULT_WINDOW_MS),
            merge_fields: true,
            hide_created: true,
        }
    }
}

/// A display-level aggregation of related activities.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityGroup {
    pub id: String,
    pub kind: GroupKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserRef>,
    /// Earliest timestamp among the group's activities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Header suppressed: this group continues the previous one.
    pub merged: bool,
    /// Not rendered at all.
    pub hidden: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Activity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Activity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work: Option<Activity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs: Option<Activity>,
}

impl ActivityGroup {
    /// All activities in display order: the special slot, then `events`.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.comment
            .iter()
            .chain(self.work.iter())
            .chain(self.vcs.iter())
            .chain(self.events.iter())
    }

    /// Number of activities the group displays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.activities().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn visible(&self) -> bool {
        !self.hidden
    }
}

/// Groups that should be rendered.
pub fn visible_groups(groups: &[ActivityGroup]) -> impl Iterator<Item = &ActivityGroup> {
    groups.iter().filter(|g| g.visible())
}

/// Group a feed. Deterministic and order-preserving; the input is not
/// modified.
#[must_use]
pub fn group_activities(activities: &[Activity], options: &GroupingOptions) -> Vec<ActivityGroup> {
    activities
        .iter()
        .map(classified)
        .fold(Fold::default(), |state, activity| state.push(activity, options))
        .finish(options)
}

#[derive(Default)]
struct Fold {
    done: Vec<ActivityGroup>,
    open: Option<OpenGroup>,
    previous: Option<Activity>,
}

struct OpenGroup {
    kind: GroupKind,
    merged: bool,
    members: Vec<Activity>,
}

impl Fold {
    fn push(self, activity: Activity, options: &GroupingOptions) -> Self {
        let Self {
            mut done,
            open,
            previous,
        } = self;

        let kind = category_of(&activity).group_kind();
        let continues = previous
            .as_ref()
            .is_some_and(|prev| joins(prev, &activity, options));

        if activity.is_malformed() {
            debug!(activity_id = %activity.id, "malformed activity kept as its own group");
        }

        let open = match open {
            Some(mut group) if continues && kind == GroupKind::History => {
                group.members.push(activity.clone());
                group
            }
            open => {
                if let Some(group) = open {
                    done.push(group.close(options));
                }
                OpenGroup {
                    kind,
                    merged: continues,
                    members: vec![activity.clone()],
                }
            }
        };

        Self {
            done,
            open: Some(open),
            previous: Some(activity),
        }
    }

    fn finish(self, options: &GroupingOptions) -> Vec<ActivityGroup> {
        let mut done = self.done;
        if let Some(group) = self.open {
            done.push(group.close(options));
        }
        done
    }
}

impl OpenGroup {
    fn close(self, options: &GroupingOptions) -> ActivityGroup {
        let first = &self.members[0];
        let hidden = options.hide_created
            && self
                .members
                .iter()
                .any(|a| category_of(a) == Category::IssueCreated);

        let mut group = ActivityGroup {
            id: first.id.clone(),
            kind: self.kind,
            author: first.author.clone(),
            timestamp: self.members.iter().filter_map(|a| a.timestamp).min(),
            merged: self.merged,
            hidden,
            events: Vec::new(),
            comment: None,
            work: None,
            vcs: None,
        };

        let mut members = self.members;
        match self.kind {
            GroupKind::Comment => group.comment = members.pop(),
            GroupKind::Work => group.work = members.pop(),
            GroupKind::Vcs => group.vcs = members.pop(),
            GroupKind::History if options.merge_fields => {
                group.events = merge_activities(&members);
            }
            GroupKind::History => group.events = members,
        }
        group
    }
}

fn joins(prev: &Activity, next: &Activity, options: &GroupingOptions) -> bool {
    if prev.is_malformed() || next.is_malformed() {
        return false;
    }

    let same_author = match (&prev.author, &next.author) {
        (Some(a), Some(b)) => a.id == b.id,
        _ => false,
    };
    if !same_author {
        return false;
    }

    let kind = category_of(prev).group_kind();
    if kind != category_of(next).group_kind() {
        return false;
    }
    if logical_target(prev, kind) != logical_target(next, kind) {
        return false;
    }

    match (options.window_ms, prev.timestamp, next.timestamp) {
        (Some(window), Some(a), Some(b)) if window > 0 => a.abs_diff(b) <= window.unsigned_abs(),
        _ => true,
    }
}

fn logical_target(activity: &Activity, kind: GroupKind) -> Option<String> {
    match kind {
        GroupKind::History => None,
        GroupKind::Comment => activity
            .target_id()
            .map(str::to_string)
            .or_else(|| activity.added_comment().map(|c| c.id)),
        GroupKind::Work | GroupKind::Vcs => activity.target_id().map(str::to_string),
    }
}
