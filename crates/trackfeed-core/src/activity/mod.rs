//! Activity reconciliation: classify → group → merge.
//!
//! The host fetches a page of raw activities, sorts it into its display
//! order with [`sort_feed`], optionally drops categories the user has hidden
//! with [`filter_activities`], and hands the result to [`reconcile`].
//!
//! Fetch sequencing is the host's job. When a slow initial load races a
//! faster reload, the host must discard the stale page before calling in
//! here; nothing in this module can tell two pages apart.

pub mod category;
pub mod group;
pub mod merge;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use category::{Category, CategoryFilter, FieldKind, GroupKind, classify};
pub use group::{ActivityGroup, GroupingOptions, group_activities, visible_groups};
pub use merge::merge_activities;

use crate::model::Activity;

/// Display order of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

/// Stable sort by timestamp. Records without a timestamp keep their relative
/// order and go last.
#[must_use]
pub fn sort_feed(activities: &[Activity], order: FeedOrder) -> Vec<Activity> {
    let mut sorted = activities.to_vec();
    sorted.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (Some(x), Some(y)) => match order {
            FeedOrder::OldestFirst => x.cmp(&y),
            FeedOrder::NewestFirst => y.cmp(&x),
        },
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    sorted
}

/// Drop activities whose category the filter does not allow.
#[must_use]
pub fn filter_activities(activities: &[Activity], filter: &CategoryFilter) -> Vec<Activity> {
    activities
        .iter()
        .filter(|a| filter.allows(category::category_of(a)))
        .cloned()
        .collect()
}

/// Run the full pipeline over an already ordered feed.
#[must_use]
pub fn reconcile(activities: &[Activity], options: &GroupingOptions) -> Vec<ActivityGroup> {
    let groups = group_activities(activities, options);
    debug!(
        activities = activities.len(),
        groups = groups.len(),
        hidden = groups.iter().filter(|g| g.hidden).count(),
        "reconciled activity feed"
    );
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(id: &str, ts: Option<i64>) -> Activity {
        Activity {
            id: id.to_string(),
            timestamp: ts,
            ..Activity::default()
        }
    }

    fn ids(activities: &[Activity]) -> Vec<&str> {
        activities.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn sort_oldest_and_newest_first() {
        let feed = [at("b", Some(2)), at("a", Some(1)), at("c", Some(3))];
        assert_eq!(ids(&sort_feed(&feed, FeedOrder::OldestFirst)), ["a", "b", "c"]);
        assert_eq!(ids(&sort_feed(&feed, FeedOrder::NewestFirst)), ["c", "b", "a"]);
    }

    #[test]
    fn sort_is_stable_and_puts_missing_timestamps_last() {
        let feed = [at("x", None), at("a", Some(1)), at("b", Some(1)), at("y", None)];
        assert_eq!(ids(&sort_feed(&feed, FeedOrder::OldestFirst)), ["a", "b", "x", "y"]);
    }

    #[test]
    fn filter_keeps_selected_categories() {
        let mut comment = at("c", Some(1));
        comment.type_tag = Some("CommentActivityItem".to_string());
        let mut vcs = at("v", Some(2));
        vcs.type_tag = Some("VcsChangeActivityItem".to_string());

        let filter = CategoryFilter::parse(&["comment"]).expect("valid filter");
        assert_eq!(ids(&filter_activities(&[comment, vcs], &filter)), ["c"]);
    }
}
