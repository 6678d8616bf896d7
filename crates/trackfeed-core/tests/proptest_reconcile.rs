use proptest::prelude::*;
use trackfeed_core::activity::category::category_of;
use trackfeed_core::activity::{
    Category, GroupKind, GroupingOptions, group_activities, merge_activities,
};
use trackfeed_core::model::Activity;

use generators::*;

fn unmerged() -> GroupingOptions {
    GroupingOptions {
        merge_fields: false,
        ..GroupingOptions::default()
    }
}

fn ids<'a>(activities: impl Iterator<Item = &'a Activity>) -> Vec<String> {
    activities.map(|a| a.id.clone()).collect()
}

fn is_subsequence(needle: &[String], haystack: &[String]) -> bool {
    let mut rest = haystack.iter();
    needle.iter().all(|n| rest.any(|h| h == n))
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn grouping_without_merge_preserves_every_activity_in_order(feed in arb_feed(40)) {
        let groups = group_activities(&feed, &unmerged());
        let flattened = ids(groups.iter().flat_map(|g| g.activities()));
        prop_assert_eq!(flattened, ids(feed.iter()));
    }

    #[test]
    fn grouping_with_merge_only_drops_folded_field_changes(feed in arb_feed(40)) {
        let groups = group_activities(&feed, &GroupingOptions::default());
        let flattened = ids(groups.iter().flat_map(|g| g.activities()));
        let input = ids(feed.iter());
        prop_assert!(is_subsequence(&flattened, &input));

        // Records that are never merge candidates all survive.
        for activity in &feed {
            let category = category_of(activity);
            if !category.is_mergeable() {
                prop_assert!(flattened.contains(&activity.id), "lost {}", activity.id);
            }
        }
    }

    #[test]
    fn grouping_is_deterministic_and_leaves_input_alone(feed in arb_feed(30)) {
        let before = feed.clone();
        let first = group_activities(&feed, &GroupingOptions::default());
        let second = group_activities(&feed, &GroupingOptions::default());
        prop_assert_eq!(first, second);
        prop_assert_eq!(feed, before);
    }

    #[test]
    fn merge_is_idempotent_on_group_events(feed in arb_feed(40)) {
        for group in group_activities(&feed, &GroupingOptions::default()) {
            prop_assert_eq!(merge_activities(&group.events), group.events);
        }
    }

    #[test]
    fn merge_is_idempotent_on_arbitrary_lists(feed in arb_feed(30)) {
        let once = merge_activities(&feed);
        let twice = merge_activities(&once);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn special_groups_hold_exactly_one_activity(feed in arb_feed(40)) {
        for group in group_activities(&feed, &unmerged()) {
            match group.kind {
                GroupKind::Comment => {
                    prop_assert!(group.comment.is_some());
                    prop_assert_eq!(group.len(), 1);
                }
                GroupKind::Work => {
                    prop_assert!(group.work.is_some());
                    prop_assert_eq!(group.len(), 1);
                }
                GroupKind::Vcs => {
                    prop_assert!(group.vcs.is_some());
                    prop_assert_eq!(group.len(), 1);
                }
                GroupKind::History => {
                    prop_assert!(!group.events.is_empty());
                    prop_assert!(group.comment.is_none() && group.work.is_none() && group.vcs.is_none());
                }
            }
        }
    }

    #[test]
    fn malformed_activities_stand_alone(feed in arb_feed(40)) {
        let groups = group_activities(&feed, &unmerged());
        for (index, group) in groups.iter().enumerate() {
            if group.activities().any(Activity::is_malformed) {
                prop_assert_eq!(group.len(), 1);
                prop_assert!(!group.merged);
                if let Some(next) = groups.get(index + 1) {
                    prop_assert!(!next.merged);
                }
            }
        }
    }

    #[test]
    fn group_header_comes_from_first_member(feed in arb_feed(40)) {
        for group in group_activities(&feed, &unmerged()) {
            let members: Vec<&Activity> = group.activities().collect();
            prop_assert_eq!(&group.id, &members[0].id);
            prop_assert_eq!(&group.author, &members[0].author);
            prop_assert_eq!(group.timestamp, members.iter().filter_map(|a| a.timestamp).min());
        }
    }

    #[test]
    fn nothing_is_hidden_without_an_issue_created_echo(feed in arb_feed(40)) {
        prop_assume!(feed.iter().all(|a| category_of(a) != Category::IssueCreated));
        let groups = group_activities(&feed, &GroupingOptions::default());
        prop_assert!(groups.iter().all(|g| !g.hidden));
    }

    #[test]
    fn unbounded_window_never_splits_more_than_default(feed in arb_feed(40)) {
        let unbounded = GroupingOptions { window_ms: None, ..unmerged() };
        let windowed = unmerged();
        let a = group_activities(&feed, &unbounded);
        let b = group_activities(&feed, &windowed);
        prop_assert!(a.len() <= b.len());
    }
}
