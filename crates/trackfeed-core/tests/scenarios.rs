//! End-to-end scenarios over backend-shaped JSON payloads.

use std::sync::Arc;

use serde_json::json;
use trackfeed_core::activity::{
    Category, CategoryFilter, FeedOrder, GroupKind, GroupingOptions, filter_activities, reconcile,
    sort_feed, visible_groups,
};
use trackfeed_core::model::{ActivityPage, CurrentUser, Issue, IssueComment, IssueField};
use trackfeed_core::permissions::{Action, IssuePermissions, PermissionsStore};
use trackfeed_core::reaction::{ReactionToggle, toggle_reaction, toggle_reaction_with_outcome};

const T: i64 = 1_700_000_000_000;

fn page() -> ActivityPage {
    let body = json!({
        "activities": [
            {
                "id": "a1", "$type": "CustomFieldActivityItem", "timestamp": T,
                "author": {"id": "1-5", "ringId": "ring-5", "login": "ann"},
                "targetMember": "__CUSTOM_FIELD__Priority_3",
                "field": {"id": "Priority", "presentation": "Priority"},
                "removed": [{"name": "Normal"}], "added": [{"name": "Major"}]
            },
            {
                "id": "a2", "$type": "CustomFieldActivityItem", "timestamp": T + 1,
                "author": {"id": "1-5", "ringId": "ring-5", "login": "ann"},
                "targetMember": "__CUSTOM_FIELD__Priority_3",
                "field": {"id": "Priority", "presentation": "Priority"},
                "removed": [{"name": "Major"}], "added": [{"name": "Critical"}]
            },
            {
                "id": "a3", "$type": "CommentActivityItem", "timestamp": T + 2,
                "author": {"id": "1-5", "ringId": "ring-5", "login": "ann"},
                "targetMember": "comments",
                "target": {"id": "4-1", "$type": "IssueComment"},
                "added": [{"id": "4-1", "text": "bumped priority"}]
            }
        ],
        "afterCursor": "cursor-1",
        "hasAfter": true
    });
    ActivityPage::from_json(&body.to_string()).expect("page should parse")
}

#[test]
fn history_then_comment_scenario() {
    let page = page();
    assert!(page.has_after);
    assert_eq!(page.after_cursor.as_deref(), Some("cursor-1"));

    let groups = reconcile(&page.activities, &GroupingOptions::default());
    assert_eq!(groups.len(), 2);

    let history = &groups[0];
    assert_eq!(history.kind, GroupKind::History);
    assert!(!history.merged);
    assert_eq!(history.timestamp, Some(T));
    assert_eq!(history.events.len(), 1);
    assert_eq!(history.events[0].removed, json!([{"name": "Normal"}]));
    assert_eq!(history.events[0].added, json!([{"name": "Critical"}]));

    let comment = &groups[1];
    assert_eq!(comment.kind, GroupKind::Comment);
    assert!(!comment.merged);
    assert_eq!(
        comment.comment.as_ref().and_then(|a| a.added_comment()).map(|c| c.text),
        Some("bumped priority".to_string())
    );
}

#[test]
fn newest_first_feed_still_groups() {
    let sorted = sort_feed(&page().activities, FeedOrder::NewestFirst);
    assert_eq!(sorted[0].id, "a3");

    let groups = reconcile(&sorted, &GroupingOptions::default());
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].kind, GroupKind::Comment);
    assert_eq!(groups[1].events.len(), 1);
    assert_eq!(groups[1].events[0].id, "a2");
}

#[test]
fn hidden_categories_and_issue_created_echo() {
    let mut activities = page().activities;
    let created = serde_json::from_value(json!({
        "id": "a0", "$type": "IssueCreatedActivityItem", "timestamp": T - 1,
        "author": {"id": "1-5", "ringId": "ring-5"}
    }))
    .expect("activity should parse");
    activities.insert(0, created);

    let filter = CategoryFilter::parse(&["comment"]).expect("valid filter");
    let filtered = filter_activities(&activities, &filter);
    assert_eq!(filtered.len(), 2);

    let groups = reconcile(&filtered, &GroupingOptions::default());
    let visible: Vec<_> = visible_groups(&groups).collect();
    assert_eq!(visible.len(), 1);
    assert_eq!(
        visible[0].comment.as_ref().and_then(|a| a.category),
        Some(Category::Comment)
    );
}

#[test]
fn deny_by_default_on_empty_store() {
    let issue: Issue = serde_json::from_value(json!({
        "id": "2-7",
        "idReadable": "TF-7",
        "project": {"id": "0-1", "shortName": "TF"},
        "reporter": {"id": "1-9", "ringId": "ring-9"}
    }))
    .expect("issue should parse");
    let public: IssueField = serde_json::from_value(json!({
        "id": "f1",
        "projectCustomField": {"id": "pcf-1", "isPublic": true, "field": {"id": "d1", "name": "Priority"}}
    }))
    .expect("field should parse");
    let private = IssueField {
        project_custom_field: trackfeed_core::model::ProjectCustomField {
            is_public: false,
            ..public.project_custom_field.clone()
        },
        ..public.clone()
    };

    let perms = IssuePermissions::new(
        Arc::new(PermissionsStore::from_json("[]").expect("empty cache")),
        Some(CurrentUser {
            id: "ring-me".to_string(),
            ..CurrentUser::default()
        }),
    );

    assert!(!perms.can_update_field(&issue, &public));
    assert!(!perms.can_update_field(&issue, &private));
    for action in Action::ALL {
        let expected = matches!(action, Action::Vote | Action::Star);
        assert_eq!(perms.evaluate(action, &issue, Some(&public)), expected, "{action}");
    }
}

#[test]
fn reaction_scenarios() {
    let me = CurrentUser {
        id: "ring-me".to_string(),
        ..CurrentUser::default()
    };

    let empty: IssueComment =
        serde_json::from_value(json!({"id": "4-1", "reactions": [], "reactionOrder": ""}))
            .expect("comment should parse");
    let first = toggle_reaction(&empty, &me, "heart");
    assert_eq!(first.reaction_order, "heart");
    assert_eq!(first.reactions.len(), 1);
    assert!(me.owns(&first.reactions[0].author));

    let with_life: IssueComment = serde_json::from_value(json!({
        "id": "4-2",
        "reactions": [{"id": "r1", "reaction": "life", "author": {"id": "1-3", "ringId": "ring-3"}}],
        "reactionOrder": "life"
    }))
    .expect("comment should parse");
    let (second, outcome) = toggle_reaction_with_outcome(&with_life, &me, "heart");
    assert_eq!(outcome, ReactionToggle::Added);
    assert_eq!(second.reactions.len(), 2);
    assert_eq!(second.reaction_order, "life|heart");
}
