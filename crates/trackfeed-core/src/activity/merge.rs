//! Merge engine: collapse same-field activities inside one group into a
//! single net change.
//!
//! Scalar fields keep the first removed value and the last added value, so
//! intermediate toggles vanish. Collection-valued changes (tags, links,
//! multi-value fields, ...) keep the net item sets: an item added and later
//! removed within the burst cancels out, as does one removed and re-added.
//!
//! The merged record sits at the position of the first activity for that
//! field and keeps its id and the earliest timestamp, so `events` stay in
//! time order. Input is
//! never mutated, and merging an already merged list changes nothing.

use serde_json::Value;
use std::collections::HashMap;
use tracing::trace;

use super::category::{Category, FieldKind, category_of};
use crate::model::Activity;
use crate::model::activity::{payload_item_key, payload_items};

/// Identity of the field an activity changes, or `None` when it is not a
/// merge candidate.
#[must_use]
pub fn field_identity(activity: &Activity, category: Category) -> Option<String> {
    if !category.is_mergeable() {
        return None;
    }
    let field_id = || {
        activity
            .field
            .as_ref()
            .and_then(|f| {
                f.custom_field
                    .as_ref()
                    .and_then(|cf| cf.id.clone())
                    .or_else(|| f.id.clone())
                    .or_else(|| f.presentation.clone())
            })
            .or_else(|| activity.target_member.clone())
    };

    match category {
        Category::Field(
            kind @ (FieldKind::Summary
            | FieldKind::Description
            | FieldKind::Project
            | FieldKind::Resolved
            | FieldKind::Sprint),
        ) => Some(format!("builtin:{kind:?}")),
        Category::Field(_) => field_id().map(|id| format!("field:{id}")),
        Category::Link => Some(format!("link:{}", field_id().unwrap_or_default())),
        Category::Visibility => Some(format!("visibility:{}", field_id().unwrap_or_default())),
        Category::Vote => Some(format!(
            "vote:{}",
            activity.type_tag.as_deref().unwrap_or_default()
        )),
        Category::AttachmentRename => activity.target_id().map(|id| format!("rename:{id}")),
        Category::Tag | Category::Attachment | Category::Star => Some(category.key().to_string()),
        Category::Comment
        | Category::Vcs
        | Category::Work
        | Category::IssueCreated
        | Category::Unrecognized => None,
    }
}

/// Merge same-field activities in `events`, preserving chronological order.
#[must_use]
pub fn merge_activities(events: &[Activity]) -> Vec<Activity> {
    let mut merged: Vec<Activity> = Vec::with_capacity(events.len());
    let mut slots: HashMap<String, usize> = HashMap::new();

    for event in events {
        let category = category_of(event);
        let Some(identity) = field_identity(event, category) else {
            merged.push(event.clone());
            continue;
        };

        if let Some(&index) = slots.get(&identity) {
            trace!(
                into = %merged[index].id,
                from = %event.id,
                field = %identity,
                "merging field change"
            );
            merged[index] = combine(&merged[index], event, category);
        } else {
            slots.insert(identity, merged.len());
            merged.push(event.clone());
        }
    }

    merged
}

fn combine(earlier: &Activity, later: &Activity, category: Category) -> Activity {
    let mut result = earlier.clone();
    result.timestamp = match (earlier.timestamp, later.timestamp) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };

    if category.is_collection() {
        let (removed, added) = net_items(earlier, later);
        result.removed = rebuild_payload(removed, &earlier.removed, &later.removed);
        result.added = rebuild_payload(added, &earlier.added, &later.added);
    } else {
        result.added = later.added.clone();
    }

    result
}

/// Fold `later` into the net (removed, added) sets of `earlier`.
fn net_items(earlier: &Activity, later: &Activity) -> (Vec<Value>, Vec<Value>) {
    let mut removed: Vec<Value> = earlier.removed_items().into_iter().cloned().collect();
    let mut added: Vec<Value> = earlier.added_items().into_iter().cloned().collect();

    for item in later.removed_items() {
        let key = payload_item_key(item);
        if let Some(pos) = added.iter().position(|a| payload_item_key(a) == key) {
            added.remove(pos);
        } else if !removed.iter().any(|r| payload_item_key(r) == key) {
            removed.push(item.clone());
        }
    }

    for item in later.added_items() {
        let key = payload_item_key(item);
        if let Some(pos) = removed.iter().position(|r| payload_item_key(r) == key) {
            removed.remove(pos);
        } else if !added.iter().any(|a| payload_item_key(a) == key) {
            added.push(item.clone());
        }
    }

    (removed, added)
}

/// Keep the wire shape: arrays stay arrays, scalar payloads stay scalar when
/// at most one item survives.
fn rebuild_payload(items: Vec<Value>, first: &Value, second: &Value) -> Value {
    let was_array = first.is_array() || second.is_array();
    if was_array || items.len() > 1 {
        return Value::Array(items);
    }
    items.into_iter().next().unwrap_or(Value::Null)
}
