//! Reaction reconciler: per-comment emoji toggle with a stable display order.
//!
//! A comment carries its reactions (at most one per author and key) and a
//! pipe-delimited `reactionOrder` listing each distinct key once, in the
//! order the first author used it. The two always describe the same key
//! set. When a comment arrives with the two out of sync, the order is
//! repaired from the reactions before any toggle is applied: stale keys are
//! dropped, missing keys are appended in reaction order.

use serde::Serialize;
use tracing::debug;

use crate::model::{CurrentUser, IssueComment, Reaction};

/// Separator between keys in `reactionOrder`.
pub const ORDER_SEPARATOR: char = '|';
const ORDER_SEPARATOR_STR: &str = "|";

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionToggle {
    Added,
    Removed,
    /// The key was empty or contained the order separator.
    Rejected,
}

/// Distinct non-empty keys of an order string, first occurrence wins.
#[must_use]
pub fn order_keys(order: &str) -> Vec<&str> {
    let mut keys: Vec<&str> = Vec::new();
    for key in order.split(ORDER_SEPARATOR).filter(|k| !k.is_empty()) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Order keys consistent with `comment.reactions`.
fn repaired_keys(comment: &IssueComment) -> Vec<String> {
    let present = |key: &str| comment.reactions.iter().any(|r| r.reaction == key);

    let mut keys: Vec<String> = order_keys(&comment.reaction_order)
        .into_iter()
        .filter(|k| present(*k))
        .map(str::to_string)
        .collect();
    for reaction in &comment.reactions {
        if reaction.reaction.is_empty() {
            continue;
        }
        if !keys.iter().any(|k| *k == reaction.reaction) {
            keys.push(reaction.reaction.clone());
        }
    }
    keys
}

/// The `reactionOrder` string consistent with the comment's reactions.
#[must_use]
pub fn repair_reaction_order(comment: &IssueComment) -> String {
    join_keys(&repaired_keys(comment))
}

fn join_keys(keys: &[String]) -> String {
    keys.join(ORDER_SEPARATOR_STR)
}

/// Toggle `key` for `user` on `comment`, returning the updated comment.
#[must_use]
pub fn toggle_reaction(comment: &IssueComment, user: &CurrentUser, key: &str) -> IssueComment {
    toggle_reaction_with_outcome(comment, user, key).0
}

/// Like [`toggle_reaction`], also reporting whether the reaction was added
/// or removed.
#[must_use]
pub fn toggle_reaction_with_outcome(
    comment: &IssueComment,
    user: &CurrentUser,
    key: &str,
) -> (IssueComment, ReactionToggle) {
    if key.is_empty() || key.contains(ORDER_SEPARATOR) {
        debug!(comment_id = %comment.id, key, "rejected reaction key");
        return (comment.clone(), ReactionToggle::Rejected);
    }

    let mut keys = repaired_keys(comment);
    if join_keys(&keys) != comment.reaction_order {
        debug!(
            comment_id = %comment.id,
            stale = %comment.reaction_order,
            "repaired reaction order"
        );
    }

    let mut reactions = comment.reactions.clone();
    let own = reactions
        .iter()
        .position(|r| r.reaction == key && user.owns(&r.author));

    let outcome = if let Some(index) = own {
        reactions.remove(index);
        if !reactions.iter().any(|r| r.reaction == key) {
            keys.retain(|k| k != key);
        }
        ReactionToggle::Removed
    } else {
        reactions.push(Reaction {
            id: None,
            reaction: key.to_string(),
            author: user.as_ref_value(),
        });
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
        ReactionToggle::Added
    };

    let updated = IssueComment {
        reactions,
        reaction_order: join_keys(&keys),
        ..comment.clone()
    };
    (updated, outcome)
}

/// `(key, count)` pairs in display order.
#[must_use]
pub fn reaction_counts(comment: &IssueComment) -> Vec<(String, usize)> {
    repaired_keys(comment)
        .into_iter()
        .map(|key| {
            let count = comment
                .reactions
                .iter()
                .filter(|r| r.reaction == key)
                .count();
            (key, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserRef;

    fn user(id: &str) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            ..CurrentUser::default()
        }
    }

    fn reaction(key: &str, ring: &str) -> Reaction {
        Reaction {
            id: Some(format!("r-{key}-{ring}")),
            reaction: key.to_string(),
            author: UserRef {
                id: format!("1-{ring}"),
                ring_id: Some(ring.to_string()),
                ..UserRef::default()
            },
        }
    }

    fn comment(reactions: Vec<Reaction>, order: &str) -> IssueComment {
        IssueComment {
            id: "c1".to_string(),
            reactions,
            reaction_order: order.to_string(),
            ..IssueComment::default()
        }
    }

    #[test]
    fn first_reaction() {
        let updated = toggle_reaction(&comment(vec![], ""), &user("u"), "heart");
        assert_eq!(updated.reactions.len(), 1);
        assert_eq!(updated.reactions[0].reaction, "heart");
        assert!(user("u").owns(&updated.reactions[0].author));
        assert_eq!(updated.reaction_order, "heart");
    }

    #[test]
    fn second_distinct_reaction_appends_to_order() {
        let start = comment(vec![reaction("life", "other")], "life");
        let updated = toggle_reaction(&start, &user("u"), "heart");
        assert_eq!(updated.reactions.len(), 2);
        assert_eq!(updated.reaction_order, "life|heart");
    }

    #[test]
    fn same_key_from_another_user_keeps_order() {
        let start = comment(vec![reaction("life", "a"), reaction("heart", "b")], "life|heart");
        let updated = toggle_reaction(&start, &user("u"), "life");
        assert_eq!(updated.reaction_order, "life|heart");
        assert_eq!(reaction_counts(&updated), [("life".to_string(), 2), ("heart".to_string(), 1)]);
    }

    #[test]
    fn removing_last_use_drops_key() {
        let start = comment(vec![reaction("life", "u"), reaction("heart", "b")], "life|heart");
        let (updated, outcome) = toggle_reaction_with_outcome(&start, &user("u"), "life");
        assert_eq!(outcome, ReactionToggle::Removed);
        assert_eq!(updated.reactions, vec![reaction("heart", "b")]);
        assert_eq!(updated.reaction_order, "heart");
    }

    #[test]
    fn removing_shared_key_keeps_it() {
        let start = comment(vec![reaction("life", "u"), reaction("life", "b")], "life");
        let updated = toggle_reaction(&start, &user("u"), "life");
        assert_eq!(updated.reactions, vec![reaction("life", "b")]);
        assert_eq!(updated.reaction_order, "life");
    }

    #[test]
    fn only_own_entry_is_removed() {
        let start = comment(vec![reaction("life", "b")], "life");
        let (updated, outcome) = toggle_reaction_with_outcome(&start, &user("u"), "life");
        assert_eq!(outcome, ReactionToggle::Added);
        assert_eq!(updated.reactions.len(), 2);
    }

    #[test]
    fn double_toggle_restores_original() {
        let start = comment(vec![reaction("life", "a"), reaction("heart", "u")], "life|heart");
        for key in ["life", "rocket"] {
            let once = toggle_reaction(&start, &user("u"), key);
            let twice = toggle_reaction(&once, &user("u"), key);
            assert_eq!(twice.reactions, start.reactions, "key {key}");
            assert_eq!(twice.reaction_order, start.reaction_order, "key {key}");
        }

        // Off then on: the server id is gone, but the visible state matches.
        let once = toggle_reaction(&start, &user("u"), "heart");
        let twice = toggle_reaction(&once, &user("u"), "heart");
        assert_eq!(twice.reaction_order, start.reaction_order);
        assert_eq!(reaction_counts(&twice), reaction_counts(&start));
    }

    #[test]
    fn input_comment_is_not_mutated() {
        let start = comment(vec![], "");
        let _ = toggle_reaction(&start, &user("u"), "heart");
        assert!(start.reactions.is_empty());
        assert!(start.reaction_order.is_empty());
    }

    #[test]
    fn stale_order_keys_are_repaired() {
        let start = comment(vec![reaction("heart", "b")], "ghost|heart|heart|");
        assert_eq!(repair_reaction_order(&start), "heart");
        let updated = toggle_reaction(&start, &user("u"), "life");
        assert_eq!(updated.reaction_order, "heart|life");
    }

    #[test]
    fn missing_order_keys_are_appended() {
        let start = comment(vec![reaction("life", "a"), reaction("heart", "b")], "heart");
        assert_eq!(repair_reaction_order(&start), "heart|life");
    }

    #[test]
    fn removed_key_is_not_resurrected_from_history() {
        let start = comment(vec![reaction("life", "u")], "life");
        let removed = toggle_reaction(&start, &user("u"), "life");
        let added = toggle_reaction(&removed, &user("u"), "heart");
        assert_eq!(added.reaction_order, "heart");
    }

    #[test]
    fn rejects_invalid_keys() {
        let start = comment(vec![], "");
        for key in ["", "a|b"] {
            let (updated, outcome) = toggle_reaction_with_outcome(&start, &user("u"), key);
            assert_eq!(outcome, ReactionToggle::Rejected);
            assert_eq!(updated, start);
        }
    }

    #[test]
    fn order_keys_dedups_and_skips_empty() {
        assert_eq!(order_keys("a||b|a|"), ["a", "b"]);
        assert!(order_keys("").is_empty());
    }
}
