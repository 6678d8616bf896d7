use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use trackfeed_core::model::IssueComment;
use trackfeed_core::reaction::{
    order_keys, reaction_counts, repair_reaction_order, toggle_reaction,
};

use generators::*;

fn order_set(comment: &IssueComment) -> BTreeSet<String> {
    order_keys(&comment.reaction_order)
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn reaction_set(comment: &IssueComment) -> BTreeSet<String> {
    comment.reactions.iter().map(|r| r.reaction.clone()).collect()
}

fn counts(comment: &IssueComment) -> BTreeMap<String, usize> {
    reaction_counts(comment).into_iter().collect()
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(1024))]

    #[test]
    fn order_matches_reactions_after_every_toggle(start in arb_comment(), toggles in arb_toggles()) {
        let mut comment = start;
        for (author, key) in toggles {
            comment = toggle_reaction(&comment, &current_user(author), key);
            prop_assert_eq!(order_set(&comment), reaction_set(&comment));

            let keys = order_keys(&comment.reaction_order);
            let distinct: BTreeSet<&str> = keys.iter().copied().collect();
            prop_assert_eq!(keys.len(), distinct.len());
            prop_assert_eq!(comment.reaction_order.split('|').filter(|k| !k.is_empty()).count(), keys.len());
        }
    }

    #[test]
    fn at_most_one_reaction_per_user_and_key(start in arb_comment(), toggles in arb_toggles()) {
        let mut comment = start;
        for (author, key) in toggles {
            comment = toggle_reaction(&comment, &current_user(author), key);
        }
        let mut seen = BTreeSet::new();
        for reaction in &comment.reactions {
            let owner = reaction.author.ring_id.clone().unwrap_or_default();
            prop_assert!(seen.insert((owner, reaction.reaction.clone())));
        }
    }

    #[test]
    fn add_then_remove_restores_the_comment(
        start in arb_comment(),
        author in prop::sample::select(AUTHORS.to_vec()),
        key in prop::sample::select(REACTION_KEYS.to_vec()),
    ) {
        let user = current_user(author);
        prop_assume!(!start.reactions.iter().any(|r| r.reaction == key && user.owns(&r.author)));

        let twice = toggle_reaction(&toggle_reaction(&start, &user, key), &user, key);
        prop_assert_eq!(&twice.reactions, &start.reactions);
        prop_assert_eq!(twice.reaction_order, repair_reaction_order(&start));
    }

    #[test]
    fn remove_then_add_restores_visible_counts(
        start in arb_comment(),
        author in prop::sample::select(AUTHORS.to_vec()),
        key in prop::sample::select(REACTION_KEYS.to_vec()),
    ) {
        let user = current_user(author);
        prop_assume!(start.reactions.iter().any(|r| r.reaction == key && user.owns(&r.author)));

        let twice = toggle_reaction(&toggle_reaction(&start, &user, key), &user, key);
        prop_assert_eq!(counts(&twice), counts(&start));
        prop_assert_eq!(order_set(&twice), reaction_set(&start));
    }

    #[test]
    fn toggles_never_touch_other_users_entries(
        start in arb_comment(),
        author in prop::sample::select(AUTHORS.to_vec()),
        key in prop::sample::select(REACTION_KEYS.to_vec()),
    ) {
        let user = current_user(author);
        let updated = toggle_reaction(&start, &user, key);
        for reaction in start.reactions.iter().filter(|r| !user.owns(&r.author)) {
            prop_assert!(updated.reactions.contains(reaction));
        }
    }
}
