//! Pure like/dislike reconciliation.
//!
//! Given the reaction a user currently holds on a post and the one they just
//! sent, decide the next stored state and the counter deltas. Stores apply the
//! result inside their own atomic unit and clamp counters at zero.

use super::models::ReactionKind;

/// Next record state plus counter deltas for one reconciliation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReactionChange {
    pub next: Option<ReactionKind>,
    pub like_delta: i64,
    pub dislike_delta: i64,
}

/// Reconcile one incoming reaction against the current record.
///
/// No record: create one and count it. Same kind again: toggle off. Opposite
/// kind: move the record and shift one count to the other side.
pub fn reconcile(current: Option<ReactionKind>, requested: ReactionKind) -> ReactionChange {
    use ReactionKind::{Dislike, Like};
    match (current, requested) {
        (None, Like) => ReactionChange {
            next: Some(Like),
            like_delta: 1,
            dislike_delta: 0,
        },
        (None, Dislike) => ReactionChange {
            next: Some(Dislike),
            like_delta: 0,
            dislike_delta: 1,
        },
        (Some(Like), Like) => ReactionChange {
            next: None,
            like_delta: -1,
            dislike_delta: 0,
        },
        (Some(Dislike), Dislike) => ReactionChange {
            next: None,
            like_delta: 0,
            dislike_delta: -1,
        },
        (Some(Like), Dislike) => ReactionChange {
            next: Some(Dislike),
            like_delta: -1,
            dislike_delta: 1,
        },
        (Some(Dislike), Like) => ReactionChange {
            next: Some(Like),
            like_delta: 1,
            dislike_delta: -1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReactionKind::{Dislike, Like};

    #[test]
    fn first_reaction_creates_and_counts() {
        let c = reconcile(None, Like);
        assert_eq!(c.next, Some(Like));
        assert_eq!((c.like_delta, c.dislike_delta), (1, 0));

        let c = reconcile(None, Dislike);
        assert_eq!(c.next, Some(Dislike));
        assert_eq!((c.like_delta, c.dislike_delta), (0, 1));
    }

    #[test]
    fn repeating_a_reaction_toggles_it_off() {
        let c = reconcile(Some(Like), Like);
        assert_eq!(c.next, None);
        assert_eq!((c.like_delta, c.dislike_delta), (-1, 0));

        let c = reconcile(Some(Dislike), Dislike);
        assert_eq!(c.next, None);
        assert_eq!((c.like_delta, c.dislike_delta), (0, -1));
    }

    #[test]
    fn flipping_moves_one_count_across() {
        let c = reconcile(Some(Like), Dislike);
        assert_eq!(c.next, Some(Dislike));
        assert_eq!((c.like_delta, c.dislike_delta), (-1, 1));

        let c = reconcile(Some(Dislike), Like);
        assert_eq!(c.next, Some(Like));
        assert_eq!((c.like_delta, c.dislike_delta), (1, -1));
    }

    #[test]
    fn every_step_changes_at_most_one_count_per_side() {
        for current in [None, Some(Like), Some(Dislike)] {
            for requested in [Like, Dislike] {
                let c = reconcile(current, requested);
                assert!(c.like_delta.abs() <= 1);
                assert!(c.dislike_delta.abs() <= 1);
            }
        }
    }

    #[test]
    fn scenario_like_like_dislike_like() {
        // Running the sequence from a fresh state, tracking record and counters.
        let mut state: Option<ReactionKind> = None;
        let (mut likes, mut dislikes) = (0i64, 0i64);
        for step in [Like, Like, Dislike, Like] {
            let c = reconcile(state, step);
            state = c.next;
            likes = (likes + c.like_delta).max(0);
            dislikes = (dislikes + c.dislike_delta).max(0);
        }
        assert_eq!(state, Some(Like));
        assert_eq!((likes, dislikes), (1, 0));
    }
}
