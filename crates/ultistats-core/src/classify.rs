// Point classification: pure predicates over a single point.

use crate::possession::{player_count, possession_unbroken, touched, ANONYMOUS};
use crate::segment::Point;
use serde::Serialize;
use std::collections::BTreeSet;

/// Flags computed for one point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PointClass {
    pub all_touch: bool,
    pub perfect_score: bool,
    pub turnover_free: bool,
}

pub fn classify(point: &Point<'_>) -> PointClass {
    PointClass {
        all_touch: is_all_touch(point),
        perfect_score: is_perfect_score(point),
        turnover_free: is_turnover_free(point),
    }
}

/// Every player on the line touched the disc during the point. A point with
/// no full-point players is never all-touch.
pub fn is_all_touch(point: &Point<'_>) -> bool {
    let n = player_count(point);
    n > 0 && touched(point).len() == n
}

/// The scoring sequence involved every remaining player exactly once.
///
/// With `n` players on the line, the last `n - 1` events must have `n - 1`
/// distinct passers and `n - 1` distinct receivers. Lines of one player (or
/// none) never qualify.
pub fn is_perfect_score(point: &Point<'_>) -> bool {
    let n = player_count(point);
    if n < 2 {
        return false;
    }
    let touches = n - 1;
    let events = point.events();
    let tail = &events[events.len().saturating_sub(touches)..];

    let passers: BTreeSet<&str> = tail.iter().filter_map(|e| named(e.passer.as_deref())).collect();
    let receivers: BTreeSet<&str> = tail
        .iter()
        .filter_map(|e| named(e.receiver.as_deref()))
        .collect();

    passers.len() == touches && receivers.len() == touches
}

fn named(name: Option<&str>) -> Option<&str> {
    name.filter(|n| *n != ANONYMOUS)
}

/// The team never lost the disc once it had it.
pub fn is_turnover_free(point: &Point<'_>) -> bool {
    possession_unbroken(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTable;
    use crate::fixtures::*;
    use crate::possession::player_count;

    fn first_point(table: &EventTable) -> Point<'_> {
        table.points().next().unwrap().unwrap()
    }

    #[test]
    fn two_player_point_is_all_touch_perfect_and_turnover_free() {
        let table = table(vec![point(
            (1, 0),
            &["A", "B"],
            vec![catch("A", "B"), goal("B", "A")],
        )]);
        let point = first_point(&table);

        assert_eq!(player_count(&point), 2);
        assert_eq!(
            classify(&point),
            PointClass {
                all_touch: true,
                perfect_score: true,
                turnover_free: true,
            }
        );
    }

    #[test]
    fn all_touch_requires_every_player() {
        let table = table(vec![point(
            (1, 0),
            &["A", "B", "C", "D"],
            vec![catch("A", "B"), catch("B", "C"), goal("C", "B")],
        )]);
        let point = first_point(&table);
        assert!(!is_all_touch(&point));
    }

    #[test]
    fn all_touch_implies_touch_count_matches_line() {
        let table = table(vec![point(
            (1, 0),
            &["A", "B", "C"],
            vec![catch("A", "B"), catch("B", "A"), catch("A", "B"), goal("B", "C")],
        )]);
        let point = first_point(&table);
        assert!(is_all_touch(&point));
        assert_eq!(touched(&point).len(), player_count(&point));
        assert!(player_count(&point) >= 1);
        // Tail of two events: passers {A, B}, receivers {B, C}.
        assert!(is_perfect_score(&point));
    }

    #[test]
    fn repeated_thrower_in_tail_is_not_perfect() {
        let table = table(vec![point(
            (1, 0),
            &["A", "B", "C"],
            vec![catch("C", "A"), catch("A", "B"), catch("B", "B"), goal("B", "C")],
        )]);
        let point = first_point(&table);
        // Tail passers {B}: B threw twice.
        assert!(!is_perfect_score(&point));
    }

    #[test]
    fn perfect_score_ignores_anonymous() {
        let table = table(vec![point(
            (1, 0),
            &["A", "B", "C"],
            vec![catch(ANONYMOUS, "B"), goal("B", "C")],
        )]);
        let point = first_point(&table);
        assert!(!is_perfect_score(&point));
    }

    #[test]
    fn one_player_line_is_never_perfect() {
        let table = table(vec![point((1, 0), &["A"], vec![goal("A", "A")])]);
        let point = first_point(&table);
        assert!(!is_perfect_score(&point));
    }

    #[test]
    fn perfect_tail_longer_than_point_uses_whole_point() {
        let table = table(vec![point(
            (1, 0),
            &["A", "B", "C", "D"],
            vec![goal("A", "B")],
        )]);
        let point = first_point(&table);
        assert!(!is_perfect_score(&point));
    }

    #[test]
    fn empty_line_is_not_all_touch() {
        let table = table(vec![point((0, 1), &[], vec![their_goal()])]);
        let point = first_point(&table);
        assert_eq!(player_count(&point), 0);
        assert!(!is_all_touch(&point));
    }

    #[test]
    fn turnover_free_matches_possession() {
        let table = table(vec![point(
            (1, 0),
            &["A", "B"],
            vec![catch("A", "B"), throwaway("B"), their_throwaway(), goal("A", "B")],
        )]);
        let point = first_point(&table);
        assert!(!is_turnover_free(&point));
        assert_eq!(is_turnover_free(&point), possession_unbroken(&point));
    }
}
