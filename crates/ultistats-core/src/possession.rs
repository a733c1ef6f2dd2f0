// Possession tracking: who was on the field, who touched the disc, and how
// possession moved between the teams during a point.

use crate::event::{Action, Event, EventTable, EventType};
use crate::segment::Point;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Name logged when the scorekeeper could not identify a participant.
pub const ANONYMOUS: &str = "Anonymous";

// ---------------------------------------------------------------------------
// Line and touches
// ---------------------------------------------------------------------------

/// Number of "Player N" slots that are populated in every event of the point.
///
/// A player who came on or off mid-point is not counted.
pub fn player_count(point: &Point<'_>) -> usize {
    let events = point.events();
    let width = events.iter().map(|e| e.players.len()).max().unwrap_or(0);
    (0..width)
        .filter(|&slot| {
            events
                .iter()
                .all(|e| matches!(e.players.get(slot), Some(Some(_))))
        })
        .count()
}

/// The first `player_count` names on the line of the point's first event.
pub fn players<'a>(point: &Point<'a>) -> BTreeSet<&'a str> {
    let n = player_count(point);
    point
        .events()
        .first()
        .map(|first| {
            first
                .players
                .iter()
                .flatten()
                .take(n)
                .map(String::as_str)
                .collect()
        })
        .unwrap_or_default()
}

/// Every named passer and receiver in the point, excluding `ANONYMOUS`.
pub fn touched<'a>(point: &Point<'a>) -> BTreeSet<&'a str> {
    point
        .events()
        .iter()
        .flat_map(|e| [e.passer.as_deref(), e.receiver.as_deref()])
        .flatten()
        .filter(|name| *name != ANONYMOUS)
        .collect()
}

/// True when the team, once it first got the disc, held it through to the
/// final goal: the offensive events form one unbroken run that ends the point.
pub fn possession_unbroken(point: &Point<'_>) -> bool {
    let Some(last_seq) = point.events().last().map(|e| e.seq) else {
        return false;
    };
    let offense: Vec<usize> = point.offense().map(|e| e.seq).collect();
    let (Some(&min), Some(&max)) = (offense.iter().min(), offense.iter().max()) else {
        return false;
    };
    last_seq == max && min + offense.len() == max + 1
}

// ---------------------------------------------------------------------------
// Possession segments
// ---------------------------------------------------------------------------

/// Split a point after every possession change (`Throwaway`, `D`, `Drop`,
/// `Goal`). Each segment ends with its change event; a trailing run with no
/// change is a segment of its own.
pub fn possession_segments<'a>(point: &Point<'a>) -> Vec<&'a [Event]> {
    split_possessions(point.events())
}

/// Possession segments after the opening pull. The pulling team's first
/// segment then holds only what it did while the opponent had the disc, so a
/// block on the receivers' first possession stands alone.
pub fn segments_after_pull<'a>(point: &Point<'a>) -> Vec<&'a [Event]> {
    let events = point.events();
    let start = events.iter().take_while(|e| e.action.is_pull()).count();
    split_possessions(&events[start..])
}

fn split_possessions(events: &[Event]) -> Vec<&[Event]> {
    events
        .split_inclusive(|e| e.action.is_possession_change())
        .collect()
}

// ---------------------------------------------------------------------------
// Passes since gaining possession
// ---------------------------------------------------------------------------

/// Counts of offensive events keyed by how many events into the possession
/// they happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassHistogram {
    pub goals: BTreeMap<usize, usize>,
    pub catches: BTreeMap<usize, usize>,
    pub drops: BTreeMap<usize, usize>,
    pub throwaways: BTreeMap<usize, usize>,
}

impl PassHistogram {
    /// Drops and throwaways combined.
    pub fn turnovers(&self) -> BTreeMap<usize, usize> {
        combine(&self.drops, &self.throwaways)
    }

    /// Catches and goals combined.
    pub fn completions(&self) -> BTreeMap<usize, usize> {
        combine(&self.catches, &self.goals)
    }

    pub fn merge(&mut self, other: &PassHistogram) {
        for (mine, theirs) in [
            (&mut self.goals, &other.goals),
            (&mut self.catches, &other.catches),
            (&mut self.drops, &other.drops),
            (&mut self.throwaways, &other.throwaways),
        ] {
            for (&k, &v) in theirs {
                *mine.entry(k).or_insert(0) += v;
            }
        }
    }
}

fn combine(a: &BTreeMap<usize, usize>, b: &BTreeMap<usize, usize>) -> BTreeMap<usize, usize> {
    let mut out = a.clone();
    for (&k, &v) in b {
        *out.entry(k).or_insert(0) += v;
    }
    out
}

/// For each offensive catch, goal, drop and throwaway in the table, the
/// number of events since the team last gained possession on defense (a
/// logged opponent goal, throwaway or a block), or since the start of the
/// table.
pub fn passes_since_possession(table: &EventTable) -> PassHistogram {
    let mut histogram = PassHistogram::default();
    let Some(first) = table.events().first() else {
        return histogram;
    };
    // One before the first event, so the opening event counts as 1.
    let mut gained_at = first.seq as isize - 1;

    for event in table.events() {
        let since = (event.seq as isize - gained_at) as usize;
        match (event.event_type, event.action) {
            (EventType::Defense, Action::Goal | Action::Throwaway | Action::D) => {
                gained_at = event.seq as isize;
            }
            (EventType::Offense, Action::Goal) => bump(&mut histogram.goals, since),
            (EventType::Offense, Action::Catch) => bump(&mut histogram.catches, since),
            (EventType::Offense, Action::Drop) => bump(&mut histogram.drops, since),
            (EventType::Offense, Action::Throwaway) => bump(&mut histogram.throwaways, since),
            _ => {}
        }
    }
    histogram
}

fn bump(bucket: &mut BTreeMap<usize, usize>, key: usize) {
    *bucket.entry(key).or_insert(0) += 1;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
