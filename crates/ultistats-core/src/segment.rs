// Point segmentation: splits an event table into points.
//
// Consecutive events sharing the same end-of-point score pair form one
// group. A group is cut at its first Goal; anything logged after the goal
// within the same group is discarded.

use crate::event::{Action, Event, EventTable, EventType, ScorePair};
use thiserror::Error;
use tracing::debug;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("point ending {score} has no Goal action (starts at event {first_seq})")]
    MissingGoal { score: ScorePair, first_seq: usize },
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A borrowed view of one point: a non-empty run of events whose last action
/// is `Goal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<'a> {
    score: ScorePair,
    events: &'a [Event],
}

impl<'a> Point<'a> {
    /// Score pair after the point.
    pub fn score(&self) -> ScorePair {
        self.score
    }

    pub fn events(&self) -> &'a [Event] {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether an O or D line played the point, as logged on its goal.
    pub fn line(&self) -> Option<EventType> {
        self.events.last().and_then(|e| e.line)
    }

    /// Offensive events of the point, in order.
    pub fn offense(&self) -> impl Iterator<Item = &'a Event> {
        self.events.iter().filter(|e| e.is_offense())
    }
}

// ---------------------------------------------------------------------------
// Iterator
// ---------------------------------------------------------------------------

/// Lazy iterator over the points of a table. Each call to
/// `EventTable::points` starts a fresh pass.
#[derive(Debug, Clone)]
pub struct Points<'a> {
    events: &'a [Event],
    pos: usize,
}

impl<'a> Iterator for Points<'a> {
    type Item = Result<Point<'a>, SegmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let first = self.events.get(start)?;
        let score = first.score();

        let end = self.events[start..]
            .iter()
            .position(|e| e.score() != score)
            .map_or(self.events.len(), |offset| start + offset);
        self.pos = end;

        let group = &self.events[start..end];
        if group.last().map(|e| e.action) == Some(Action::Goal) {
            return Some(Ok(Point { score, events: group }));
        }

        match group.iter().position(|e| e.action == Action::Goal) {
            Some(goal_idx) => {
                debug!(
                    "point {}: discarding {} event(s) logged after the goal",
                    score,
                    group.len() - goal_idx - 1
                );
                Some(Ok(Point {
                    score,
                    events: &group[..=goal_idx],
                }))
            }
            None => Some(Err(SegmentError::MissingGoal {
                score,
                first_seq: first.seq,
            })),
        }
    }
}

impl EventTable {
    /// Points of this table in table order.
    pub fn points(&self) -> Points<'_> {
        Points {
            events: self.events(),
            pos: 0,
        }
    }
}

/// Score after each point, in order.
pub fn score_line(table: &EventTable) -> Result<Vec<ScorePair>, SegmentError> {
    table.points().map(|p| p.map(|p| p.score())).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
