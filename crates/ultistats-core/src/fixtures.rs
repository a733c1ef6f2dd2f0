// Test-only builders for hand-written event tables.

use crate::event::{Action, Event, EventTable, EventType};

pub(crate) const OPPONENT: &str = "Opponents";

pub(crate) fn event(event_type: EventType, action: Action) -> Event {
    Event {
        seq: 0,
        elapsed_secs: None,
        event_type,
        line: None,
        action,
        passer: None,
        receiver: None,
        defender: None,
        players: Vec::new(),
        our_score: 0,
        their_score: 0,
        opponent: OPPONENT.to_string(),
    }
}

fn pass(action: Action, passer: &str, receiver: &str) -> Event {
    Event {
        passer: Some(passer.to_string()),
        receiver: Some(receiver.to_string()),
        ..event(EventType::Offense, action)
    }
}

fn defensive(action: Action, defender: &str) -> Event {
    Event {
        defender: Some(defender.to_string()),
        ..event(EventType::Defense, action)
    }
}

pub(crate) fn catch(passer: &str, receiver: &str) -> Event {
    pass(Action::Catch, passer, receiver)
}

pub(crate) fn goal(passer: &str, receiver: &str) -> Event {
    pass(Action::Goal, passer, receiver)
}

pub(crate) fn drop_pass(passer: &str, receiver: &str) -> Event {
    pass(Action::Drop, passer, receiver)
}

pub(crate) fn throwaway(passer: &str) -> Event {
    Event {
        passer: Some(passer.to_string()),
        ..event(EventType::Offense, Action::Throwaway)
    }
}

pub(crate) fn block(defender: &str) -> Event {
    defensive(Action::D, defender)
}

pub(crate) fn pull(defender: &str) -> Event {
    defensive(Action::Pull, defender)
}

pub(crate) fn pull_ob(defender: &str) -> Event {
    defensive(Action::PullOb, defender)
}

/// Opponent throws the disc away, as seen from the defending team's log.
pub(crate) fn their_throwaway() -> Event {
    event(EventType::Defense, Action::Throwaway)
}

/// Opponent scores, as seen from the defending team's log.
pub(crate) fn their_goal() -> Event {
    event(EventType::Defense, Action::Goal)
}

/// Stamp a run of events with the end-of-point score and a full line.
pub(crate) fn point(score: (u32, u32), players: &[&str], events: Vec<Event>) -> Vec<Event> {
    let slots: Vec<Option<String>> = players.iter().map(|p| Some(p.to_string())).collect();
    events
        .into_iter()
        .map(|e| Event {
            our_score: score.0,
            their_score: score.1,
            players: slots.clone(),
            ..e
        })
        .collect()
}

/// Mark every event of a point as played by an O or D line.
pub(crate) fn on_line(line: EventType, events: Vec<Event>) -> Vec<Event> {
    events
        .into_iter()
        .map(|e| Event {
            line: Some(line),
            ..e
        })
        .collect()
}

pub(crate) fn table(points: Vec<Vec<Event>>) -> EventTable {
    EventTable::new(points.into_iter().flatten().collect())
}

/// Same as `table`, with every event naming `opponent`.
pub(crate) fn table_against(opponent: &str, points: Vec<Vec<Event>>) -> EventTable {
    EventTable::new(
        points
            .into_iter()
            .flatten()
            .map(|e| Event {
                opponent: opponent.to_string(),
                ..e
            })
            .collect(),
    )
}
