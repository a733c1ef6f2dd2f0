// Event table: the normalized per-team, per-game event log.
//
// Action labels are classified once into a closed tag set when a table is
// built, so everything downstream switches on `Action` instead of matching
// label strings.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Closed tag sets
// ---------------------------------------------------------------------------

/// Whether the logging team was on offense or defense for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Offense,
    Defense,
}

impl EventType {
    /// Parse an `Event Type` label. Returns `None` for anything other than
    /// `Offense` / `Defense` (case-insensitive).
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "offense" => Some(EventType::Offense),
            "defense" => Some(EventType::Defense),
            _ => None,
        }
    }

    /// Parse a `Line` label: `O` for an offensive line, `D` for a defensive
    /// one (case-insensitive).
    pub fn from_line_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "o" | "offense" => Some(EventType::Offense),
            "d" | "defense" => Some(EventType::Defense),
            _ => None,
        }
    }
}

/// On-field action recorded for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Catch,
    Goal,
    Drop,
    Throwaway,
    /// Defensive block.
    D,
    Pull,
    /// Out-of-bounds pull.
    PullOb,
    Callahan,
    Stall,
    MiscPenalty,
    /// Any label the engine has no rule for (EndOfFirstQuarter, Halftime, ...).
    Other,
}

impl Action {
    /// Classify an `Action` label. Unknown labels map to `Action::Other`.
    pub fn from_label(s: &str) -> Self {
        match s.trim() {
            "Catch" => Action::Catch,
            "Goal" => Action::Goal,
            "Drop" => Action::Drop,
            "Throwaway" => Action::Throwaway,
            "D" => Action::D,
            "Pull" => Action::Pull,
            "PullOb" => Action::PullOb,
            "Callahan" => Action::Callahan,
            "Stall" => Action::Stall,
            "MiscPenalty" => Action::MiscPenalty,
            _ => Action::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Catch => "Catch",
            Action::Goal => "Goal",
            Action::Drop => "Drop",
            Action::Throwaway => "Throwaway",
            Action::D => "D",
            Action::Pull => "Pull",
            Action::PullOb => "PullOb",
            Action::Callahan => "Callahan",
            Action::Stall => "Stall",
            Action::MiscPenalty => "MiscPenalty",
            Action::Other => "Other",
        }
    }

    /// Actions that carry an intended receiver: completed and dropped passes.
    /// Throwaways are excluded since no receiver is recorded reliably.
    pub fn is_pass_intent(&self) -> bool {
        matches!(self, Action::Catch | Action::Goal | Action::Drop)
    }

    /// Actions after which the disc changes hands.
    pub fn is_possession_change(&self) -> bool {
        matches!(self, Action::Throwaway | Action::D | Action::Drop | Action::Goal)
    }

    /// `Pull` or `PullOb`.
    pub fn is_pull(&self) -> bool {
        matches!(self, Action::Pull | Action::PullOb)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Score pair
// ---------------------------------------------------------------------------

/// Cumulative (own, opponent) score, as recorded at the end of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScorePair {
    pub ours: u32,
    pub theirs: u32,
}

impl ScorePair {
    pub fn new(ours: u32, theirs: u32) -> Self {
        ScorePair { ours, theirs }
    }

    /// The same score seen from the opponent's log.
    pub fn swapped(&self) -> Self {
        ScorePair {
            ours: self.theirs,
            theirs: self.ours,
        }
    }
}

impl fmt::Display for ScorePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ours, self.theirs)
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// One row of a team's game log.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Position in the table. Assigned by `EventTable::new`; authoritative
    /// for ordering.
    pub seq: usize,
    /// Elapsed time as logged. Not reliable and never consulted.
    pub elapsed_secs: Option<f64>,
    pub event_type: EventType,
    /// Whether the line started the point on offense or defense.
    pub line: Option<EventType>,
    pub action: Action,
    pub passer: Option<String>,
    pub receiver: Option<String>,
    pub defender: Option<String>,
    /// "Player N" slots, one per column, `None` when the slot is empty.
    pub players: Vec<Option<String>>,
    pub our_score: u32,
    pub their_score: u32,
    pub opponent: String,
}

impl Event {
    pub fn score(&self) -> ScorePair {
        ScorePair::new(self.our_score, self.their_score)
    }

    pub fn is_offense(&self) -> bool {
        self.event_type == EventType::Offense
    }
}

// ---------------------------------------------------------------------------
// Event table
// ---------------------------------------------------------------------------

/// A team's event log for one game. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    events: Vec<Event>,
}

impl EventTable {
    /// Build a table, renumbering `seq` to match the given order.
    pub fn new(mut events: Vec<Event>) -> Self {
        for (seq, event) in events.iter_mut().enumerate() {
            event.seq = seq;
        }
        EventTable { events }
    }

    /// Build a table keeping each event's `seq`, e.g. its row in the source
    /// file. Events are ordered by `seq`; gaps left by skipped rows are kept
    /// so possession runs across them read as broken.
    pub fn with_positions(mut events: Vec<Event>) -> Self {
        events.sort_by_key(|e| e.seq);
        EventTable { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Opponent named by the first event, if any.
    pub fn opponent(&self) -> Option<&str> {
        self.events
            .first()
            .map(|e| e.opponent.trim())
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    #[test]
    fn action_labels_parse_into_closed_set() {
        assert_eq!(Action::from_label("Catch"), Action::Catch);
        assert_eq!(Action::from_label("PullOb"), Action::PullOb);
        assert_eq!(Action::from_label(" Goal "), Action::Goal);
        assert_eq!(Action::from_label("EndOfFirstQuarter"), Action::Other);
        assert_eq!(Action::from_label("catch"), Action::Other);
    }

    #[test]
    fn pass_intent_excludes_throwaway() {
        assert!(Action::Catch.is_pass_intent());
        assert!(Action::Goal.is_pass_intent());
        assert!(Action::Drop.is_pass_intent());
        assert!(!Action::Throwaway.is_pass_intent());
        assert!(!Action::D.is_pass_intent());
    }

    #[test]
    fn event_type_parse() {
        assert_eq!(EventType::from_label("Offense"), Some(EventType::Offense));
        assert_eq!(EventType::from_label("defense"), Some(EventType::Defense));
        assert_eq!(EventType::from_label("Cessation"), None);
    }

    #[test]
    fn new_table_renumbers_seq() {
        let mut events = point((1, 0), &["A", "B"], vec![catch("A", "B"), goal("B", "A")]);
        events[0].seq = 40;
        events[1].seq = 7;
        let table = EventTable::new(events);
        let seqs: Vec<usize> = table.events().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1]);
    }

    #[test]
    fn positioned_table_keeps_gaps() {
        let mut events = point((1, 0), &["A", "B"], vec![catch("A", "B"), goal("B", "A")]);
        events[0].seq = 4;
        events[1].seq = 2;
        let table = EventTable::with_positions(events);
        let seqs: Vec<usize> = table.events().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![2, 4]);
        assert_eq!(table.events()[0].action, Action::Goal);
    }

    #[test]
    fn line_labels() {
        assert_eq!(EventType::from_line_label("O"), Some(EventType::Offense));
        assert_eq!(EventType::from_line_label(" d "), Some(EventType::Defense));
        assert_eq!(EventType::from_line_label(""), None);
    }

    #[test]
    fn opponent_from_first_event() {
        let table = table(vec![point((1, 0), &["A"], vec![goal("A", "A")])]);
        assert_eq!(table.opponent(), Some(OPPONENT));
        assert_eq!(EventTable::default().opponent(), None);
    }

    #[test]
    fn swapped_score() {
        assert_eq!(ScorePair::new(3, 5).swapped(), ScorePair::new(5, 3));
        assert_eq!(ScorePair::new(3, 5).to_string(), "3-5");
    }
}
