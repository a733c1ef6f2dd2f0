// Ultimate-frisbee game statistics engine.
//
// Event tables are segmented into points, points are classified and scored
// per team, and games are folded into tournament-level statistics. No file
// I/O happens here; loading and reporting live in `ultistats-app`.

pub mod classify;
pub mod event;
pub mod game;
pub mod gender;
pub mod possession;
pub mod scorer;
pub mod segment;
pub mod tournament;

#[cfg(test)]
pub(crate) mod fixtures;

pub use classify::{classify, PointClass};
pub use event::{Action, Event, EventTable, EventType, ScorePair};
pub use game::{Game, GameError, TeamLog};
pub use gender::{Gender, GenderError, GenderLookup, Roster};
pub use scorer::{score_game, score_team, BonusRules, GameScore, ScoreError, TeamScore};
pub use segment::{Point, SegmentError};
pub use tournament::{AggregateError, TournamentAggregator, TournamentReport};
