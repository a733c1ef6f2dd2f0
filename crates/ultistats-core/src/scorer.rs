// On-field scoring: goals plus bonus points earned per point.
//
// Bonus per point:
// - all-touch: +all_touch
// - perfect score on top of all-touch: +perfect_score
// - no turnovers: +turnover_free

use crate::classify::{classify, PointClass};
use crate::game::Game;
use crate::segment::{Point, SegmentError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("no points to score")]
    NoPoints,

    #[error(transparent)]
    Segment(#[from] SegmentError),
}

// ---------------------------------------------------------------------------
// Rules and results
// ---------------------------------------------------------------------------

/// Bonus awarded for each point property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusRules {
    pub all_touch: f64,
    pub perfect_score: f64,
    pub turnover_free: f64,
}

impl Default for BonusRules {
    fn default() -> Self {
        BonusRules {
            all_touch: 0.5,
            perfect_score: 0.5,
            turnover_free: 0.5,
        }
    }
}

impl BonusRules {
    /// Bonus for a single classified point. The perfect-score bonus only
    /// applies on top of an all-touch point.
    pub fn point_bonus(&self, class: &PointClass) -> f64 {
        let mut bonus = 0.0;
        if class.all_touch {
            bonus += self.all_touch;
            if class.perfect_score {
                bonus += self.perfect_score;
            }
        }
        if class.turnover_free {
            bonus += self.turnover_free;
        }
        bonus
    }
}

/// A team's on-field result for one game.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamScore {
    /// Own score after the last point.
    pub goals: u32,
    pub bonus: f64,
    pub points: usize,
    pub all_touch_points: usize,
    pub perfect_points: usize,
    pub turnover_free_points: usize,
}

impl TeamScore {
    pub fn total(&self) -> f64 {
        self.goals as f64 + self.bonus
    }
}

/// Both teams' on-field results for one game, keyed by team name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameScore {
    pub game: String,
    pub teams: BTreeMap<String, TeamScore>,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Reduce a stream of points into goals and bonus points.
///
/// Fails on an empty stream and on the first malformed point.
pub fn score_team<'a, I>(points: I, rules: &BonusRules) -> Result<TeamScore, ScoreError>
where
    I: IntoIterator<Item = Result<Point<'a>, SegmentError>>,
{
    let mut score = TeamScore::default();
    let mut last = None;

    for point in points {
        let point = point?;
        let class = classify(&point);
        score.bonus += rules.point_bonus(&class);
        score.points += 1;
        if class.all_touch {
            score.all_touch_points += 1;
            if class.perfect_score {
                score.perfect_points += 1;
            }
        }
        if class.turnover_free {
            score.turnover_free_points += 1;
        }
        last = Some(point.score());
    }

    let last = last.ok_or(ScoreError::NoPoints)?;
    score.goals = last.ours;
    Ok(score)
}

/// Score both sides of a game.
pub fn score_game(game: &Game, rules: &BonusRules) -> Result<GameScore, ScoreError> {
    let mut teams = BTreeMap::new();
    for side in &game.sides {
        let score = score_team(side.table.points(), rules)?;
        debug!(
            "game {}: {} scored {} + {}",
            game.id, side.team, score.goals, score.bonus
        );
        teams.insert(side.team.clone(), score);
    }
    Ok(GameScore {
        game: game.id.clone(),
        teams,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
