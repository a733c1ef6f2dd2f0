// Tournament aggregation: off-field statistics folded across games.
//
// Each team gets one `TeamAccumulator`, created the first time the team is
// seen. Games fold independently, so partial aggregators built on the rayon
// pool merge into the same result in any order (sums, unions, min, max).

use crate::classify::is_turnover_free;
use crate::event::{Action, EventTable, EventType, ScorePair};
use crate::game::Game;
use crate::gender::{
    expected_passes, resolve, Gender, GenderError, GenderLookup, PassDistribution, PassPair,
    SquadRatio,
};
use crate::possession::{passes_since_possession, players, segments_after_pull, PassHistogram};
use crate::segment::{Point, SegmentError};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;
use tracing::{debug, info, warn};

/// League points awarded for the longest turnover-free run.
pub const DEFAULT_OFF_FIELD_BONUS: f64 = 2.5;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("game {game}: {source}")]
    Segment {
        game: String,
        #[source]
        source: SegmentError,
    },

    #[error("game {game}, team {team}: {source}")]
    Gender {
        game: String,
        team: String,
        #[source]
        source: GenderError,
    },
}

// ---------------------------------------------------------------------------
// Per-point statistics
// ---------------------------------------------------------------------------

/// Women and men among the point's full-point players.
pub fn squad_ratio<L>(point: &Point<'_>, lookup: &L) -> Result<SquadRatio, GenderError>
where
    L: GenderLookup + ?Sized,
{
    let mut ratio = SquadRatio::default();
    for name in players(point) {
        match resolve(lookup, name)? {
            Gender::Female => ratio.female += 1,
            Gender::Male => ratio.male += 1,
        }
    }
    Ok(ratio)
}

/// Observed offensive passes (catches, goals and drops) of a point, bucketed
/// by the passer's and receiver's gender.
pub fn point_passes<L>(
    point: &Point<'_>,
    lookup: &L,
) -> Result<PassDistribution<u64>, GenderError>
where
    L: GenderLookup + ?Sized,
{
    let mut passes = PassDistribution::default();
    for event in point.offense().filter(|e| e.action.is_pass_intent()) {
        let passer = event.passer.as_deref().ok_or(GenderError::MissingParticipant {
            seq: event.seq,
            role: "passer",
        })?;
        let receiver = event
            .receiver
            .as_deref()
            .ok_or(GenderError::MissingParticipant {
                seq: event.seq,
                role: "receiver",
            })?;
        let pair = PassPair::of(resolve(lookup, passer)?, resolve(lookup, receiver)?);
        passes.add(pair, 1);
    }
    Ok(passes)
}

/// Offensive events in a turnover-free point; zero for any other point.
pub fn turnover_free_run(point: &Point<'_>) -> usize {
    if is_turnover_free(point) {
        point.offense().count()
    } else {
        0
    }
}

/// Fewest opposing passes before a block, over one game.
///
/// Points are paired by score between the two logs and split into
/// possession segments, leaving out the opening pull. A defending segment
/// made of a lone `D` is credited with the length of the attacking team's
/// segment at the same position, minus the turnover itself. Returns `None`
/// when the defending team never logged such a block.
pub fn fastest_d(
    defending: &EventTable,
    attacking: &EventTable,
) -> Result<Option<usize>, SegmentError> {
    let theirs: HashMap<ScorePair, Point<'_>> = attacking
        .points()
        .map(|p| p.map(|p| (p.score(), p)))
        .collect::<Result<_, _>>()?;

    let mut best: Option<usize> = None;
    for point in defending.points() {
        let point = point?;
        let Some(other) = theirs.get(&point.score().swapped()) else {
            debug!("point {}: no matching point in the opposing log", point.score());
            continue;
        };
        let their_segments = segments_after_pull(other);

        for (k, segment) in segments_after_pull(&point).into_iter().enumerate() {
            let [only] = segment else { continue };
            if only.action != Action::D {
                continue;
            }
            let Some(preceding) = their_segments.get(k) else {
                debug!(
                    "point {}: block at event {} has no opposing possession",
                    point.score(),
                    only.seq
                );
                continue;
            };
            let credit = preceding.len().saturating_sub(1);
            best = Some(best.map_or(credit, |b| b.min(credit)));
        }
    }
    Ok(best)
}

// ---------------------------------------------------------------------------
// Line participation
// ---------------------------------------------------------------------------

/// Points a player was on the field for, split by the line that played them.
/// Points with no line logged count only towards `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinePoints {
    pub total: u32,
    pub offense: u32,
    pub defense: u32,
}

impl LinePoints {
    fn record(&mut self, line: Option<EventType>) {
        self.total += 1;
        match line {
            Some(EventType::Offense) => self.offense += 1,
            Some(EventType::Defense) => self.defense += 1,
            None => {}
        }
    }

    pub fn merge(&mut self, other: &LinePoints) {
        self.total += other.total;
        self.offense += other.offense;
        self.defense += other.defense;
    }
}

// ---------------------------------------------------------------------------
// Team accumulator
// ---------------------------------------------------------------------------

/// Running statistics for one team across the games folded so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamAccumulator {
    pub games: usize,
    pub actual_passes: PassDistribution<u64>,
    /// Pass count per squad ratio; expected counts are linear in the count,
    /// so they are derived from these buckets at the end.
    pub passes_by_ratio: BTreeMap<SquadRatio, u64>,
    /// Pulls per puller.
    pub pulls: BTreeMap<String, u32>,
    pub longest_turnover_free: usize,
    pub fastest_d: Option<usize>,
    pub pass_histogram: PassHistogram,
    pub line_points: BTreeMap<String, LinePoints>,
}

impl TeamAccumulator {
    fn record_point<L>(&mut self, point: &Point<'_>, lookup: &L) -> Result<(), GenderError>
    where
        L: GenderLookup + ?Sized,
    {
        let ratio = squad_ratio(point, lookup)?;
        let passes = point_passes(point, lookup)?;
        let count = passes.total();
        if count > 0 {
            *self.passes_by_ratio.entry(ratio).or_insert(0) += count;
        }
        self.actual_passes.merge(&passes);
        self.longest_turnover_free = self.longest_turnover_free.max(turnover_free_run(point));

        let line = point.line();
        for name in players(point) {
            self.line_points
                .entry(name.to_string())
                .or_default()
                .record(line);
        }
        Ok(())
    }

    fn record_pulls(&mut self, table: &EventTable) {
        for event in table.events().iter().filter(|e| e.action.is_pull()) {
            match event.defender.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => {
                    *self.pulls.entry(name.to_string()).or_insert(0) += 1;
                }
                _ => debug!("pull at event {} has no puller recorded", event.seq),
            }
        }
    }

    fn record_fastest_d(&mut self, credit: usize) {
        self.fastest_d = Some(self.fastest_d.map_or(credit, |d| d.min(credit)));
    }

    /// Fold another accumulator for the same team into this one.
    pub fn merge(&mut self, other: TeamAccumulator) {
        self.games += other.games;
        self.actual_passes.merge(&other.actual_passes);
        for (ratio, count) in other.passes_by_ratio {
            *self.passes_by_ratio.entry(ratio).or_insert(0) += count;
        }
        for (name, count) in other.pulls {
            *self.pulls.entry(name).or_insert(0) += count;
        }
        self.longest_turnover_free = self.longest_turnover_free.max(other.longest_turnover_free);
        if let Some(credit) = other.fastest_d {
            self.record_fastest_d(credit);
        }
        self.pass_histogram.merge(&other.pass_histogram);
        for (name, points) in other.line_points {
            self.line_points.entry(name).or_default().merge(&points);
        }
    }

    /// Expected pass counts under random pairing, summed over ratio buckets.
    pub fn expected_passes(&self) -> PassDistribution<f64> {
        let mut expected = PassDistribution::default();
        for (&ratio, &count) in &self.passes_by_ratio {
            expected.merge(&expected_passes(ratio, count));
        }
        expected
    }

    pub fn pullers(&self) -> BTreeSet<String> {
        self.pulls.keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentAggregator {
    teams: BTreeMap<String, TeamAccumulator>,
}

impl TournamentAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every game, in parallel, and merge the partial results.
    pub fn aggregate<L>(games: &[Game], lookup: &L) -> Result<Self, AggregateError>
    where
        L: GenderLookup + Sync + ?Sized,
    {
        games
            .par_iter()
            .map(|game| {
                let mut partial = Self::new();
                partial.fold_game(game, lookup)?;
                Ok::<_, AggregateError>(partial)
            })
            .try_reduce(Self::new, |a, b| Ok(a.merge(b)))
    }

    pub fn team(&self, name: &str) -> Option<&TeamAccumulator> {
        self.teams.get(name)
    }

    fn team_mut(&mut self, name: &str) -> &mut TeamAccumulator {
        match self.teams.entry(name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!("new team in tournament: {}", name);
                entry.insert(TeamAccumulator::default())
            }
        }
    }

    /// Fold both sides of one game into their teams' accumulators.
    pub fn fold_game<L>(&mut self, game: &Game, lookup: &L) -> Result<(), AggregateError>
    where
        L: GenderLookup + ?Sized,
    {
        let segment_error = |source| AggregateError::Segment {
            game: game.id.clone(),
            source,
        };

        for (side, opponent) in game.matchups() {
            let fastest = fastest_d(&side.table, &opponent.table).map_err(segment_error)?;

            let acc = self.team_mut(&side.team);
            acc.games += 1;
            acc.record_pulls(&side.table);
            acc.pass_histogram.merge(&passes_since_possession(&side.table));
            if let Some(credit) = fastest {
                acc.record_fastest_d(credit);
            }

            for point in side.table.points() {
                let point = point.map_err(segment_error)?;
                acc.record_point(&point, lookup)
                    .map_err(|source| AggregateError::Gender {
                        game: game.id.clone(),
                        team: side.team.clone(),
                        source,
                    })?;
            }
        }
        debug!("folded game {}", game.id);
        Ok(())
    }

    /// Combine two aggregators built from disjoint sets of games.
    pub fn merge(mut self, other: TournamentAggregator) -> Self {
        for (team, acc) in other.teams {
            match self.teams.entry(team) {
                Entry::Occupied(mut entry) => entry.get_mut().merge(acc),
                Entry::Vacant(entry) => {
                    entry.insert(acc);
                }
            }
        }
        self
    }

    /// Close the aggregation and compute the report.
    pub fn finish(self, off_field_bonus: f64) -> TournamentReport {
        let teams: BTreeMap<String, TeamSummary> = self
            .teams
            .into_iter()
            .map(|(name, acc)| (name, TeamSummary::from(acc)))
            .collect();

        let longest = teams
            .values()
            .map(|t| t.longest_turnover_free)
            .max()
            .unwrap_or(0);
        let recipients: Vec<String> = teams
            .iter()
            .filter(|(_, t)| t.longest_turnover_free == longest)
            .map(|(name, _)| name.clone())
            .collect();

        if recipients.len() > 1 {
            warn!(
                "tie for longest turnover-free run ({}): {}",
                longest,
                recipients.join(", ")
            );
        }
        info!("aggregated {} teams", teams.len());

        TournamentReport {
            teams,
            longest_run_bonus: OffFieldBonus {
                recipients,
                longest_turnover_free: longest,
                points: off_field_bonus,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Final off-field statistics for one team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub games: usize,
    pub actual_passes: PassDistribution<u64>,
    pub expected_passes: PassDistribution<f64>,
    pub pullers: BTreeSet<String>,
    pub pull_counts: BTreeMap<String, u32>,
    pub longest_turnover_free: usize,
    /// `None` when the team never logged a qualifying block.
    pub fastest_d: Option<usize>,
    pub pass_histogram: PassHistogram,
    /// Per player: points played, on O lines and on D lines.
    pub line_points: BTreeMap<String, LinePoints>,
}

impl TeamSummary {
    /// Fastest D as a number, positive infinity when none was observed.
    pub fn fastest_d_value(&self) -> f64 {
        self.fastest_d.map_or(f64::INFINITY, |d| d as f64)
    }
}

impl From<TeamAccumulator> for TeamSummary {
    fn from(acc: TeamAccumulator) -> Self {
        TeamSummary {
            games: acc.games,
            actual_passes: acc.actual_passes,
            expected_passes: acc.expected_passes(),
            pullers: acc.pullers(),
            longest_turnover_free: acc.longest_turnover_free,
            fastest_d: acc.fastest_d,
            pull_counts: acc.pulls,
            pass_histogram: acc.pass_histogram,
            line_points: acc.line_points,
        }
    }
}

/// Recipients of the longest-turnover-free-run bonus. More than one name
/// means a tie that the league has to settle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffFieldBonus {
    pub recipients: Vec<String>,
    pub longest_turnover_free: usize,
    pub points: f64,
}

impl OffFieldBonus {
    pub fn is_tied(&self) -> bool {
        self.recipients.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentReport {
    pub teams: BTreeMap<String, TeamSummary>,
    pub longest_run_bonus: OffFieldBonus,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
