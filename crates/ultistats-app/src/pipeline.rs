// End-to-end run: discover games, score them, aggregate the tournament.

use crate::config::Config;
use crate::discover::load_games;
use crate::report::TournamentOutput;
use crate::roster::load_roster;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;
use ultistats_core::scorer::score_game;
use ultistats_core::tournament::TournamentAggregator;

/// Resolve a configured path against `base_dir` unless it is absolute.
pub fn resolve_path(base_dir: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Run the whole tournament described by `config`. Relative data paths are
/// taken from `base_dir`.
pub fn run(config: &Config, base_dir: &Path) -> anyhow::Result<TournamentOutput> {
    let roster_path = resolve_path(base_dir, &config.data.roster);
    let roster = load_roster(&roster_path).context("failed to load roster")?;
    info!("loaded {} players from {}", roster.len(), roster_path.display());

    let games_dir = resolve_path(base_dir, &config.data.games_dir);
    let games = load_games(&games_dir).context("failed to load games")?;
    if games.is_empty() {
        anyhow::bail!("no paired game files found in {}", games_dir.display());
    }

    let rules = config.scoring.bonus;
    let scores = games
        .iter()
        .map(|game| {
            score_game(game, &rules).with_context(|| format!("failed to score game {}", game.id))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    info!("scored {} games", scores.len());

    let aggregator = TournamentAggregator::aggregate(&games, &roster)
        .context("failed to aggregate tournament")?;
    let tournament = aggregator.finish(config.scoring.off_field_bonus);

    Ok(TournamentOutput {
        generated_at: chrono::Utc::now(),
        league: config.league.name.clone(),
        games: scores,
        tournament,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_join_base_dir() {
        let base = Path::new("/srv/league");
        assert_eq!(
            resolve_path(base, "data/games"),
            PathBuf::from("/srv/league/data/games")
        );
        assert_eq!(resolve_path(base, "/tmp/roster.csv"), PathBuf::from("/tmp/roster.csv"));
    }
}
