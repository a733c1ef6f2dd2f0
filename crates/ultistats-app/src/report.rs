// Report output: plain-text summary for stdout and a JSON file.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::Path;
use ultistats_core::gender::PassPair;
use ultistats_core::possession::PassHistogram;
use ultistats_core::scorer::GameScore;
use ultistats_core::tournament::TournamentReport;

const PAIRS: [PassPair; 4] = [
    PassPair::MaleMale,
    PassPair::MaleFemale,
    PassPair::FemaleMale,
    PassPair::FemaleFemale,
];

/// Everything a run produces.
#[derive(Debug, Clone, Serialize)]
pub struct TournamentOutput {
    pub generated_at: DateTime<Utc>,
    pub league: String,
    pub games: Vec<GameScore>,
    pub tournament: TournamentReport,
}

/// Write the output as pretty-printed JSON, creating parent directories.
pub fn write_json(output: &TournamentOutput, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(output)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn fastest_d_label(fastest_d: Option<usize>) -> String {
    match fastest_d {
        Some(n) => n.to_string(),
        None => "inf".to_string(),
    }
}

/// `k:completed/attempted` for each event position after a gain of
/// possession, e.g. `1:4/5 2:3/3`.
fn completion_line(histogram: &PassHistogram) -> String {
    let completions = histogram.completions();
    let turnovers = histogram.turnovers();
    let positions: BTreeSet<usize> =
        completions.keys().chain(turnovers.keys()).copied().collect();
    positions
        .into_iter()
        .map(|k| {
            let done = completions.get(&k).copied().unwrap_or(0);
            let lost = turnovers.get(&k).copied().unwrap_or(0);
            format!("{k}:{done}/{}", done + lost)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Human-readable summary of a run.
pub fn render_summary(output: &TournamentOutput) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", output.league);
    let _ = writeln!(out, "{}", "=".repeat(output.league.len().max(8)));

    let _ = writeln!(out, "\nGames");
    for game in &output.games {
        let _ = writeln!(out, "  {}", game.game);
        for (team, score) in &game.teams {
            let _ = writeln!(
                out,
                "    {:<20} {:>3} goals  +{:<4} bonus  = {}",
                team,
                score.goals,
                score.bonus,
                score.total()
            );
        }
    }

    let _ = writeln!(out, "\nTeams");
    for (team, summary) in &output.tournament.teams {
        let _ = writeln!(out, "  {} ({} game(s))", team, summary.games);
        let _ = writeln!(
            out,
            "    longest turnover-free run: {}",
            summary.longest_turnover_free
        );
        let _ = writeln!(out, "    fastest D: {}", fastest_d_label(summary.fastest_d));
        let pullers: Vec<&str> = summary.pullers.iter().map(String::as_str).collect();
        let _ = writeln!(out, "    pullers: {}", pullers.join(", "));
        let _ = writeln!(out, "    passes (actual / expected):");
        for pair in PAIRS {
            let _ = writeln!(
                out,
                "      {}  {:>4} / {:>7.2}",
                pair,
                summary.actual_passes.get(pair),
                summary.expected_passes.get(pair)
            );
        }
        let _ = writeln!(
            out,
            "    completions by pass since gaining possession: {}",
            completion_line(&summary.pass_histogram)
        );
        let _ = writeln!(out, "    points played (O / D):");
        for (player, points) in &summary.line_points {
            let _ = writeln!(
                out,
                "      {:<16} {:>3} ({} / {})",
                player, points.total, points.offense, points.defense
            );
        }
    }

    let bonus = &output.tournament.longest_run_bonus;
    let _ = writeln!(out, "\nLongest turnover-free run bonus");
    if bonus.recipients.is_empty() {
        let _ = writeln!(out, "  none awarded");
    } else {
        let _ = writeln!(
            out,
            "  {} (run of {}): +{}{}",
            bonus.recipients.join(", "),
            bonus.longest_turnover_free,
            bonus.points,
            if bonus.is_tied() { " each, tied" } else { "" }
        );
    }
    out
}
