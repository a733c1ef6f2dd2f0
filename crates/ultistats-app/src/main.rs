// League scoring entry point.
//
// 1. Initialize tracing (stderr)
// 2. Load config, apply command-line overrides
// 3. Score every game and aggregate the tournament
// 4. Print the summary, write the JSON report

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use ultistats_app::{config, pipeline, report};

#[derive(Parser)]
#[command(name = "ultistats", about = "Score an ultimate league from per-team game logs")]
struct Cli {
    /// Directory holding `config/` and `defaults/`.
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Override `data.games_dir`.
    #[arg(long)]
    games_dir: Option<String>,

    /// Override `data.roster`.
    #[arg(long)]
    roster: Option<String>,

    /// Override `report.output`. Pass an empty string to skip the JSON report.
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let mut config = config::load_config(&cli.base_dir).context("failed to load configuration")?;
    if let Some(games_dir) = cli.games_dir {
        config.data.games_dir = games_dir;
    }
    if let Some(roster) = cli.roster {
        config.data.roster = roster;
    }
    if let Some(output) = cli.output {
        config.report.output = output;
    }
    info!("league: {}", config.league.name);

    let output = pipeline::run(&config, &cli.base_dir)?;
    print!("{}", report::render_summary(&output));

    if !config.report.output.trim().is_empty() {
        let path = pipeline::resolve_path(&cli.base_dir, &config.report.output);
        report::write_json(&output, &path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!("report written to {}", path.display());
    }
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ultistats=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
