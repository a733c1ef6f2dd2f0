// Configuration loading and parsing (config/league.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use ultistats_core::scorer::BonusRules;
use ultistats_core::tournament::DEFAULT_OFF_FIELD_BONUS;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub league: LeagueConfig,
    pub data: DataPaths,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Directory holding one CSV per team per game.
    pub games_dir: String,
    /// CSV of `name,gender` rows.
    pub roster: String,
}

/// On-field bonus per point property plus the off-field bonus for the
/// longest turnover-free run.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    #[serde(flatten)]
    pub bonus: BonusRules,
    pub off_field_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            bonus: BonusRules::default(),
            off_field_bonus: DEFAULT_OFF_FIELD_BONUS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// JSON report path. An empty string disables the JSON report.
    pub output: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            output: "reports/tournament.json".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/league.toml` relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` handles that.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("league.toml");
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;
    Ok(config)
}

/// Copy any missing `*.toml` from `defaults/` into `config/`. Returns the
/// files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither {} nor {} exists",
                defaults_dir.display(),
                config_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("cannot create {}: {e}", config_dir.display()),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("cannot read {}: {e}", defaults_dir.display()),
    })?;

    copy_missing(
        &defaults_dir,
        &config_dir,
        entries.map(|entry| entry.map(|e| e.path())),
    )
}

fn copy_missing<I>(
    defaults_dir: &Path,
    config_dir: &Path,
    sources: I,
) -> Result<Vec<PathBuf>, ConfigError>
where
    I: IntoIterator<Item = std::io::Result<PathBuf>>,
{
    let mut copied = Vec::new();
    for src in sources {
        let src = src.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("cannot read entry in {}: {e}", defaults_dir.display()),
        })?;
        if src.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }
        let Some(file_name) = src.file_name() else {
            continue;
        };
        let dest = config_dir.join(file_name);
        if dest.exists() {
            continue;
        }
        std::fs::copy(&src, &dest).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("cannot copy {} to {}: {e}", src.display(), dest.display()),
        })?;
        tracing::info!("initialized {} from defaults", dest.display());
        copied.push(dest);
    }
    Ok(copied)
}

/// Load configuration from `base_dir`, seeding `config/` from `defaults/`.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.name".into(),
            message: "must not be empty".into(),
        });
    }

    let path_fields: &[(&str, &str)] = &[
        ("data.games_dir", &config.data.games_dir),
        ("data.roster", &config.data.roster),
    ];
    for (name, val) in path_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    let s = &config.scoring;
    let bonus_fields: &[(&str, f64)] = &[
        ("scoring.all_touch", s.bonus.all_touch),
        ("scoring.perfect_score", s.bonus.perfect_score),
        ("scoring.turnover_free", s.bonus.turnover_free),
        ("scoring.off_field_bonus", s.off_field_bonus),
    ];
    for (name, val) in bonus_fields {
        if !val.is_finite() || *val < 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be a non-negative number, got {val}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
