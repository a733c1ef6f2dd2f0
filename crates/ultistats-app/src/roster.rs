// Roster loading: `name,gender` CSV into a `Roster`.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::warn;
use ultistats_core::gender::{Gender, Roster};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path}: player '{name}' has unrecognized gender '{gender}'")]
    InvalidGender {
        path: String,
        name: String,
        gender: String,
    },
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    name: String,
    gender: String,
}

/// Reader-level failures, before a path is attached.
enum ReadError {
    Csv(csv::Error),
    InvalidGender { name: String, gender: String },
}

fn load_roster_from_reader<R: Read>(rdr: R) -> Result<Roster, ReadError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut roster = Roster::new();
    for result in reader.deserialize::<RawEntry>() {
        let raw = result.map_err(ReadError::Csv)?;
        let name = raw.name.trim();
        if name.is_empty() {
            warn!("skipping roster row with empty name");
            continue;
        }
        let Some(gender) = Gender::from_label(&raw.gender) else {
            return Err(ReadError::InvalidGender {
                name: name.to_string(),
                gender: raw.gender,
            });
        };
        if roster.insert(name, gender).is_some() {
            warn!("duplicate roster entry for '{}', using latest value", name);
        }
    }
    Ok(roster)
}

/// Read a roster from any reader. `source` names the input in error messages.
pub fn read_roster<R: Read>(rdr: R, source: &str) -> Result<Roster, RosterError> {
    load_roster_from_reader(rdr).map_err(|e| match e {
        ReadError::Csv(err) => RosterError::Csv {
            path: source.to_string(),
            source: err,
        },
        ReadError::InvalidGender { name, gender } => RosterError::InvalidGender {
            path: source.to_string(),
            name,
            gender,
        },
    })
}

/// Load a roster from a CSV file.
pub fn load_roster(path: &Path) -> Result<Roster, RosterError> {
    let file = std::fs::File::open(path).map_err(|e| RosterError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read_roster(file, &path.display().to_string())
}
