// Game discovery: pair per-team CSV files in a directory into games.
//
// A file named `TIKS-Huck.csv` is one team's log of TIKS vs Huck. Files are
// grouped by the sorted `-`-separated tokens of their stem, so `TIKS-Huck.csv`
// and `Huck-TIKS.csv` form one game.

use crate::ingest::{load_event_table, IngestError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use ultistats_core::game::Game;

/// Two files describing the same game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFiles {
    /// Sorted name tokens joined by `-`.
    pub id: String,
    pub files: [PathBuf; 2],
}

fn match_key(path: &Path) -> Option<Vec<String>> {
    let stem = path.file_stem()?.to_str()?;
    let mut tokens: Vec<String> = stem.split('-').map(|t| t.trim().to_string()).collect();
    tokens.sort();
    Some(tokens)
}

/// Find the paired game files in `dir`. Groups that do not hold exactly two
/// files are skipped with a warning.
pub fn find_match_files(dir: &Path) -> Result<Vec<MatchFiles>, IngestError> {
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;
    let groups = group_by_key(dir, entries.map(|entry| entry.map(|e| e.path())))?;

    let mut matches = Vec::new();
    for (key, mut files) in groups {
        files.sort();
        let id = key.join("-");
        match <[PathBuf; 2]>::try_from(files) {
            Ok(files) => matches.push(MatchFiles { id, files }),
            Err(files) => warn!("skipping match {}: found {} file(s), need 2", id, files.len()),
        }
    }
    info!("found {} game(s) in {}", matches.len(), dir.display());
    Ok(matches)
}

/// Group the CSV files among `paths` by match key. An unreadable directory
/// entry fails the whole scan.
fn group_by_key<I>(
    dir: &Path,
    paths: I,
) -> Result<BTreeMap<Vec<String>, Vec<PathBuf>>, IngestError>
where
    I: IntoIterator<Item = std::io::Result<PathBuf>>,
{
    let mut groups: BTreeMap<Vec<String>, Vec<PathBuf>> = BTreeMap::new();
    for path in paths {
        let path = path.map_err(|e| IngestError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !path.is_file() || !is_csv {
            continue;
        }
        if let Some(key) = match_key(&path) {
            groups.entry(key).or_default().push(path);
        }
    }
    Ok(groups)
}

/// Load both logs of a game. Returns `Ok(None)` when the logs cannot be
/// paired into a game; the reason is logged.
pub fn load_game(files: &MatchFiles) -> Result<Option<Game>, IngestError> {
    let first = load_event_table(&files.files[0])?;
    let second = load_event_table(&files.files[1])?;
    match Game::from_tables(files.id.clone(), first, second) {
        Ok(game) => Ok(Some(game)),
        Err(e) => {
            warn!("skipping {}", e);
            Ok(None)
        }
    }
}

/// Discover and load every game in `dir`.
pub fn load_games(dir: &Path) -> Result<Vec<Game>, IngestError> {
    let mut games = Vec::new();
    for files in find_match_files(dir)? {
        if let Some(game) = load_game(&files)? {
            games.push(game);
        }
    }
    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        tmp
    }

    #[test]
    fn key_ignores_token_order() {
        assert_eq!(
            match_key(Path::new("TIKS-Huck.csv")),
            match_key(Path::new("dir/Huck-TIKS.csv"))
        );
    }

    #[test]
    fn pairs_files_and_skips_singletons() {
        let tmp = scratch_dir("ultistats_discover_pairs");
        for name in ["TIKS-Huck.csv", "Huck-TIKS.csv", "TIKS-Zoo.csv", "notes.txt"] {
            fs::write(tmp.join(name), "").unwrap();
        }

        let matches = find_match_files(&tmp).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "Huck-TIKS");
        assert!(matches[0].files[0].ends_with("Huck-TIKS.csv"));
        assert!(matches[0].files[1].ends_with("TIKS-Huck.csv"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unreadable_entry_fails_the_scan() {
        let tmp = scratch_dir("ultistats_discover_bad_entry");
        fs::write(tmp.join("TIKS-Huck.csv"), "").unwrap();
        let entries = vec![
            Ok(tmp.join("TIKS-Huck.csv")),
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")),
        ];
        let err = group_by_key(&tmp, entries).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_directory_is_io_error() {
        let err = find_match_files(Path::new("/nonexistent/ultistats/games")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
