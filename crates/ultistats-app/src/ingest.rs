// CSV ingestion: Ulti-Analytics style team logs into `EventTable`s.
//
// Columns are looked up by header name; extra columns are ignored. Rows that
// cannot be parsed are skipped with a warning. Each event keeps its data row
// index as `seq`, so a skipped row leaves a gap in the sequence.

use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};
use ultistats_core::event::{Action, Event, EventTable, EventType};

const ELAPSED: &str = "Elapsed Time (secs)";
const EVENT_TYPE: &str = "Event Type";
const ACTION: &str = "Action";
const PASSER: &str = "Passer";
const RECEIVER: &str = "Receiver";
const DEFENDER: &str = "Defender";
const LINE: &str = "Line";
const OUR_SCORE: &str = "Our Score - End of Point";
const THEIR_SCORE: &str = "Their Score - End of Point";
const OPPONENT: &str = "Opponent";
const PLAYER_PREFIX: &str = "Player ";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path}: missing column `{column}`")]
    MissingColumn { path: String, column: &'static str },

    #[error("{path}: no usable events")]
    Empty { path: String },
}

/// Reader-level failures, before a path is attached.
#[derive(Debug)]
enum ReadError {
    Csv(csv::Error),
    MissingColumn(&'static str),
}

impl From<csv::Error> for ReadError {
    fn from(e: csv::Error) -> Self {
        ReadError::Csv(e)
    }
}

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Columns {
    elapsed: Option<usize>,
    event_type: usize,
    line: Option<usize>,
    action: usize,
    passer: Option<usize>,
    receiver: Option<usize>,
    defender: Option<usize>,
    /// Player slot columns, ordered by slot number.
    players: Vec<usize>,
    our_score: usize,
    their_score: usize,
    opponent: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, ReadError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &'static str| find(name).ok_or(ReadError::MissingColumn(name));

        let mut players: Vec<(usize, usize)> = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, h)| {
                let slot = h.trim().strip_prefix(PLAYER_PREFIX)?.trim().parse().ok()?;
                Some((slot, idx))
            })
            .collect();
        players.sort_unstable();

        Ok(Columns {
            elapsed: find(ELAPSED),
            event_type: require(EVENT_TYPE)?,
            line: find(LINE),
            action: require(ACTION)?,
            passer: find(PASSER),
            receiver: find(RECEIVER),
            defender: find(DEFENDER),
            players: players.into_iter().map(|(_, idx)| idx).collect(),
            our_score: require(OUR_SCORE)?,
            their_score: require(THEIR_SCORE)?,
            opponent: require(OPPONENT)?,
        })
    }
}

/// Non-empty trimmed cell, or `None`.
fn cell(record: &StringRecord, idx: Option<usize>) -> Option<String> {
    let value = record.get(idx?)?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Scores may be logged as floats ("3.0") by some exporters.
fn parse_score(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    raw.parse::<u32>().ok().or_else(|| {
        let f = raw.parse::<f64>().ok()?;
        (f.is_finite() && f >= 0.0 && f.fract() == 0.0).then_some(f as u32)
    })
}

fn parse_row(record: &StringRecord, cols: &Columns, seq: usize) -> Result<Event, String> {
    let get = |idx: usize| record.get(idx).unwrap_or("");

    let event_type = EventType::from_label(get(cols.event_type))
        .ok_or_else(|| format!("unknown event type '{}'", get(cols.event_type)))?;
    let our_score = parse_score(get(cols.our_score))
        .ok_or_else(|| format!("bad score '{}'", get(cols.our_score)))?;
    let their_score = parse_score(get(cols.their_score))
        .ok_or_else(|| format!("bad score '{}'", get(cols.their_score)))?;

    Ok(Event {
        seq,
        elapsed_secs: cell(record, cols.elapsed).and_then(|s| s.parse().ok()),
        event_type,
        line: cell(record, cols.line).and_then(|s| EventType::from_line_label(&s)),
        action: Action::from_label(get(cols.action)),
        passer: cell(record, cols.passer),
        receiver: cell(record, cols.receiver),
        defender: cell(record, cols.defender),
        players: cols.players.iter().map(|&idx| cell(record, Some(idx))).collect(),
        our_score,
        their_score,
        opponent: get(cols.opponent).trim().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Reader and path loaders
// ---------------------------------------------------------------------------

fn load_events_from_reader<R: Read>(rdr: R) -> Result<EventTable, ReadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader.headers()?.clone();
    let cols = Columns::from_headers(&headers)?;

    let mut events = Vec::new();
    for (row, result) in reader.records().enumerate() {
        match result {
            Ok(record) => match parse_row(&record, &cols, row) {
                Ok(event) => events.push(event),
                Err(reason) => warn!("skipping row {}: {}", row + 1, reason),
            },
            Err(e) => warn!("skipping malformed row {}: {}", row + 1, e),
        }
    }
    Ok(EventTable::with_positions(events))
}

/// Read one team's game log from any reader. `source` names the input in
/// error messages.
pub fn read_event_table<R: Read>(rdr: R, source: &str) -> Result<EventTable, IngestError> {
    let table = load_events_from_reader(rdr).map_err(|e| match e {
        ReadError::Csv(source_err) => IngestError::Csv {
            path: source.to_string(),
            source: source_err,
        },
        ReadError::MissingColumn(column) => IngestError::MissingColumn {
            path: source.to_string(),
            column,
        },
    })?;
    if table.is_empty() {
        return Err(IngestError::Empty {
            path: source.to_string(),
        });
    }
    debug!("{}: {} events", source, table.len());
    Ok(table)
}

/// Load one team's game log from a CSV file.
pub fn load_event_table(path: &Path) -> Result<EventTable, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read_event_table(file, &path.display().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ultistats_core::classify::is_turnover_free;

    const HEADER: &str = "Date/Time,Tournamemnt,Opponent,Point Elapsed Seconds,Line,Our Score - End of Point,Their Score - End of Point,Event Type,Action,Passer,Receiver,Defender,Hang Time (secs),Player 0,Player 1,Player 2,Elapsed Time (secs)\n";

    fn read(body: &str) -> Result<EventTable, IngestError> {
        let csv = format!("{HEADER}{body}");
        read_event_table(csv.as_bytes(), "test.csv")
    }

    #[test]
    fn parses_columns_by_name() {
        let table = read(
            "x,t,Huck,10,O,1,0,Offense,Catch,Asha,Ravi,,,Asha,Ravi,Mei,12\n\
             x,t,Huck,10,O,1,0,Offense,Goal,Ravi,Mei,,,Asha,Ravi,Mei,15\n",
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        let first = &table.events()[0];
        assert_eq!(first.action, Action::Catch);
        assert_eq!(first.event_type, EventType::Offense);
        assert_eq!(first.passer.as_deref(), Some("Asha"));
        assert_eq!(first.receiver.as_deref(), Some("Ravi"));
        assert_eq!(first.defender, None);
        assert_eq!(first.our_score, 1);
        assert_eq!(first.opponent, "Huck");
        assert_eq!(first.elapsed_secs, Some(12.0));
        assert_eq!(
            first.players,
            vec![Some("Asha".into()), Some("Ravi".into()), Some("Mei".into())]
        );
        assert_eq!(table.events()[1].seq, 1);
        assert_eq!(table.opponent(), Some("Huck"));
    }

    #[test]
    fn unknown_actions_become_other() {
        let table = read("x,t,Huck,0,D,0,0,Defense,EndOfFirstQuarter,,,,,,,,\n").unwrap();
        assert_eq!(table.events()[0].action, Action::Other);
        assert!(table.events()[0].players.iter().all(Option::is_none));
    }

    #[test]
    fn bad_rows_are_skipped() {
        let table = read(
            "x,t,Huck,0,O,1,0,Sideline,Catch,A,B,,,A,B,,\n\
             x,t,Huck,0,O,one,0,Offense,Catch,A,B,,,A,B,,\n\
             x,t,Huck,0,O,1,0,Offense,Goal,A,B,,,A,B,,\n",
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.events()[0].seq, 2);
        assert_eq!(table.events()[0].action, Action::Goal);
    }

    #[test]
    fn skipped_row_still_breaks_possession() {
        // The opponent's turnover row has an unreadable score and is dropped.
        // The gap it leaves must keep the throwaway point from reading as
        // turnover-free.
        let table = read(
            "x,t,Huck,0,O,1,0,Offense,Catch,A,B,,,A,B,,\n\
             x,t,Huck,0,O,1,0,Offense,Throwaway,B,,,,A,B,,\n\
             x,t,Huck,0,O,1.5,0,Defense,Throwaway,,,,,A,B,,\n\
             x,t,Huck,0,O,1,0,Offense,Catch,A,B,,,A,B,,\n\
             x,t,Huck,0,O,1,0,Offense,Goal,B,A,,,A,B,,\n",
        )
        .unwrap();
        assert_eq!(table.len(), 4);
        let seqs: Vec<usize> = table.events().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1, 3, 4]);

        let point = table.points().next().unwrap().unwrap();
        assert!(!is_turnover_free(&point));
    }

    #[test]
    fn line_column_is_parsed() {
        let table = read(
            "x,t,Huck,0,O,1,0,Offense,Goal,A,B,,,A,B,,\n\
             x,t,Huck,0,D,1,1,Defense,Goal,,,,,A,B,,\n\
             x,t,Huck,0,,2,1,Offense,Goal,A,B,,,A,B,,\n",
        )
        .unwrap();
        let lines: Vec<Option<EventType>> = table.events().iter().map(|e| e.line).collect();
        assert_eq!(
            lines,
            vec![Some(EventType::Offense), Some(EventType::Defense), None]
        );
    }

    #[test]
    fn float_scores_are_accepted() {
        let table = read("x,t,Huck,0,O,2.0,3,Offense,Goal,A,B,,,A,B,,\n").unwrap();
        assert_eq!(table.events()[0].our_score, 2);
        assert_eq!(table.events()[0].their_score, 3);
    }

    #[test]
    fn player_slots_follow_slot_number() {
        let csv = "Event Type,Action,Our Score - End of Point,Their Score - End of Point,Opponent,Player 10,Player 2,Player 1\n\
                   Offense,Goal,1,0,Huck,Ten,Two,One\n";
        let table = read_event_table(csv.as_bytes(), "slots.csv").unwrap();
        assert_eq!(
            table.events()[0].players,
            vec![Some("One".into()), Some("Two".into()), Some("Ten".into())]
        );
    }

    #[test]
    fn missing_required_column_is_reported() {
        let csv = "Event Type,Action,Opponent\nOffense,Goal,Huck\n";
        let err = read_event_table(csv.as_bytes(), "short.csv").unwrap_err();
        match err {
            IngestError::MissingColumn { column, .. } => assert_eq!(column, OUR_SCORE),
            other => panic!("expected MissingColumn, got: {other}"),
        }
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = read("").unwrap_err();
        assert!(matches!(err, IngestError::Empty { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_event_table(Path::new("/nonexistent/ultistats/game.csv")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
