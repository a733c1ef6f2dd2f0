// Gender model for the mixed-division passing statistic.
//
// The engine never guesses a player's gender: lookups go through
// `GenderLookup`, and an unknown name is an error.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::ops::AddAssign;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenderError {
    #[error("player `{name}` is not listed in the roster")]
    UnknownPlayer { name: String },

    #[error("pass at event {seq} has no {role} recorded")]
    MissingParticipant { seq: usize, role: &'static str },
}

// ---------------------------------------------------------------------------
// Gender and lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Parse `F`/`M` or `female`/`male` (case-insensitive).
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f" | "female" | "w" | "woman" => Some(Gender::Female),
            "m" | "male" | "man" => Some(Gender::Male),
            _ => None,
        }
    }
}

/// Name to gender lookup supplied by the caller.
pub trait GenderLookup {
    fn gender(&self, name: &str) -> Option<Gender>;
}

impl<F> GenderLookup for F
where
    F: Fn(&str) -> Option<Gender>,
{
    fn gender(&self, name: &str) -> Option<Gender> {
        self(name)
    }
}

/// Look a name up, failing loudly when it is not listed.
pub fn resolve<L>(lookup: &L, name: &str) -> Result<Gender, GenderError>
where
    L: GenderLookup + ?Sized,
{
    lookup.gender(name).ok_or_else(|| GenderError::UnknownPlayer {
        name: name.to_string(),
    })
}

/// In-memory roster.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    genders: HashMap<String, Gender>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a player, returning the previous entry if the name was listed.
    pub fn insert(&mut self, name: impl Into<String>, gender: Gender) -> Option<Gender> {
        self.genders.insert(name.into(), gender)
    }

    pub fn len(&self) -> usize {
        self.genders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genders.is_empty()
    }
}

impl GenderLookup for Roster {
    fn gender(&self, name: &str) -> Option<Gender> {
        self.genders.get(name.trim()).copied()
    }
}

impl<S: Into<String>> FromIterator<(S, Gender)> for Roster {
    fn from_iter<T: IntoIterator<Item = (S, Gender)>>(iter: T) -> Self {
        Roster {
            genders: iter.into_iter().map(|(n, g)| (n.into(), g)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pass buckets
// ---------------------------------------------------------------------------

/// Passer/receiver gender pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassPair {
    MaleMale,
    MaleFemale,
    FemaleMale,
    FemaleFemale,
}

impl PassPair {
    pub fn of(passer: Gender, receiver: Gender) -> Self {
        match (passer, receiver) {
            (Gender::Male, Gender::Male) => PassPair::MaleMale,
            (Gender::Male, Gender::Female) => PassPair::MaleFemale,
            (Gender::Female, Gender::Male) => PassPair::FemaleMale,
            (Gender::Female, Gender::Female) => PassPair::FemaleFemale,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PassPair::MaleMale => "M-M",
            PassPair::MaleFemale => "M-F",
            PassPair::FemaleMale => "F-M",
            PassPair::FemaleFemale => "F-F",
        }
    }
}

impl fmt::Display for PassPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pass counts per gender pair. `u64` for observed passes, `f64` for the
/// expected counts under random pairing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PassDistribution<T> {
    #[serde(rename = "M-M")]
    pub mm: T,
    #[serde(rename = "M-F")]
    pub mf: T,
    #[serde(rename = "F-M")]
    pub fm: T,
    #[serde(rename = "F-F")]
    pub ff: T,
}

impl<T: Copy + AddAssign> PassDistribution<T> {
    pub fn add(&mut self, pair: PassPair, value: T) {
        match pair {
            PassPair::MaleMale => self.mm += value,
            PassPair::MaleFemale => self.mf += value,
            PassPair::FemaleMale => self.fm += value,
            PassPair::FemaleFemale => self.ff += value,
        }
    }

    pub fn get(&self, pair: PassPair) -> T {
        match pair {
            PassPair::MaleMale => self.mm,
            PassPair::MaleFemale => self.mf,
            PassPair::FemaleMale => self.fm,
            PassPair::FemaleFemale => self.ff,
        }
    }

    pub fn merge(&mut self, other: &Self) {
        self.mm += other.mm;
        self.mf += other.mf;
        self.fm += other.fm;
        self.ff += other.ff;
    }

    pub fn total(&self) -> T {
        let mut total = self.mm;
        total += self.mf;
        total += self.fm;
        total += self.ff;
        total
    }
}

/// Number of women and men on a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SquadRatio {
    pub female: u32,
    pub male: u32,
}

impl SquadRatio {
    pub fn players(&self) -> u32 {
        self.female + self.male
    }
}

impl fmt::Display for SquadRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}F/{}M", self.female, self.male)
    }
}

/// Expected pass counts for `count` passes on a line with the given ratio,
/// if passer and receiver were drawn uniformly without replacement.
///
/// Lines of fewer than two players have no pass pairs and contribute zero.
pub fn expected_passes(ratio: SquadRatio, count: u64) -> PassDistribution<f64> {
    let n = ratio.players() as f64;
    if n < 2.0 {
        return PassDistribution::default();
    }
    let m = ratio.male as f64;
    let f = ratio.female as f64;
    let c = count as f64;
    PassDistribution {
        mm: c * (m / n) * ((m - 1.0) / (n - 1.0)),
        mf: c * (m / n) * (f / (n - 1.0)),
        fm: c * (f / n) * (m / (n - 1.0)),
        ff: c * (f / n) * ((f - 1.0) / (n - 1.0)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
