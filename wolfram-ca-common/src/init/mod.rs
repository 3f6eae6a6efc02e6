use std::{fmt, str::FromStr};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A non-empty string of `0`s and `1`s, repeated left to right across a row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern(String);

impl Pattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        if !pattern.is_empty() && pattern.bytes().all(|b| b == b'0' || b == b'1') {
            Ok(Self(pattern.to_owned()))
        } else {
            Err(Error::invalid_argument(format!(
                "initial pattern must match ^[01]+$, got {pattern:?}"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn tile(&self, cells: usize) -> Vec<bool> {
        self.0.bytes().map(|b| b == b'1').cycle().take(cells).collect()
    }
}

impl TryFrom<String> for Pattern {
    type Error = Error;

    fn try_from(pattern: String) -> Result<Self> {
        Self::parse(&pattern)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.0
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Random seed; zero asks for a fresh entropy-seeded generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(i64);

impl Seed {
    pub const ENTROPY: Seed = Seed(0);

    pub fn new(seed: i64) -> Self {
        Self(seed)
    }

    pub fn inner(&self) -> i64 {
        self.0
    }

    pub fn is_explicit(&self) -> bool {
        self.0 != 0
    }

    /// The same nonzero seed yields the same stream on every platform.
    pub fn rng(&self) -> ChaCha8Rng {
        if self.is_explicit() {
            ChaCha8Rng::seed_from_u64(self.0 as u64)
        } else {
            ChaCha8Rng::from_entropy()
        }
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of an initialization policy as it appears in requests and configs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartType {
    Left,
    Middle,
    Right,
    #[default]
    Random,
}

impl StartType {
    pub const ALL: [StartType; 4] = [
        StartType::Left,
        StartType::Middle,
        StartType::Right,
        StartType::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StartType::Left => "left",
            StartType::Middle => "middle",
            StartType::Right => "right",
            StartType::Random => "random",
        }
    }
}

impl FromStr for StartType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|start| start.as_str() == s)
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "unknown start type {s:?}, expected one of left, middle, right, random"
                ))
            })
    }
}

impl fmt::Display for StartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitPolicy {
    SingleLeft,
    SingleMiddle,
    SingleRight,
    /// Tiles `pattern` when present, otherwise draws one random bit per cell.
    PatternOrRandom {
        pattern: Option<Pattern>,
        seed: Seed,
    },
}

impl InitPolicy {
    pub fn from_start(start: StartType, pattern: Option<Pattern>, seed: Seed) -> Self {
        match start {
            StartType::Left => InitPolicy::SingleLeft,
            StartType::Middle => InitPolicy::SingleMiddle,
            StartType::Right => InitPolicy::SingleRight,
            StartType::Random => InitPolicy::PatternOrRandom { pattern, seed },
        }
    }

    pub fn start_type(&self) -> StartType {
        match self {
            InitPolicy::SingleLeft => StartType::Left,
            InitPolicy::SingleMiddle => StartType::Middle,
            InitPolicy::SingleRight => StartType::Right,
            InitPolicy::PatternOrRandom { .. } => StartType::Random,
        }
    }

    /// Builds the first generation, seeding a generator of its own if one is needed.
    pub fn initial_row(&self, cells: usize) -> Result<Vec<bool>> {
        check_cells(cells)?;
        let row = match self {
            InitPolicy::SingleLeft => single(cells, 0),
            InitPolicy::SingleMiddle => single(cells, cells / 2),
            InitPolicy::SingleRight => single(cells, cells - 1),
            InitPolicy::PatternOrRandom {
                pattern: Some(pattern),
                ..
            } => pattern.tile(cells),
            InitPolicy::PatternOrRandom {
                pattern: None,
                seed,
            } => random(cells, &mut seed.rng()),
        };
        Ok(row)
    }

    /// Like [`InitPolicy::initial_row`], drawing random cells from `rng` instead.
    pub fn initial_row_with<R: Rng + ?Sized>(&self, cells: usize, rng: &mut R) -> Result<Vec<bool>> {
        match self {
            InitPolicy::PatternOrRandom { pattern: None, .. } => {
                check_cells(cells)?;
                Ok(random(cells, rng))
            }
            _ => self.initial_row(cells),
        }
    }
}

fn check_cells(cells: usize) -> Result<()> {
    if cells == 0 {
        return Err(Error::invalid_argument("row must contain at least one cell"));
    }
    Ok(())
}

fn single(cells: usize, on: usize) -> Vec<bool> {
    let mut row = vec![false; cells];
    row[on] = true;
    row
}

fn random<R: Rng + ?Sized>(cells: usize, rng: &mut R) -> Vec<bool> {
    (0..cells).map(|_| rng.gen_bool(0.5)).collect()
}
