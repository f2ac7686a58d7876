//! Validated identifiers accepted by the scraper façade.
//!
//! Every constructor rejects malformed input with [`NhlError::InvalidInput`]
//! so that no request is issued for an identifier the upstream API would
//! refuse anyway.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{NhlError, Result};

/// First year the NHL entry draft was held in its modern form.
pub const FIRST_DRAFT_YEAR: u16 = 1963;

/// Ten-digit game identifier: `SSSS` season start, `TT` game type, `NNNN` number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId(u64);

impl GameId {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self> {
        let raw = raw.as_ref().trim();
        if raw.len() != 10 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NhlError::invalid(
                "game id",
                raw,
                "must be a 10-digit number",
            ));
        }
        raw.parse::<u64>()
            .map(Self)
            .map_err(|e| NhlError::invalid("game id", raw, e.to_string()))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn season_start_year(&self) -> u16 {
        (self.0 / 1_000_000) as u16
    }

    /// `01` preseason, `02` regular season, `03` playoffs.
    pub fn game_type(&self) -> u8 {
        ((self.0 / 10_000) % 100) as u8
    }

    /// The last six digits, as used in legacy report file names.
    pub fn short_id(&self) -> String {
        format!("{:06}", self.0 % 1_000_000)
    }

    pub fn report_season(&self) -> Season {
        Season::from_start_year(self.season_start_year())
    }
}

impl FromStr for GameId {
    type Err = NhlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<u64> for GameId {
    type Error = NhlError;

    fn try_from(value: u64) -> Result<Self> {
        Self::parse(value.to_string())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010}", self.0)
    }
}

/// Season in `YYYYYYYY` form, e.g. `20232024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Season {
    start: u16,
}

impl Season {
    pub fn from_start_year(start: u16) -> Self {
        Self { start }
    }

    pub fn parse(raw: impl AsRef<str>) -> Result<Self> {
        let raw = raw.as_ref().trim();
        if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NhlError::invalid(
                "season",
                raw,
                "must use the 'YYYYYYYY' format",
            ));
        }
        let start: u16 = raw[..4]
            .parse()
            .map_err(|e: std::num::ParseIntError| NhlError::invalid("season", raw, e.to_string()))?;
        let end: u16 = raw[4..]
            .parse()
            .map_err(|e: std::num::ParseIntError| NhlError::invalid("season", raw, e.to_string()))?;
        if end != start + 1 {
            return Err(NhlError::invalid(
                "season",
                raw,
                "second year must follow the first",
            ));
        }
        Ok(Self { start })
    }

    pub fn start_year(&self) -> u16 {
        self.start
    }

    pub fn end_year(&self) -> u16 {
        self.start + 1
    }
}

impl FromStr for Season {
    type Err = NhlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<u32> for Season {
    type Error = NhlError;

    fn try_from(value: u32) -> Result<Self> {
        Self::parse(value.to_string())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.end_year())
    }
}

/// Upper-cased team abbreviation such as `MTL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TeamAbbrev(String);

impl TeamAbbrev {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self> {
        let raw = raw.as_ref().trim();
        if !(2..=3).contains(&raw.len()) || !raw.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(NhlError::invalid(
                "team abbreviation",
                raw,
                "expected 2-3 letters, e.g. 'MTL'",
            ));
        }
        Ok(Self(raw.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TeamAbbrev {
    type Err = NhlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TeamAbbrev {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Portion of the season a request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Preseason,
    #[default]
    Regular,
    Playoffs,
}

impl SessionType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Preseason => 1,
            Self::Regular => 2,
            Self::Playoffs => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Preseason => "preseason",
            Self::Regular => "regular",
            Self::Playoffs => "playoffs",
        }
    }
}

impl TryFrom<u8> for SessionType {
    type Error = NhlError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Self::Preseason),
            2 => Ok(Self::Regular),
            3 => Ok(Self::Playoffs),
            other => Err(NhlError::invalid(
                "session",
                other,
                "expected 1 (preseason), 2 (regular) or 3 (playoffs)",
            )),
        }
    }
}

impl FromStr for SessionType {
    type Err = NhlError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return Self::try_from(code);
        }
        match s.to_ascii_lowercase().as_str() {
            "preseason" => Ok(Self::Preseason),
            "regular" => Ok(Self::Regular),
            "playoffs" => Ok(Self::Playoffs),
            _ => Err(NhlError::invalid(
                "session",
                s,
                "expected preseason, regular or playoffs",
            )),
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DraftYear(u16);

impl DraftYear {
    pub fn new(year: u16) -> Result<Self> {
        if year < FIRST_DRAFT_YEAR {
            return Err(NhlError::invalid(
                "draft year",
                year,
                format!("must be >= {FIRST_DRAFT_YEAR}"),
            ));
        }
        Ok(Self(year))
    }

    pub fn get(&self) -> u16 {
        self.0
    }

    /// Rounds held in this year's draft.
    pub fn max_round(&self) -> u8 {
        if self.0 < 2005 { 25 } else { 7 }
    }
}

impl fmt::Display for DraftYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A round number already checked against its draft year. Only built by
/// [`DraftRound::number`] and [`DraftRound::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundNo(u8);

impl RoundNo {
    pub fn get(self) -> u8 {
        self.0
    }
}

/// Either every round of a draft or a single round valid for its year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DraftRound {
    #[default]
    All,
    Number(RoundNo),
}

impl DraftRound {
    pub fn number(round: u8, year: DraftYear) -> Result<Self> {
        let max = year.max_round();
        if round == 0 || round > max {
            return Err(NhlError::invalid(
                "draft round",
                round,
                format!("the {year} draft has rounds 1-{max}"),
            ));
        }
        Ok(Self::Number(RoundNo(round)))
    }

    pub fn parse(raw: &str, year: DraftYear) -> Result<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let round = raw
            .parse::<u8>()
            .map_err(|_| NhlError::invalid("draft round", raw, "expected an integer or 'all'"))?;
        Self::number(round, year)
    }

    /// The single round, `None` for [`DraftRound::All`].
    pub fn round(self) -> Option<u8> {
        match self {
            Self::All => None,
            Self::Number(n) => Some(n.get()),
        }
    }
}

impl fmt::Display for DraftRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Number(n) => write!(f, "{}", n.get()),
        }
    }
}

/// Central Scouting ranking lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RankingCategory {
    #[default]
    NorthAmericanSkater,
    InternationalSkater,
    NorthAmericanGoalie,
    InternationalGoalie,
}

impl RankingCategory {
    pub const ALL: [RankingCategory; 4] = [
        Self::NorthAmericanSkater,
        Self::InternationalSkater,
        Self::NorthAmericanGoalie,
        Self::InternationalGoalie,
    ];

    pub fn code(&self) -> u8 {
        match self {
            Self::NorthAmericanSkater => 1,
            Self::InternationalSkater => 2,
            Self::NorthAmericanGoalie => 3,
            Self::InternationalGoalie => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NorthAmericanSkater => "north-american-skater",
            Self::InternationalSkater => "international-skater",
            Self::NorthAmericanGoalie => "north-american-goalie",
            Self::InternationalGoalie => "international-goalie",
        }
    }
}

impl TryFrom<u8> for RankingCategory {
    type Error = NhlError;

    fn try_from(code: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| NhlError::invalid("ranking category", code, "expected 1-4"))
    }
}

impl FromStr for RankingCategory {
    type Err = NhlError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return Self::try_from(code);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| NhlError::invalid("ranking category", s, "unknown category name"))
    }
}

/// Standings snapshot date; `Now` asks the API for the current table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StandingsDate {
    #[default]
    Now,
    On(NaiveDate),
}

impl FromStr for StandingsDate {
    type Err = NhlError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("now") {
            return Ok(Self::Now);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self::On)
            .map_err(|_| NhlError::invalid("date", s, "expected YYYY-MM-DD"))
    }
}

impl From<NaiveDate> for StandingsDate {
    fn from(date: NaiveDate) -> Self {
        Self::On(date)
    }
}

impl fmt::Display for StandingsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Now => f.write_str("now"),
            Self::On(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(u64);

impl PlayerId {
    pub fn new(id: u64) -> Result<Self> {
        if id == 0 {
            return Err(NhlError::invalid("player id", id, "must be positive"));
        }
        Ok(Self(id))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl FromStr for PlayerId {
    type Err = NhlError;

    fn from_str(s: &str) -> Result<Self> {
        let id = s
            .trim()
            .parse::<u64>()
            .map_err(|_| NhlError::invalid("player id", s, "expected a positive integer"))?;
        Self::new(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
