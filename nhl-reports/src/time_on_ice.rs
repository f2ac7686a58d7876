//! The `TH` / `TV` (time on ice) reports.
//!
//! The report lists one block per player: a `td.playerHeading` cell such as
//! `14 SUZUKI, NICK`, then one six-cell row per shift and one seven-cell row
//! per period in the summary table that closes the block with a `TOT` row.

use nhl_common::clock::{clock_to_seconds, parse_period};
use nhl_common::Result;
use scraper::Html;
use serde::Serialize;

use crate::{clean_text, direct_cells, selector, split_clock_pair};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportShift {
    pub shift_number: u32,
    pub period: u8,
    pub start_elapsed_secs: u32,
    pub start_remaining_secs: u32,
    pub end_elapsed_secs: u32,
    pub end_remaining_secs: u32,
    pub duration_secs: u32,
    /// `G` goal, `P` penalty, or empty.
    pub event: Option<String>,
}

/// One summary line; `period` is `None` for the `TOT` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToiLine {
    pub period: Option<u8>,
    pub shifts: u32,
    pub average_secs: u32,
    pub toi_secs: u32,
    pub even_strength_secs: u32,
    pub power_play_secs: u32,
    pub short_handed_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToiPlayer {
    pub sweater_number: Option<u32>,
    pub first_name: String,
    pub last_name: String,
    pub shifts: Vec<ReportShift>,
    pub summary: Vec<ToiLine>,
}

impl ToiPlayer {
    fn from_heading(text: &str) -> Self {
        let (number, name) = match text.split_once(' ') {
            Some((n, rest)) if n.bytes().all(|b| b.is_ascii_digit()) => (n.parse().ok(), rest),
            _ => (None, text),
        };
        let (last, first) = name.split_once(',').unwrap_or((name, ""));
        Self {
            sweater_number: number,
            first_name: first.trim().to_string(),
            last_name: last.trim().to_string(),
            shifts: Vec::new(),
            summary: Vec::new(),
        }
    }

    pub fn full_name(&self) -> String {
        if self.first_name.is_empty() {
            self.last_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToiReport {
    pub team_name: Option<String>,
    pub players: Vec<ToiPlayer>,
}

/// Parse a `TH` or `TV` report.
pub fn parse_time_on_ice(html: &str) -> Result<ToiReport> {
    let doc = Html::parse_document(html);
    let team = selector("td.teamHeading")?;
    let walk = selector("td.playerHeading, tr.evenColor, tr.oddColor")?;

    let team_name = doc
        .root_element()
        .select(&team)
        .map(clean_text)
        .find(|t| !t.is_empty());

    let mut players: Vec<ToiPlayer> = Vec::new();
    for el in doc.root_element().select(&walk) {
        if el.value().name() == "td" {
            players.push(ToiPlayer::from_heading(&clean_text(el)));
            continue;
        }
        let Some(player) = players.last_mut() else {
            continue;
        };
        let cells: Vec<String> = direct_cells(el).into_iter().map(clean_text).collect();
        match cells.len() {
            6 => player.shifts.extend(shift_row(&cells)),
            7 => player.summary.extend(summary_row(&cells)),
            _ => {}
        }
    }

    tracing::debug!(
        team = ?team_name,
        players = players.len(),
        shifts = players.iter().map(|p| p.shifts.len()).sum::<usize>(),
        "report.parse.time_on_ice"
    );
    Ok(ToiReport { team_name, players })
}

fn shift_row(cells: &[String]) -> Option<ReportShift> {
    let shift_number = cells[0].parse().ok()?;
    let period = parse_period(&cells[1]).ok()?;
    let (start_elapsed_secs, start_remaining_secs) = split_clock_pair(&cells[2])?;
    let (end_elapsed_secs, end_remaining_secs) = split_clock_pair(&cells[3])?;
    let duration_secs = clock_to_seconds(&cells[4]).ok()?;
    Some(ReportShift {
        shift_number,
        period,
        start_elapsed_secs,
        start_remaining_secs,
        end_elapsed_secs,
        end_remaining_secs,
        duration_secs,
        event: Some(cells[5].clone()).filter(|e| !e.is_empty()),
    })
}

fn summary_row(cells: &[String]) -> Option<ToiLine> {
    let period = if cells[0].eq_ignore_ascii_case("TOT") {
        None
    } else {
        Some(parse_period(&cells[0]).ok()?)
    };
    let secs = |i: usize| clock_to_seconds(&cells[i]).ok();
    Some(ToiLine {
        period,
        shifts: cells[1].parse().ok()?,
        average_secs: secs(2)?,
        toi_secs: secs(3)?,
        even_strength_secs: secs(4)?,
        power_play_secs: secs(5)?,
        short_handed_secs: secs(6)?,
    })
}
