//! The `PL` (play-by-play) report.
//!
//! Event rows carry eight direct cells: number, period, strength, time
//! (elapsed above remaining), event code, description, then the away and home
//! skaters on ice. Each skater is a `<font title="Position - NAME">NN</font>`.

use nhl_common::clock::{clock_to_seconds, parse_period};
use nhl_common::Result;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::{clean_text, direct_cells, selector};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnIcePlayer {
    pub sweater_number: u32,
    /// As printed in the report, e.g. `Center`, `Defense`, `Goalie`.
    pub position: String,
    pub name: String,
    pub is_goalie: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPlay {
    pub number: u32,
    pub period: u8,
    pub strength: Option<String>,
    pub elapsed_secs: u32,
    pub remaining_secs: Option<u32>,
    pub event_code: String,
    pub description: String,
    /// Leading team token of the description, when it names one of the teams.
    pub event_team: Option<String>,
    pub away_on_ice: Vec<OnIcePlayer>,
    pub home_on_ice: Vec<OnIcePlayer>,
}

impl ReportPlay {
    pub fn away_skaters(&self) -> usize {
        self.away_on_ice.iter().filter(|p| !p.is_goalie).count()
    }

    pub fn home_skaters(&self) -> usize {
        self.home_on_ice.iter().filter(|p| !p.is_goalie).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayReport {
    pub away_abbrev: Option<String>,
    pub home_abbrev: Option<String>,
    pub plays: Vec<ReportPlay>,
}

/// Parse a `PL` report. Rows that are not events (headers, page breaks) are skipped.
pub fn parse_play_by_play(html: &str) -> Result<PlayReport> {
    let doc = Html::parse_document(html);
    let rows = selector("tr.evenColor, tr.oddColor")?;
    let headings = selector("td.heading")?;
    let skaters = selector("font[title]")?;

    // Column headings read "MTL On Ice"; the away column comes first.
    let mut on_ice_teams = doc
        .root_element()
        .select(&headings)
        .map(clean_text)
        .filter_map(|t| t.strip_suffix("On Ice").map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty());
    let away_abbrev = on_ice_teams.next();
    let home_abbrev = on_ice_teams.next();

    let mut plays = Vec::new();
    for row in doc.root_element().select(&rows) {
        let cells = direct_cells(row);
        if cells.len() < 6 {
            continue;
        }
        let Ok(number) = clean_text(cells[0]).parse::<u32>() else {
            continue;
        };
        let period = match parse_period(&clean_text(cells[1])) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(number, error = %e, "report.parse.skip_row");
                continue;
            }
        };

        let mut clocks = cells[3].text().map(str::trim).filter(|s| !s.is_empty());
        let Ok(elapsed_secs) = clock_to_seconds(clocks.next().unwrap_or("")) else {
            tracing::debug!(number, "report.parse.skip_row");
            continue;
        };
        let remaining_secs = clocks.next().and_then(|c| clock_to_seconds(c).ok());

        let strength = Some(clean_text(cells[2])).filter(|s| !s.is_empty());
        let description = clean_text(cells[5]);
        let event_team = description
            .split(' ')
            .next()
            .filter(|t| Some(*t) == away_abbrev.as_deref() || Some(*t) == home_abbrev.as_deref())
            .map(str::to_string);

        plays.push(ReportPlay {
            number,
            period,
            strength,
            elapsed_secs,
            remaining_secs,
            event_code: clean_text(cells[4]).to_ascii_uppercase(),
            description,
            event_team,
            away_on_ice: cells.get(6).map(|c| on_ice(*c, &skaters)).unwrap_or_default(),
            home_on_ice: cells.get(7).map(|c| on_ice(*c, &skaters)).unwrap_or_default(),
        });
    }

    tracing::debug!(
        plays = plays.len(),
        away = ?away_abbrev,
        home = ?home_abbrev,
        "report.parse.play_by_play"
    );
    Ok(PlayReport {
        away_abbrev,
        home_abbrev,
        plays,
    })
}

fn on_ice(cell: ElementRef<'_>, skaters: &Selector) -> Vec<OnIcePlayer> {
    cell.select(skaters)
        .filter_map(|font| {
            let sweater_number = clean_text(font).parse::<u32>().ok()?;
            let title = font.value().attr("title")?;
            let (position, name) = title.split_once(" - ").unwrap_or((title, ""));
            Some(OnIcePlayer {
                sweater_number,
                position: position.trim().to_string(),
                name: name.trim().to_string(),
                is_goalie: position.trim().eq_ignore_ascii_case("goalie"),
            })
        })
        .collect()
}
