//! Parsers for the NHL's legacy per-game HTML reports.
//!
//! Two report families are supported:
//!
//! - [`play_by_play`]: the `PL` report, one row per event with the skaters
//!   on ice for both teams
//! - [`time_on_ice`]: the `TH`/`TV` reports, every shift of every player of
//!   the home or visiting team plus per-period summaries
//!
//! Parsing goes through CSS selectors on an html5ever DOM, so the parsers
//! tolerate the reports' unbalanced markup. Both functions are pure: fetching
//! is left to the caller.

pub mod play_by_play;
pub mod time_on_ice;

pub use play_by_play::{parse_play_by_play, OnIcePlayer, PlayReport, ReportPlay};
pub use time_on_ice::{parse_time_on_ice, ReportShift, ToiLine, ToiPlayer, ToiReport};

use nhl_common::{NhlError, Result};
use scraper::{ElementRef, Selector};

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| NhlError::parse("css selector", format!("{css}: {e}")))
}

/// Element text with runs of whitespace (including `&nbsp;`) collapsed.
pub(crate) fn clean_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `td` children of a row, skipping cells of nested tables.
pub(crate) fn direct_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| c.value().name() == "td")
        .collect()
}

/// `"0:28 / 19:32"` into elapsed and remaining seconds.
pub(crate) fn split_clock_pair(raw: &str) -> Option<(u32, u32)> {
    let (elapsed, remaining) = raw.split_once('/')?;
    let elapsed = nhl_common::clock::clock_to_seconds(elapsed).ok()?;
    let remaining = nhl_common::clock::clock_to_seconds(remaining).ok()?;
    Some((elapsed, remaining))
}
