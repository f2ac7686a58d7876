//! Common types and utilities shared across the NHL scraper crates.
//!
//! This crate holds the pieces every other crate leans on: validated
//! identifiers, clock arithmetic, data-source labels, logging setup and the
//! shared error type. It stays free of HTTP and HTML dependencies so the
//! parsers can use it without pulling in the network stack.
//!
//! # Overview
//!
//! - [`ids`]: validated inputs ([`GameId`], [`Season`], [`TeamAbbrev`], ...)
//! - [`clock`]: `MM:SS` conversions and period/game second arithmetic
//! - [`meta`]: [`DataSource`] labels stamped on every scraped dataset
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`NhlError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use nhl_common::{GameId, Season};
//!
//! let game: GameId = "2023020204".parse().unwrap();
//! assert_eq!(game.report_season(), Season::from_start_year(2023));
//! assert_eq!(game.short_id(), "020204");
//! ```

pub mod clock;
pub mod ids;
pub mod meta;
pub mod observability;

pub use ids::{
    DraftRound, DraftYear, GameId, PlayerId, RankingCategory, RoundNo, Season, SessionType,
    StandingsDate, TeamAbbrev,
};
pub use meta::DataSource;

/// Error types shared by the scraper crates.
#[derive(thiserror::Error, Debug)]
pub enum NhlError {
    /// A caller-supplied identifier failed validation.
    #[error("invalid {kind}: {value:?} ({reason})")]
    InvalidInput {
        kind: &'static str,
        value: String,
        reason: String,
    },

    /// An upstream payload could not be interpreted.
    #[error("parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// Upstream answered, but without any usable records.
    #[error("no data: {0}")]
    NoData(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NhlError {
    pub fn invalid(kind: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            kind,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn parse(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

/// Convenient alias for results that use [`NhlError`].
pub type Result<T> = std::result::Result<T, NhlError>;
