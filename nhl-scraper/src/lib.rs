//! Async scraper for the public NHL data endpoints.
//!
//! [`NhlScraper`] fetches from four host families (the `api-web` JSON API,
//! the stats REST API, the Records API and the legacy HTML reports), maps the
//! payloads into flat records and stamps each result with its source and
//! scrape time as a [`Dataset`]. Play-by-play from the JSON API is merged
//! with the `PL` report so events carry both coordinates and on-ice skaters.
//!
//! - [`endpoints`]: path and query of every upstream resource
//! - [`wire`]: serde shapes of the JSON payloads
//! - [`extract`]: payload to record mapping
//! - [`merge`]: API and report play-by-play reconciliation
//! - [`table`]: flattening records into columns, CSV/TSV output
//! - [`batch`]: bounded-concurrency fan-out over identifiers
//!
//! ```no_run
//! use nhl_common::GameId;
//! use nhl_scraper::NhlScraper;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = nhl_config::NhlConfigLoader::new().with_default_file().load()?;
//! nhl_scraper::init_logging(&config)?;
//!
//! let scraper = NhlScraper::new(&config)?;
//! let pbp = scraper.scrape_pbp(GameId::parse("2023020204")?).await?;
//! print!("{}", pbp.events.to_table()?.to_delimited(','));
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod endpoints;
mod error;
pub mod extract;
pub mod merge;
pub mod model;
mod scraper;
pub mod table;
pub mod wire;

use std::path::PathBuf;

pub use batch::BatchOutcome;
pub use error::{Result, ScrapeError};
pub use model::*;
pub use scraper::NhlScraper;
pub use table::{Dataset, Row, Table};

/// Install the global subscriber described by `config.logging`.
pub fn init_logging(config: &nhl_config::NhlConfig) -> anyhow::Result<PathBuf> {
    nhl_common::observability::init_logging(config.logging.to_log_config())
}
