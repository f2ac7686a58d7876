//! Provenance labels attached to scraped data.

use std::fmt;

use serde::{Serialize, Serializer};

/// Upstream family a dataset was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// `api-web.nhle.com`
    NhlApi,
    /// `api.nhle.com/stats`
    NhlStatsApi,
    /// `records.nhl.com`
    NhlRecordsApi,
    /// `www.nhl.com/scores/htmlreports`
    NhlHtmlReports,
}

impl DataSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NhlApi => "NHL API",
            Self::NhlStatsApi => "NHL Stats API",
            Self::NhlRecordsApi => "NHL Records API",
            Self::NhlHtmlReports => "NHL HTML Reports",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DataSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_label() {
        let v = serde_json::to_value(DataSource::NhlRecordsApi).unwrap();
        assert_eq!(v, serde_json::json!("NHL Records API"));
    }
}
