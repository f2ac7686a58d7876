use nhl_common::NhlError;
use nhl_config::ConfigError;
use nhl_http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Nhl(#[from] NhlError),

    #[error(transparent)]
    Http(HttpError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The upstream answered 404, e.g. a report that was never published.
    #[error("not found: {url}")]
    NotFound { url: String },

    /// A payload decoded but lacked a key the record shape depends on.
    #[error("unexpected payload from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl ScrapeError {
    pub(crate) fn missing(endpoint: &str, key: &str) -> Self {
        Self::Decode {
            endpoint: endpoint.to_string(),
            message: format!("'{key}' key not found"),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<HttpError> for ScrapeError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Api { status, url, .. } if status.as_u16() == 404 => Self::NotFound { url },
            other => Self::Http(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
