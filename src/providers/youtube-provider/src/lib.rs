mod listing;
mod mapping;
pub mod models;
mod stream;

use std::time::Duration;

use pace_core::YoutubeConfig;
use reqwest::{redirect, Client};
use thiserror::Error;
use url::Url;

pub use listing::YoutubeListing;
pub use mapping::WATCH_URL_BASE;
pub use stream::{HttpStreamSource, StreamMode};

/// Redirects followed before a request is reported as a redirect loop.
const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid {field} url: {message}")]
    InvalidUrl { field: &'static str, message: String },
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

fn build_client(config: &YoutubeConfig) -> Result<Client, ProviderError> {
    Ok(Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .build()?)
}

fn parse_base(field: &'static str, raw: &str) -> Result<Url, ProviderError> {
    // a missing trailing slash would make `join` replace the last segment
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| ProviderError::InvalidUrl {
        field,
        message: e.to_string(),
    })
}
