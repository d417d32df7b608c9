use crate::models::{ListingPage, PageToken, PlaylistId};
use thiserror::Error;

/// Failures surfaced by a remote listing API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListingError {
    /// The remote answered with a structured error body.
    #[error("listing api error {http_status}: {message}")]
    Api { http_status: u16, message: String },
    #[error("network error: {message}")]
    Network { message: String },
    #[error("malformed listing response: {message}")]
    Decode { message: String },
}

impl ListingError {
    pub fn api(http_status: u16, message: impl Into<String>) -> Self {
        ListingError::Api {
            http_status,
            message: message.into(),
        }
    }

    /// HTTP status of a structured API error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ListingError::Api { http_status, .. } => Some(*http_status),
            _ => None,
        }
    }
}

pub type ListingResult<T> = Result<T, ListingError>;

/// Remote playlist listing interface.
///
/// Implementations fetch one page of a playlist per call and must not buffer
/// beyond the page they return; pagination state lives with the caller.
#[async_trait::async_trait]
pub trait PlaylistListing: Send + Sync {
    /// Stable listing identifier (e.g., "youtube").
    fn id(&self) -> &str;

    /// Fetch up to `page_size` items of `playlist_id`, starting at `page_token`
    /// (the first page when `None`).
    async fn fetch_page(
        &self,
        playlist_id: &PlaylistId,
        page_token: Option<&PageToken>,
        page_size: u32,
    ) -> ListingResult<ListingPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_only_for_api_errors() {
        assert_eq!(ListingError::api(403, "forbidden").http_status(), Some(403));
        let network = ListingError::Network {
            message: "timed out".into(),
        };
        assert_eq!(network.http_status(), None);
    }
}
