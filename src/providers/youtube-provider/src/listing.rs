use async_trait::async_trait;
use pace_core::{
    redact::redact_secrets, ListingError, ListingPage, ListingResult, PageToken, PlaylistId,
    PlaylistListing, YoutubeConfig,
};
use reqwest::{Client, Response};
use url::Url;

use crate::{
    build_client,
    mapping::map_page,
    models::{ErrorResponse, PlaylistItemListResponse},
    parse_base, ProviderError,
};

/// Playlist listing backed by the YouTube Data API `playlistItems` endpoint.
#[derive(Clone)]
pub struct YoutubeListing {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for YoutubeListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoutubeListing")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl YoutubeListing {
    pub fn new(config: &YoutubeConfig, api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(config)?,
            base_url: parse_base("api_base_url", &config.api_base_url)?,
            api_key: api_key.into(),
        })
    }

    fn request_url(
        &self,
        playlist_id: &PlaylistId,
        page_token: Option<&PageToken>,
        page_size: u32,
    ) -> ListingResult<Url> {
        let mut url = self
            .base_url
            .join("playlistItems")
            .map_err(|e| ListingError::Network {
                message: e.to_string(),
            })?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("part", "snippet,contentDetails")
                .append_pair("playlistId", playlist_id.as_ref())
                .append_pair("maxResults", &page_size.to_string())
                .append_pair("key", &self.api_key);
            if let Some(token) = page_token {
                query.append_pair("pageToken", token.as_ref());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl PlaylistListing for YoutubeListing {
    fn id(&self) -> &str {
        "youtube"
    }

    async fn fetch_page(
        &self,
        playlist_id: &PlaylistId,
        page_token: Option<&PageToken>,
        page_size: u32,
    ) -> ListingResult<ListingPage> {
        let url = self.request_url(playlist_id, page_token, page_size)?;
        tracing::debug!(url = %redact_secrets(url.as_str()), "requesting playlist items");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ListingError::Network {
                message: redact_secrets(&e.to_string()).into_owned(),
            })?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        let body: PlaylistItemListResponse =
            resp.json().await.map_err(|e| ListingError::Decode {
                message: redact_secrets(&e.to_string()).into_owned(),
            })?;
        Ok(map_page(body))
    }
}

/// Turn a non-success response into a structured API error, keeping the
/// remote's own message when the body carries one.
async fn api_error(resp: Response) -> ListingError {
    let status = resp.status();
    let message = match resp.bytes().await {
        Ok(body) => serde_json::from_slice::<ErrorResponse>(&body)
            .map(|parsed| parsed.error.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string()),
        Err(e) => redact_secrets(&e.to_string()).into_owned(),
    };
    tracing::warn!(status = status.as_u16(), message = %message, "playlist items request failed");
    ListingError::api(status.as_u16(), message)
}
