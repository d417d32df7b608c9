use serde::{Deserialize, Serialize};

/// The URL identifying a single playable song.
///
/// Treated as an opaque, case-sensitive identity; two songs with the same URL
/// are the same song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct SongUrl(pub String);

impl SongUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SongUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SongUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SongUrl {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for SongUrl {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a remote playlist, as extracted from a `list=` URL parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct PlaylistId(pub String);

impl PlaylistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for PlaylistId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlaylistId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for PlaylistId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Continuation token returned by the listing API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageToken(pub String);

impl PageToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl AsRef<str> for PageToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PageToken {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// One song reference inside a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingItem {
    pub url: SongUrl,
    /// Title when the listing API returned one alongside the item.
    pub title: Option<String>,
}

impl ListingItem {
    pub fn new(url: impl Into<SongUrl>) -> Self {
        Self {
            url: url.into(),
            title: None,
        }
    }

    pub fn with_title(url: impl Into<SongUrl>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: Some(title.into()),
        }
    }
}

/// A single page of playlist items plus an optional continuation token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPage {
    pub items: Vec<ListingItem>,
    pub next_page_token: Option<PageToken>,
    /// Total number of items in the playlist, as reported by the remote.
    pub total_count: u32,
}

impl ListingPage {
    pub fn last(items: Vec<ListingItem>, total_count: u32) -> Self {
        Self {
            items,
            next_page_token: None,
            total_count,
        }
    }

    pub fn item_urls(&self) -> impl Iterator<Item = &SongUrl> {
        self.items.iter().map(|item| &item.url)
    }
}
