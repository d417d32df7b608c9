use pace_audio::{AudioResult, AudioSource, StreamSource};
use pace_core::{ListingItem, SongUrl};

/// One playable track.
///
/// The URL is the identity. Streams are resolved on demand each time the song
/// starts playing and are never kept on the song itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    url: SongUrl,
    cached_title: Option<String>,
}

impl Song {
    pub fn new(url: impl Into<SongUrl>) -> Self {
        Self {
            url: url.into(),
            cached_title: None,
        }
    }

    pub fn with_title(url: impl Into<SongUrl>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cached_title: Some(title.into()),
        }
    }

    pub fn url(&self) -> &SongUrl {
        &self.url
    }

    pub fn cached_title(&self) -> Option<&str> {
        self.cached_title.as_deref()
    }

    pub async fn resolve_stream(&self, source: &dyn StreamSource) -> AudioResult<AudioSource> {
        source.resolve_stream(&self.url).await
    }

    /// The cached title when known, otherwise a lookup through `source`.
    pub async fn resolve_title(&self, source: &dyn StreamSource) -> AudioResult<String> {
        match &self.cached_title {
            Some(title) => Ok(title.clone()),
            None => source.resolve_title(&self.url).await,
        }
    }
}

impl From<ListingItem> for Song {
    fn from(item: ListingItem) -> Self {
        Self {
            url: item.url,
            cached_title: item.title,
        }
    }
}
