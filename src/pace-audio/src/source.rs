use async_trait::async_trait;
use pace_core::SongUrl;

use crate::{AudioError, AudioResult, AudioSource};

/// Turns a song URL into something an [`AudioSink`](crate::AudioSink) can play.
#[async_trait]
pub trait StreamSource: Send + Sync {
    fn id(&self) -> &str;

    /// Open the audio stream behind `url`.
    async fn resolve_stream(&self, url: &SongUrl) -> AudioResult<AudioSource>;

    /// Human-readable title for `url`, when the source can look one up.
    async fn resolve_title(&self, url: &SongUrl) -> AudioResult<String>;
}

/// Hands the URL straight to the sink without any network access.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSource;

#[async_trait]
impl StreamSource for ReferenceSource {
    fn id(&self) -> &str {
        "reference"
    }

    async fn resolve_stream(&self, url: &SongUrl) -> AudioResult<AudioSource> {
        Ok(AudioSource::Url(url.as_str().to_string()))
    }

    async fn resolve_title(&self, url: &SongUrl) -> AudioResult<String> {
        Err(AudioError::UnsupportedSource(format!(
            "no title lookup for {url}"
        )))
    }
}
