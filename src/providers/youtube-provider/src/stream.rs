use std::error::Error as _;

use async_trait::async_trait;
use pace_audio::{AudioError, AudioResult, AudioSource, StreamSource};
use pace_core::{redact::redact_secrets, SongUrl, YoutubeConfig};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::{build_client, models::OEmbedResponse, ProviderError};

/// How [`HttpStreamSource`] hands a song to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamMode {
    /// Pass the URL through untouched; the sink opens it itself.
    #[default]
    Reference,
    /// Download the resource over HTTP and hand the encoded bytes over.
    Download,
}

/// Stream source over plain HTTP, with titles from an oEmbed endpoint.
#[derive(Debug, Clone)]
pub struct HttpStreamSource {
    client: Client,
    oembed_url: Url,
    mode: StreamMode,
}

impl HttpStreamSource {
    pub fn new(config: &YoutubeConfig, mode: StreamMode) -> Result<Self, ProviderError> {
        let oembed_url = Url::parse(&config.oembed_url).map_err(|e| ProviderError::InvalidUrl {
            field: "oembed_url",
            message: e.to_string(),
        })?;
        Ok(Self {
            client: build_client(config)?,
            oembed_url,
            mode,
        })
    }

    async fn download(&self, url: &SongUrl) -> AudioResult<Vec<u8>> {
        let resp = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;
        check_status(resp.status(), url)?;
        let body = resp.bytes().await.map_err(map_transport_error)?;
        tracing::debug!(url = %url, bytes = body.len(), "downloaded stream");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl StreamSource for HttpStreamSource {
    fn id(&self) -> &str {
        "http"
    }

    async fn resolve_stream(&self, url: &SongUrl) -> AudioResult<AudioSource> {
        match self.mode {
            StreamMode::Reference => Ok(AudioSource::Url(url.to_string())),
            StreamMode::Download => self.download(url).await.map(AudioSource::Bytes),
        }
    }

    async fn resolve_title(&self, url: &SongUrl) -> AudioResult<String> {
        let resp = self
            .client
            .get(self.oembed_url.clone())
            .query(&[("url", url.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(map_transport_error)?;
        check_status(resp.status(), url)?;
        let body: OEmbedResponse = resp
            .json()
            .await
            .map_err(|e| AudioError::Other(e.to_string()))?;
        Ok(body.title)
    }
}

fn check_status(status: StatusCode, url: &SongUrl) -> AudioResult<()> {
    if status.is_success() {
        return Ok(());
    }
    let reason = format!("{url} answered {status}");
    Err(match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => AudioError::Unavailable(reason),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AudioError::Private(reason),
        _ => AudioError::Other(reason),
    })
}

fn map_transport_error(err: reqwest::Error) -> AudioError {
    let message = redact_secrets(&err.to_string()).into_owned();
    if err.is_redirect() {
        return AudioError::TooManyRedirects(message);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionReset {
                return AudioError::ConnectionReset(message);
            }
        }
        source = cause.source();
    }
    AudioError::Other(message)
}
