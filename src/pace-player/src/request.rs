//! Classification of user-supplied URLs into play requests.

use pace_core::{PlaylistId, SongUrl};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("not a url: {0}")]
    Malformed(String),
    #[error("unsupported url scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("url has no host")]
    MissingHost,
}

/// What an enqueue request refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayRequest {
    Song(SongUrl),
    Playlist(PlaylistId),
}

/// Validate `input` and decide whether it names a playlist or a single song.
///
/// Only absolute `http`/`https` URLs with a host are accepted. A URL carrying a
/// non-empty `list` parameter is a playlist; anything else is a song and keeps
/// its original spelling as identity.
pub fn classify_url(input: &str) -> Result<PlayRequest, UrlError> {
    let trimmed = input.trim();
    let parsed = Url::parse(trimmed).map_err(|e| UrlError::Malformed(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::UnsupportedScheme(other.to_string())),
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(match playlist_id_in(&parsed) {
        Some(id) => PlayRequest::Playlist(id),
        None => PlayRequest::Song(SongUrl::new(trimmed)),
    })
}

/// Extract the playlist id from the `list` query parameter.
///
/// Only the query counts, never the fragment. An empty value is no playlist.
///
/// ```
/// use pace_player::playlist_id;
///
/// let id = playlist_id("https://www.youtube.com/watch?v=abc&list=PL123&index=2");
/// assert_eq!(id.unwrap().to_string(), "PL123");
/// assert!(playlist_id("https://example.com/?blacklist=PL123").is_none());
/// ```
pub fn playlist_id(url: &str) -> Option<PlaylistId> {
    let parsed = Url::parse(url.trim()).ok()?;
    playlist_id_in(&parsed)
}

fn playlist_id_in(url: &Url) -> Option<PlaylistId> {
    let (_, id) = url.query_pairs().find(|(name, _)| name == "list")?;
    (!id.is_empty()).then(|| PlaylistId::new(id.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_url_is_a_song() {
        let request = classify_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(
            request,
            PlayRequest::Song(SongUrl::from("https://www.youtube.com/watch?v=dQw4w9WgXcQ"))
        );
    }

    #[test]
    fn list_parameter_makes_a_playlist() {
        let request =
            classify_url("https://www.youtube.com/playlist?list=PLrAXtmErZgOe").unwrap();
        assert_eq!(request, PlayRequest::Playlist(PlaylistId::from("PLrAXtmErZgOe")));
    }

    #[test]
    fn list_parameter_after_video_id() {
        let id = playlist_id("https://www.youtube.com/watch?v=abc&list=PL9&index=3").unwrap();
        assert_eq!(id, PlaylistId::from("PL9"));
    }

    #[test]
    fn list_value_stops_at_fragment() {
        let id = playlist_id("https://www.youtube.com/playlist?list=PL9#top").unwrap();
        assert_eq!(id, PlaylistId::from("PL9"));
    }

    #[test]
    fn empty_list_value_is_a_song() {
        assert!(playlist_id("https://www.youtube.com/watch?v=abc&list=").is_none());
        assert!(matches!(
            classify_url("https://www.youtube.com/watch?v=abc&list=&t=4"),
            Ok(PlayRequest::Song(_))
        ));
    }

    #[test]
    fn look_alike_parameters_are_ignored() {
        assert!(playlist_id("https://example.com/watch?v=a&blacklist=x").is_none());
        assert_eq!(
            playlist_id("https://example.com/watch?playlist=x&list=PL2"),
            Some(PlaylistId::from("PL2"))
        );
    }

    #[test]
    fn list_inside_fragment_is_not_a_playlist() {
        let url = "https://www.youtube.com/watch?v=abc#t?list=PLfrag";
        assert!(playlist_id(url).is_none());
        assert_eq!(classify_url(url), Ok(PlayRequest::Song(SongUrl::from(url))));
    }

    #[test]
    fn rejects_non_urls() {
        assert!(matches!(classify_url("not a url"), Err(UrlError::Malformed(_))));
        assert!(matches!(
            classify_url("ftp://example.com/song.mp3"),
            Err(UrlError::UnsupportedScheme(scheme)) if scheme == "ftp"
        ));
        assert!(classify_url("").is_err());
    }
}
