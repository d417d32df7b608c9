use serde::{Deserialize, Serialize};

/// What happened, independent of how it is worded for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    SongsQueued,
    InvalidUrl,
    PlaylistForbidden,
    PlaylistNotFound,
    PlaylistFetchFailed,
    NothingQueued,
    QueueExhausted,
    PlayingNext,
    NoSong,
    AlreadyPaused,
    Paused,
    AlreadyPlaying,
    Resumed,
    QueueAlreadyEmpty,
    Cleared,
    VideoUnavailable,
    PrivateVideo,
    StreamReadError,
    TooManyRedirects,
    UnknownPlaybackError,
    ServiceStopped,
}

/// Structured payload carried by a successful [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeData {
    Added { added: u32 },
}

/// Result envelope returned by every control operation.
///
/// Failures are values: callers branch on [`Outcome::failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub data: Option<OutcomeData>,
    pub failed: bool,
    pub category: MessageCategory,
}

impl Outcome {
    pub fn success(category: MessageCategory) -> Self {
        Self {
            data: None,
            failed: false,
            category,
        }
    }

    pub fn failure(category: MessageCategory) -> Self {
        Self {
            data: None,
            failed: true,
            category,
        }
    }

    pub fn added(added: u32) -> Self {
        Self {
            data: Some(OutcomeData::Added { added }),
            failed: false,
            category: MessageCategory::SongsQueued,
        }
    }

    /// Number of songs added, for enqueue outcomes.
    pub fn added_count(&self) -> Option<u32> {
        match self.data {
            Some(OutcomeData::Added { added }) => Some(added),
            None => None,
        }
    }
}
