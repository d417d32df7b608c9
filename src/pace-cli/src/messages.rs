//! User-facing wording for player outcomes and notices.

use pace_player::{MessageCategory, Notice, Outcome};

/// Text for the reply to a command. `input` is what the user typed, used by
/// messages that quote it back.
pub fn render_outcome(outcome: &Outcome, input: Option<&str>) -> String {
    render(outcome.category, input, outcome.added_count(), None)
}

pub fn render_notice(notice: &Notice) -> String {
    render(
        notice.category,
        notice.url.as_ref().map(|url| url.as_str()),
        None,
        notice.detail.as_deref(),
    )
}

fn render(
    category: MessageCategory,
    url: Option<&str>,
    added: Option<u32>,
    detail: Option<&str>,
) -> String {
    let url = url.unwrap_or("");
    match category {
        MessageCategory::SongsQueued => format!("{} songs queued", added.unwrap_or(0)),
        MessageCategory::InvalidUrl | MessageCategory::VideoUnavailable => {
            format!("It looks like \"{url}\" isn't a valid url")
        }
        MessageCategory::PlaylistForbidden => {
            "Youtube is telling me I am not allowed to access this playlist".into()
        }
        MessageCategory::PlaylistNotFound => {
            "Youtube is telling me that this playlist doesn't exist".into()
        }
        MessageCategory::PlaylistFetchFailed => {
            "An error has occured while fetching the playlist".into()
        }
        MessageCategory::NothingQueued => "There are not queued song".into(),
        MessageCategory::QueueExhausted => "There aren't any song left to play".into(),
        MessageCategory::PlayingNext => "Playing the next song".into(),
        MessageCategory::NoSong => "There aren't any song playing".into(),
        MessageCategory::AlreadyPaused => "Song already paused".into(),
        MessageCategory::Paused => "Song paused".into(),
        MessageCategory::AlreadyPlaying => "The song isn't paused".into(),
        MessageCategory::Resumed => "Song resumed".into(),
        MessageCategory::QueueAlreadyEmpty => "The queue is already empty".into(),
        MessageCategory::Cleared => "Current song stopped and queue emptied".into(),
        MessageCategory::PrivateVideo => "Youtube is telling me that this video is private".into(),
        MessageCategory::StreamReadError => {
            format!("An error has occured while playing the song at {url}")
        }
        MessageCategory::TooManyRedirects => {
            format!("An error has occured while trying to play the song at {url}")
        }
        MessageCategory::UnknownPlaybackError => match detail {
            Some(detail) => format!("Unknown error message: \"{detail}\""),
            None => format!("An error has occured while trying to play the song at {url}"),
        },
        MessageCategory::ServiceStopped => "The player has stopped".into(),
    }
}
