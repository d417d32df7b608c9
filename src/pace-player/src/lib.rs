mod controller;
mod failure;
mod outcome;
mod playlist;
mod queue;
mod request;
mod service;
mod song;
#[cfg(test)]
mod testing;

pub use controller::{
    Collaborators, ControllerOptions, EventStreams, Notice, PlaybackController, SessionEvent,
    Status, DEFAULT_PAGE_SIZE,
};
pub use failure::classify_failure;
pub use outcome::{MessageCategory, Outcome, OutcomeData};
pub use playlist::{PlaylistCursor, PlaylistError};
pub use queue::{Queue, QueueEntry, QueueId, QueueItem};
pub use request::{classify_url, playlist_id, PlayRequest, UrlError};
pub use service::{PlayerCommand, PlayerHandle, PlayerService};
pub use song::Song;
