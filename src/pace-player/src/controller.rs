use std::sync::{Arc, OnceLock};

use pace_audio::{AudioError, AudioSink, SessionEnd, SessionHandle, StreamSource};
use pace_core::{PlaylistListing, SongUrl};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::{
    classify_failure, classify_url, MessageCategory, Outcome, PlayRequest, PlaylistCursor, Queue,
    QueueEntry, Song,
};

/// Default number of playlist items requested per listing call.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// External collaborators the controller drives.
#[derive(Clone)]
pub struct Collaborators {
    pub listing: Arc<dyn PlaylistListing>,
    pub source: Arc<dyn StreamSource>,
    pub sink: Arc<dyn AudioSink>,
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub page_size: u32,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Completion of one playback session, tagged with the session generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub generation: u64,
    pub end: SessionEnd,
}

/// An unsolicited report for the user, not tied to a command reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub category: MessageCategory,
    pub url: Option<SongUrl>,
    /// Raw diagnostic text, only set for failures without a specific category.
    pub detail: Option<String>,
}

/// Receiving ends created alongside a controller.
pub struct EventStreams {
    /// Must be fed back into [`PlaybackController::handle_event`].
    pub sessions: mpsc::UnboundedReceiver<SessionEvent>,
    pub notices: mpsc::UnboundedReceiver<Notice>,
}

/// Snapshot of the controller state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub queue_len: usize,
    pub playing: bool,
    pub paused: bool,
    pub current_url: Option<SongUrl>,
    pub current_title: Option<String>,
    pub generation: u64,
}

struct ActiveSession {
    generation: u64,
    song: Song,
    handle: SessionHandle,
    /// Filled by the background title lookup; dropped with the session.
    resolved_title: Arc<OnceLock<String>>,
}

impl ActiveSession {
    fn title(&self) -> Option<&str> {
        self.song
            .cached_title()
            .or_else(|| self.resolved_title.get().map(String::as_str))
    }
}

/// Owns the queue and the single live playback session.
///
/// Every state change goes through `&mut self`, so callers serialize access
/// (see [`PlayerService`](crate::PlayerService)). Session completions arrive on
/// the `sessions` stream and are ignored unless their generation matches the
/// live session.
pub struct PlaybackController {
    queue: Queue,
    session: Option<ActiveSession>,
    generation: u64,
    listing: Arc<dyn PlaylistListing>,
    source: Arc<dyn StreamSource>,
    sink: Arc<dyn AudioSink>,
    page_size: u32,
    session_tx: mpsc::UnboundedSender<SessionEvent>,
    notice_tx: mpsc::UnboundedSender<Notice>,
}

impl PlaybackController {
    pub fn new(collaborators: Collaborators, options: ControllerOptions) -> (Self, EventStreams) {
        let (session_tx, sessions) = mpsc::unbounded_channel();
        let (notice_tx, notices) = mpsc::unbounded_channel();
        let controller = Self {
            queue: Queue::new(),
            session: None,
            generation: 0,
            listing: collaborators.listing,
            source: collaborators.source,
            sink: collaborators.sink,
            page_size: options.page_size.max(1),
            session_tx,
            notice_tx,
        };
        (controller, EventStreams { sessions, notices })
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn status(&self) -> Status {
        Status {
            queue_len: self.queue.len(),
            playing: self.session.is_some(),
            paused: self
                .session
                .as_ref()
                .is_some_and(|active| active.handle.is_paused()),
            current_url: self.session.as_ref().map(|active| active.song.url().clone()),
            current_title: self
                .session
                .as_ref()
                .and_then(|active| active.title().map(str::to_owned)),
            generation: self.generation,
        }
    }

    /// Queue a song or a playlist and start playback if nothing is playing.
    pub async fn enqueue(&mut self, url: &str) -> Outcome {
        let request = match classify_url(url) {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(url, error = %err, "rejected enqueue");
                return Outcome::failure(MessageCategory::InvalidUrl);
            }
        };

        let added = match request {
            PlayRequest::Song(url) => {
                tracing::info!(url = %url, "queued song");
                self.queue.push_back(QueueEntry::Song(Song::new(url)));
                1
            }
            PlayRequest::Playlist(playlist_id) => {
                let mut cursor = PlaylistCursor::new(playlist_id, self.page_size);
                match cursor.initialize(self.listing.as_ref()).await {
                    Ok(total) => {
                        tracing::info!(playlist = %cursor.playlist_id(), total, "queued playlist");
                        self.queue.push_back(QueueEntry::Playlist(cursor));
                        total
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "playlist enqueue failed");
                        return Outcome::failure(err.category());
                    }
                }
            }
        };

        if self.session.is_none() {
            self.advance().await;
        }
        Outcome::added(added)
    }

    /// Stop the live session and start the next playable song at the head.
    ///
    /// Entries that cannot produce a song are dropped until one plays or the
    /// queue is empty. Returns whether a session was started.
    pub async fn advance(&mut self) -> bool {
        self.destroy_session();

        loop {
            let Some(head) = self.queue.front_mut() else {
                tracing::debug!("queue empty, playback idle");
                return false;
            };
            let head_id = head.id;
            let pulled = match &mut head.entry {
                QueueEntry::Song(song) => Ok(Some(song.clone())),
                QueueEntry::Playlist(cursor) => cursor.pull(self.listing.as_ref()).await,
            };

            let song = match pulled {
                Ok(Some(song)) => song,
                Ok(None) => {
                    tracing::debug!("playlist exhausted, dropping it");
                    self.queue.pop_front_if(head_id);
                    continue;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "playlist page failed, dropping playlist");
                    self.notify(err.category(), None, None);
                    self.queue.pop_front_if(head_id);
                    continue;
                }
            };

            match self.start_session(song.clone()).await {
                Ok(()) => return true,
                Err(err) => {
                    self.report_failure(song.url(), &err);
                    if self
                        .queue
                        .front()
                        .is_some_and(|item| item.id == head_id && item.entry.is_spent())
                    {
                        self.queue.pop_front_if(head_id);
                    }
                }
            }
        }
    }

    /// Skip the current song.
    pub async fn next(&mut self) -> Outcome {
        let Some(head) = self.queue.front() else {
            return Outcome::failure(MessageCategory::NothingQueued);
        };

        if head.entry.is_spent() {
            let head_id = head.id;
            self.queue.pop_front_if(head_id);
            if self.queue.is_empty() {
                self.destroy_session();
                return Outcome::success(MessageCategory::QueueExhausted);
            }
        }
        self.advance().await;
        Outcome::success(MessageCategory::PlayingNext)
    }

    pub fn pause(&mut self) -> Outcome {
        let Some(active) = self.session.as_mut() else {
            return Outcome::failure(MessageCategory::NoSong);
        };
        if active.handle.is_paused() {
            return Outcome::failure(MessageCategory::AlreadyPaused);
        }
        match active.handle.pause() {
            Ok(()) => {
                tracing::info!(generation = active.generation, "paused");
                Outcome::success(MessageCategory::Paused)
            }
            Err(err) => {
                tracing::warn!(error = %err, "pause failed");
                Outcome::failure(classify_failure(&err))
            }
        }
    }

    pub fn resume(&mut self) -> Outcome {
        let Some(active) = self.session.as_mut() else {
            return Outcome::failure(MessageCategory::NoSong);
        };
        if !active.handle.is_paused() {
            return Outcome::failure(MessageCategory::AlreadyPlaying);
        }
        match active.handle.resume() {
            Ok(()) => {
                tracing::info!(generation = active.generation, "resumed");
                Outcome::success(MessageCategory::Resumed)
            }
            Err(err) => {
                tracing::warn!(error = %err, "resume failed");
                Outcome::failure(classify_failure(&err))
            }
        }
    }

    /// Stop playback and drop every queued entry.
    pub fn clear(&mut self) -> Outcome {
        if self.session.is_none() {
            return Outcome::failure(MessageCategory::QueueAlreadyEmpty);
        }
        self.destroy_session();
        self.queue.clear();
        tracing::info!("queue cleared");
        Outcome::success(MessageCategory::Cleared)
    }

    /// React to a session finishing or failing.
    pub async fn handle_event(&mut self, event: SessionEvent) {
        let current = self.session.as_ref().map(|active| active.generation);
        if current != Some(event.generation) {
            tracing::debug!(
                generation = event.generation,
                current = ?current,
                "ignoring event from superseded session"
            );
            return;
        }

        let url = self
            .session
            .as_ref()
            .map(|active| active.song.url().clone());
        match event.end {
            SessionEnd::Finished => {
                tracing::info!(generation = event.generation, "song finished");
            }
            SessionEnd::Failed(err) => {
                if let Some(url) = &url {
                    self.report_failure(url, &err);
                }
            }
        }

        if let Some(head) = self.queue.front() {
            if head.entry.is_spent() {
                let head_id = head.id;
                self.queue.pop_front_if(head_id);
            }
        }
        self.advance().await;
    }

    /// Stop playback and drop the queue.
    pub fn shutdown(&mut self) {
        self.destroy_session();
        self.queue.clear();
    }

    async fn start_session(&mut self, song: Song) -> Result<(), AudioError> {
        self.destroy_session();

        let stream = song.resolve_stream(self.source.as_ref()).await?;
        let mut handle = self.sink.play(stream)?;

        self.generation += 1;
        let generation = self.generation;
        tracing::info!(url = %song.url(), generation, "session started");

        if let Some(completion) = handle.take_completion() {
            let events = self.session_tx.clone();
            tokio::spawn(async move {
                // a destroyed session drops its sender without a value
                if let Ok(end) = completion.await {
                    let _ = events.send(SessionEvent { generation, end });
                }
            });
        }
        let resolved_title = Arc::new(OnceLock::new());
        self.spawn_title_lookup(&song, generation, &resolved_title);

        self.session = Some(ActiveSession {
            generation,
            song,
            handle,
            resolved_title,
        });
        Ok(())
    }

    fn spawn_title_lookup(&self, song: &Song, generation: u64, slot: &Arc<OnceLock<String>>) {
        if let Some(title) = song.cached_title() {
            tracing::info!(generation, title, "now playing");
            return;
        }
        let source = self.source.clone();
        let song = song.clone();
        // weak so a lookup outliving its session writes nowhere
        let slot = Arc::downgrade(slot);
        tokio::spawn(async move {
            match song.resolve_title(source.as_ref()).await {
                Ok(title) => {
                    tracing::info!(generation, title = %title, "now playing");
                    if let Some(slot) = slot.upgrade() {
                        let _ = slot.set(title);
                    }
                }
                Err(err) => {
                    tracing::debug!(generation, url = %song.url(), error = %err, "title lookup failed")
                }
            }
        });
    }

    fn destroy_session(&mut self) {
        if let Some(active) = self.session.take() {
            tracing::debug!(generation = active.generation, "destroying session");
            active.handle.destroy();
        }
    }

    fn report_failure(&self, url: &SongUrl, err: &AudioError) {
        let category = classify_failure(err);
        tracing::warn!(url = %url, error = %err, ?category, "playback failed");
        let detail =
            (category == MessageCategory::UnknownPlaybackError).then(|| err.to_string());
        self.notify(category, Some(url.clone()), detail);
    }

    fn notify(&self, category: MessageCategory, url: Option<SongUrl>, detail: Option<String>) {
        let _ = self.notice_tx.send(Notice {
            category,
            url,
            detail,
        });
    }
}
