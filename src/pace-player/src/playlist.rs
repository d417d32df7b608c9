use std::collections::VecDeque;

use pace_core::{ListingError, PageToken, PlaylistId, PlaylistListing};
use thiserror::Error;

use crate::{MessageCategory, Song};

/// Why a playlist page could not be fetched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaylistError {
    #[error("playlist {playlist_id} is not accessible: {source}")]
    Forbidden {
        playlist_id: PlaylistId,
        source: ListingError,
    },
    #[error("playlist {playlist_id} does not exist: {source}")]
    NotFound {
        playlist_id: PlaylistId,
        source: ListingError,
    },
    #[error("failed to fetch playlist {playlist_id}: {source}")]
    Fetch {
        playlist_id: PlaylistId,
        source: ListingError,
    },
}

impl PlaylistError {
    fn from_listing(playlist_id: &PlaylistId, source: ListingError) -> Self {
        let playlist_id = playlist_id.clone();
        match source.http_status() {
            Some(401 | 403) => PlaylistError::Forbidden {
                playlist_id,
                source,
            },
            Some(404) => PlaylistError::NotFound {
                playlist_id,
                source,
            },
            _ => PlaylistError::Fetch {
                playlist_id,
                source,
            },
        }
    }

    pub fn category(&self) -> MessageCategory {
        match self {
            PlaylistError::Forbidden { .. } => MessageCategory::PlaylistForbidden,
            PlaylistError::NotFound { .. } => MessageCategory::PlaylistNotFound,
            PlaylistError::Fetch { .. } => MessageCategory::PlaylistFetchFailed,
        }
    }
}

/// Lazy, page-by-page reader over one remote playlist.
///
/// The buffer is refilled only once it is empty, and never after the cursor is
/// `done`. A failed fetch marks the cursor done without retrying; songs already
/// buffered stay playable.
#[derive(Debug, Clone)]
pub struct PlaylistCursor {
    playlist_id: PlaylistId,
    page_token: Option<PageToken>,
    buffer: VecDeque<Song>,
    total_count: u32,
    done: bool,
    page_size: u32,
    fetches: u32,
}

impl PlaylistCursor {
    pub fn new(playlist_id: PlaylistId, page_size: u32) -> Self {
        Self {
            playlist_id,
            page_token: None,
            buffer: VecDeque::new(),
            total_count: 0,
            done: false,
            page_size: page_size.max(1),
            fetches: 0,
        }
    }

    pub fn playlist_id(&self) -> &PlaylistId {
        &self.playlist_id
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Done and drained: nothing more will ever come out of this cursor.
    pub fn is_exhausted(&self) -> bool {
        self.done && self.buffer.is_empty()
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of listing requests issued so far.
    pub fn fetch_count(&self) -> u32 {
        self.fetches
    }

    /// Fetch the first page and return the playlist's total item count.
    pub async fn initialize(&mut self, listing: &dyn PlaylistListing) -> Result<u32, PlaylistError> {
        self.page_token = None;
        self.fetch(listing).await?;
        Ok(self.total_count)
    }

    /// Next song of the playlist, fetching a page only when the buffer is
    /// empty. `Ok(None)` means the cursor yielded nothing and can be dropped.
    pub async fn pull(&mut self, listing: &dyn PlaylistListing) -> Result<Option<Song>, PlaylistError> {
        if let Some(song) = self.buffer.pop_front() {
            return Ok(Some(song));
        }
        if self.done {
            return Ok(None);
        }
        self.fetch(listing).await?;
        Ok(self.buffer.pop_front())
    }

    async fn fetch(&mut self, listing: &dyn PlaylistListing) -> Result<(), PlaylistError> {
        self.fetches += 1;
        tracing::debug!(
            playlist = %self.playlist_id,
            listing = listing.id(),
            has_token = self.page_token.is_some(),
            page_size = self.page_size,
            "fetching playlist page"
        );

        let result = listing
            .fetch_page(&self.playlist_id, self.page_token.as_ref(), self.page_size)
            .await;
        match result {
            Ok(page) => {
                self.total_count = page.total_count;
                self.buffer.extend(page.items.into_iter().map(Song::from));
                self.done = page.next_page_token.is_none();
                self.page_token = page.next_page_token;
                tracing::debug!(
                    playlist = %self.playlist_id,
                    buffered = self.buffer.len(),
                    total = self.total_count,
                    done = self.done,
                    "playlist page fetched"
                );
                Ok(())
            }
            Err(err) => {
                self.done = true;
                self.page_token = None;
                Err(PlaylistError::from_listing(&self.playlist_id, err))
            }
        }
    }
}
