use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{PlaylistCursor, Song};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueId(pub u64);

impl QueueId {
    fn next(seed: &mut u64) -> Self {
        let id = *seed;
        *seed = seed.saturating_add(1);
        QueueId(id)
    }
}

#[derive(Debug, Clone)]
pub enum QueueEntry {
    Song(Song),
    Playlist(PlaylistCursor),
}

impl QueueEntry {
    /// Whether the entry has nothing left to play once its current song ends.
    ///
    /// A song is finished after one play; a playlist only once its cursor is
    /// exhausted.
    pub fn is_spent(&self) -> bool {
        match self {
            QueueEntry::Song(_) => true,
            QueueEntry::Playlist(cursor) => cursor.is_exhausted(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueueItem {
    pub id: QueueId,
    pub entry: QueueEntry,
}

/// FIFO of queue entries; the front entry is the one playing.
#[derive(Debug, Default, Clone)]
pub struct Queue {
    items: VecDeque<QueueItem>,
    next_id: u64,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueItem> {
        self.items.iter()
    }

    pub fn push_back(&mut self, entry: QueueEntry) -> QueueId {
        let id = QueueId::next(&mut self.next_id);
        self.items.push_back(QueueItem { id, entry });
        id
    }

    pub fn front(&self) -> Option<&QueueItem> {
        self.items.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut QueueItem> {
        self.items.front_mut()
    }

    pub fn pop_front(&mut self) -> Option<QueueItem> {
        self.items.pop_front()
    }

    /// Remove the head only if it is still the entry identified by `id`.
    pub fn pop_front_if(&mut self, id: QueueId) -> Option<QueueItem> {
        match self.items.front() {
            Some(item) if item.id == id => self.items.pop_front(),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use pace_core::PlaylistId;

    use super::*;

    fn song(url: &str) -> QueueEntry {
        QueueEntry::Song(Song::new(url))
    }

    #[test]
    fn push_back_keeps_insertion_order() {
        let mut queue = Queue::new();
        let first = queue.push_back(song("one"));
        let second = queue.push_back(song("two"));

        assert_ne!(first, second);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.front().unwrap().id, first);
        let ids: Vec<_> = queue.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn pop_front_if_ignores_stale_ids() {
        let mut queue = Queue::new();
        let first = queue.push_back(song("one"));
        let second = queue.push_back(song("two"));

        assert!(queue.pop_front_if(second).is_none());
        assert_eq!(queue.pop_front_if(first).unwrap().id, first);
        assert!(queue.pop_front_if(first).is_none());
        assert_eq!(queue.front().unwrap().id, second);
    }

    #[test]
    fn ids_are_not_reused_after_clear() {
        let mut queue = Queue::new();
        let first = queue.push_back(song("one"));
        queue.clear();
        assert!(queue.is_empty());

        let again = queue.push_back(song("one"));
        assert_ne!(first, again);
    }

    #[test]
    fn fresh_playlist_entry_is_not_spent() {
        let cursor = PlaylistCursor::new(PlaylistId::from("PL"), 5);
        assert!(!QueueEntry::Playlist(cursor).is_spent());
        assert!(song("one").is_spent());
    }
}
