//! Deterministic collaborators for controller tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use pace_audio::{
    AudioError, AudioResult, AudioSink, AudioSource, SessionControl, SessionEnd, SessionHandle,
    StreamSource,
};
use pace_core::{
    ListingError, ListingItem, ListingPage, ListingResult, PageToken, PlaylistId, PlaylistListing,
    SongUrl,
};
use tokio::sync::{oneshot, Notify};

/// In-memory playlists paged with numeric offset tokens.
#[derive(Default)]
pub struct FakeListing {
    playlists: HashMap<String, Vec<ListingItem>>,
    failures: HashMap<String, ListingError>,
    fail_after: HashMap<String, (u32, ListingError)>,
    gate: Option<(u32, Arc<Notify>)>,
    per_playlist: Mutex<HashMap<String, u32>>,
    fetches: AtomicU32,
}

impl FakeListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_playlist(mut self, id: &str, urls: &[&str]) -> Self {
        let items = urls.iter().map(|url| ListingItem::new(*url)).collect();
        self.playlists.insert(id.to_string(), items);
        self
    }

    pub fn with_titled_playlist(mut self, id: &str, songs: &[(&str, &str)]) -> Self {
        let items = songs
            .iter()
            .map(|(url, title)| ListingItem::with_title(*url, *title))
            .collect();
        self.playlists.insert(id.to_string(), items);
        self
    }

    /// Every fetch of `id` fails with `error`.
    pub fn with_failure(mut self, id: &str, error: ListingError) -> Self {
        self.failures.insert(id.to_string(), error);
        self
    }

    /// Fetches of `id` fail once `successes` fetches have succeeded.
    pub fn fail_after(mut self, id: &str, successes: u32, error: ListingError) -> Self {
        self.fail_after.insert(id.to_string(), (successes, error));
        self
    }

    /// Fetches after the first `open` of each playlist wait for `gate` before answering.
    pub fn gated_after(mut self, open: u32, gate: Arc<Notify>) -> Self {
        self.gate = Some((open, gate));
        self
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaylistListing for FakeListing {
    fn id(&self) -> &str {
        "fake"
    }

    async fn fetch_page(
        &self,
        playlist_id: &PlaylistId,
        page_token: Option<&PageToken>,
        page_size: u32,
    ) -> ListingResult<ListingPage> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let key = playlist_id.as_ref();

        if let Some(error) = self.failures.get(key) {
            return Err(error.clone());
        }
        let attempt = {
            let mut counts = self.per_playlist.lock().unwrap();
            let count = counts.entry(key.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        if let Some((open, gate)) = &self.gate {
            if attempt > *open {
                gate.notified().await;
            }
        }
        if let Some((successes, error)) = self.fail_after.get(key) {
            if attempt > *successes {
                return Err(error.clone());
            }
        }

        let items = self
            .playlists
            .get(key)
            .ok_or_else(|| ListingError::api(404, "playlistNotFound"))?;
        let offset: usize = match page_token {
            Some(token) => token
                .as_ref()
                .parse()
                .map_err(|_| ListingError::api(400, "invalidPageToken"))?,
            None => 0,
        };
        let end = (offset + page_size as usize).min(items.len());
        let page_items = items.get(offset..end).unwrap_or_default().to_vec();
        let next_page_token = (end < items.len()).then(|| PageToken::new(end.to_string()));

        Ok(ListingPage {
            items: page_items,
            next_page_token,
            total_count: items.len() as u32,
        })
    }
}

/// Resolves every URL to itself, except those scripted to fail.
#[derive(Default)]
pub struct FakeStreamSource {
    failures: HashMap<String, AudioError>,
    stream_lookups: AtomicU32,
    title_lookups: AtomicU32,
}

impl FakeStreamSource {
    pub fn failing(mut self, url: &str, error: AudioError) -> Self {
        self.failures.insert(url.to_string(), error);
        self
    }

    pub fn stream_lookups(&self) -> u32 {
        self.stream_lookups.load(Ordering::SeqCst)
    }

    pub fn title_lookups(&self) -> u32 {
        self.title_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamSource for FakeStreamSource {
    fn id(&self) -> &str {
        "fake"
    }

    async fn resolve_stream(&self, url: &SongUrl) -> AudioResult<AudioSource> {
        self.stream_lookups.fetch_add(1, Ordering::SeqCst);
        match self.failures.get(url.as_str()) {
            Some(error) => Err(error.clone()),
            None => Ok(AudioSource::Url(url.to_string())),
        }
    }

    async fn resolve_title(&self, url: &SongUrl) -> AudioResult<String> {
        self.title_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(format!("title of {url}"))
    }
}

struct ManualSession {
    url: String,
    completion: Option<oneshot::Sender<SessionEnd>>,
    live: bool,
}

#[derive(Default)]
struct ManualState {
    sessions: Vec<ManualSession>,
    live: usize,
    max_live: usize,
}

/// Sink whose sessions end only when the test says so.
#[derive(Default, Clone)]
pub struct ManualSink {
    state: Arc<Mutex<ManualState>>,
}

impl ManualSink {
    /// URLs in the order sessions were started.
    pub fn played(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.sessions.iter().map(|s| s.url.clone()).collect()
    }

    pub fn live_sessions(&self) -> usize {
        self.state.lock().unwrap().live
    }

    pub fn max_live_sessions(&self) -> usize {
        self.state.lock().unwrap().max_live
    }

    pub fn finish_current(&self) {
        self.end_current(SessionEnd::Finished);
    }

    pub fn fail_current(&self, error: AudioError) {
        self.end_current(SessionEnd::Failed(error));
    }

    fn end_current(&self, end: SessionEnd) {
        let mut state = self.state.lock().unwrap();
        let session = state
            .sessions
            .iter_mut()
            .rev()
            .find(|s| s.live)
            .expect("a live session");
        let sender = session.completion.take().expect("session not ended yet");
        let _ = sender.send(end);
    }
}

impl AudioSink for ManualSink {
    fn play(&self, source: AudioSource) -> AudioResult<SessionHandle> {
        let url = match source {
            AudioSource::Url(url) => url,
            other => format!("{other:?}"),
        };
        let (tx, rx) = oneshot::channel();
        let mut state = self.state.lock().unwrap();
        let index = state.sessions.len();
        state.sessions.push(ManualSession {
            url,
            completion: Some(tx),
            live: true,
        });
        state.live += 1;
        state.max_live = state.max_live.max(state.live);

        let control = ManualControl {
            state: self.state.clone(),
            index,
        };
        Ok(SessionHandle::new(Box::new(control), rx))
    }
}

struct ManualControl {
    state: Arc<Mutex<ManualState>>,
    index: usize,
}

impl SessionControl for ManualControl {
    fn pause(&self) -> AudioResult<()> {
        Ok(())
    }

    fn resume(&self) -> AudioResult<()> {
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state.lock().unwrap();
        let was_live = match state.sessions.get_mut(self.index) {
            Some(session) if session.live => {
                session.live = false;
                session.completion = None;
                true
            }
            _ => false,
        };
        if was_live {
            state.live -= 1;
        }
    }
}
