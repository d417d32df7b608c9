use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use thiserror::Error;
use tokio::sync::oneshot;

/// Failures while resolving or playing a stream.
///
/// The first four variants are the reasons a remote can give for refusing a
/// track; everything else is backend trouble.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("resource unavailable: {0}")]
    Unavailable(String),
    #[error("resource is private: {0}")]
    Private(String),
    #[error("connection reset while reading: {0}")]
    ConnectionReset(String),
    #[error("too many redirects: {0}")]
    TooManyRedirects(String),
    #[error("audio backend unavailable: {0}")]
    Backend(String),
    #[error("unsupported source: {0}")]
    UnsupportedSource(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("{0}")]
    Other(String),
}

pub type AudioResult<T> = Result<T, AudioError>;

/// Abstract audio source handed to a sink.
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// A URL the sink opens itself (local file via `file://` or remote).
    Url(String),
    /// A local file path.
    File(PathBuf),
    /// An already downloaded, still encoded audio stream.
    Bytes(Vec<u8>),
}

/// How a playback session ended on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Finished,
    Failed(AudioError),
}

/// Backend-specific controls behind a [`SessionHandle`].
pub trait SessionControl: Send {
    fn pause(&self) -> AudioResult<()>;
    fn resume(&self) -> AudioResult<()>;
    /// Stop output and release backend resources. Must not signal completion.
    fn stop(&mut self);
}

/// Handle representing one live playback session.
///
/// A session reports exactly one [`SessionEnd`] through its completion
/// receiver, unless it is destroyed first; then the sender is dropped
/// without a value.
pub struct SessionHandle {
    control: Box<dyn SessionControl>,
    completion: Option<oneshot::Receiver<SessionEnd>>,
    paused: bool,
    stopped: bool,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("paused", &self.paused)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    pub fn new(control: Box<dyn SessionControl>, completion: oneshot::Receiver<SessionEnd>) -> Self {
        Self {
            control,
            completion: Some(completion),
            paused: false,
            stopped: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) -> AudioResult<()> {
        self.control.pause()?;
        self.paused = true;
        Ok(())
    }

    pub fn resume(&mut self) -> AudioResult<()> {
        self.control.resume()?;
        self.paused = false;
        Ok(())
    }

    /// The completion signal; can be taken once.
    pub fn take_completion(&mut self) -> Option<oneshot::Receiver<SessionEnd>> {
        self.completion.take()
    }

    pub fn destroy(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.control.stop();
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Audio sink interface.
pub trait AudioSink: Send + Sync {
    fn play(&self, source: AudioSource) -> AudioResult<SessionHandle>;
}

/// Audio sink that simulates playback for a fixed duration without touching
/// any device. Used for tests and headless environments.
#[derive(Debug, Clone)]
pub struct NullAudioSink {
    track_length: Duration,
}

impl Default for NullAudioSink {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl NullAudioSink {
    pub fn new(track_length: Duration) -> Self {
        Self { track_length }
    }
}

impl AudioSink for NullAudioSink {
    fn play(&self, _source: AudioSource) -> AudioResult<SessionHandle> {
        let (control, completion) = SimulatedControl::spawn(self.track_length);
        Ok(SessionHandle::new(Box::new(control), completion))
    }
}

/// The ticking thread is detached and exits on its next tick after `stop`.
struct SimulatedControl {
    stop_flag: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl SimulatedControl {
    fn spawn(duration: Duration) -> (Self, oneshot::Receiver<SessionEnd>) {
        let (done_tx, done_rx) = oneshot::channel();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(false));
        let stop_clone = stop_flag.clone();
        let paused_clone = paused.clone();

        thread::spawn(move || {
            let tick = Duration::from_millis(20);
            let mut elapsed = Duration::ZERO;
            while elapsed < duration {
                if stop_clone.load(Ordering::SeqCst) {
                    return;
                }
                thread::sleep(tick);
                if !paused_clone.load(Ordering::SeqCst) {
                    elapsed += tick;
                }
            }
            if !stop_clone.load(Ordering::SeqCst) {
                let _ = done_tx.send(SessionEnd::Finished);
            }
        });

        let control = Self { stop_flag, paused };
        (control, done_rx)
    }
}

impl SessionControl for SimulatedControl {
    fn pause(&self) -> AudioResult<()> {
        self.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn resume(&self) -> AudioResult<()> {
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_sink_signals_finish() {
        let sink = NullAudioSink::new(Duration::from_millis(60));
        let mut handle = sink
            .play(AudioSource::Url("test".into()))
            .expect("null sink should succeed");
        let completion = handle.take_completion().expect("completion available once");
        assert!(handle.take_completion().is_none());

        let end = tokio::time::timeout(Duration::from_secs(2), completion)
            .await
            .expect("should finish in time")
            .expect("sender kept until finish");
        assert_eq!(end, SessionEnd::Finished);
    }

    #[tokio::test]
    async fn destroyed_session_never_signals() {
        let sink = NullAudioSink::new(Duration::from_secs(5));
        let mut handle = sink.play(AudioSource::Url("test".into())).unwrap();
        let completion = handle.take_completion().unwrap();

        handle.destroy();
        assert!(completion.await.is_err(), "sender dropped without a value");
    }

    #[test]
    fn destroy_returns_without_waiting_for_a_tick() {
        let sink = NullAudioSink::new(Duration::from_secs(5));
        for _ in 0..10 {
            let handle = sink.play(AudioSource::Url("test".into())).unwrap();
            let started = std::time::Instant::now();
            handle.destroy();
            assert!(started.elapsed() < Duration::from_millis(10));
        }
    }

    #[test]
    fn pause_and_resume_track_state() {
        let sink = NullAudioSink::new(Duration::from_secs(5));
        let mut handle = sink.play(AudioSource::Bytes(vec![0; 4])).unwrap();
        assert!(!handle.is_paused());
        handle.pause().unwrap();
        assert!(handle.is_paused());
        handle.resume().unwrap();
        assert!(!handle.is_paused());
    }

    #[tokio::test]
    async fn paused_session_does_not_finish() {
        let sink = NullAudioSink::new(Duration::from_millis(100));
        let mut handle = sink.play(AudioSource::Url("test".into())).unwrap();
        handle.pause().unwrap();
        let mut completion = handle.take_completion().unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(completion.try_recv().is_err(), "paused session must not finish");

        handle.resume().unwrap();
        let end = tokio::time::timeout(Duration::from_secs(2), completion)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(end, SessionEnd::Finished);
    }
}
