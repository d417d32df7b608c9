use std::{
    fs::File,
    io::Cursor,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use symphonia::{
    core::{
        audio::SampleBuffer,
        codecs::DecoderOptions,
        formats::FormatOptions,
        io::{MediaSource, MediaSourceStream},
        meta::MetadataOptions,
        probe::Hint,
    },
    default,
};
use tokio::sync::oneshot;

use crate::{AudioError, AudioResult, AudioSink, AudioSource, SessionControl, SessionEnd, SessionHandle};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Audio sink backed by cpal + symphonia.
///
/// Plays local files and fully downloaded byte streams. The cpal stream is not
/// `Send` on every platform, so each session owns a dedicated output thread
/// that decodes the source, then builds, drives and drops the stream. `play`
/// returns at once; decode and device errors end the session with
/// [`SessionEnd::Failed`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalAudioSink;

struct Decoded {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
}

impl AudioSink for CpalAudioSink {
    fn play(&self, source: AudioSource) -> AudioResult<SessionHandle> {
        let (done_tx, done_rx) = oneshot::channel();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(false));

        thread::Builder::new()
            .name("pace-cpal-output".into())
            .spawn({
                let stop_flag = stop_flag.clone();
                let paused = paused.clone();
                move || run_output(source, stop_flag, paused, done_tx)
            })
            .map_err(|e| AudioError::Backend(e.to_string()))?;

        let control = CpalControl { stop_flag, paused };
        Ok(SessionHandle::new(Box::new(control), done_rx))
    }
}

fn run_output(
    source: AudioSource,
    stop_flag: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    done_tx: oneshot::Sender<SessionEnd>,
) {
    let fail = |done_tx: oneshot::Sender<SessionEnd>, err: AudioError| {
        tracing::warn!(error = %err, "cpal session setup failed");
        let _ = done_tx.send(SessionEnd::Failed(err));
    };

    let decoded = match decode(source) {
        Ok(decoded) => decoded,
        Err(err) => return fail(done_tx, err),
    };
    tracing::debug!(
        samples = decoded.samples.len(),
        channels = decoded.channels,
        sample_rate = decoded.sample_rate,
        "decoded source"
    );
    if stop_flag.load(Ordering::SeqCst) {
        return;
    }

    let drained = Arc::new(AtomicBool::new(false));
    let stream_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    let stream = match build_stream(decoded, drained.clone(), paused.clone(), stream_error.clone())
    {
        Ok(stream) => stream,
        Err(err) => return fail(done_tx, err),
    };
    if let Err(err) = stream.play() {
        return fail(done_tx, AudioError::Backend(err.to_string()));
    }

    let mut stream_paused = false;
    loop {
        if stop_flag.load(Ordering::SeqCst) {
            return;
        }

        let want_paused = paused.load(Ordering::SeqCst);
        if want_paused != stream_paused {
            let toggled = if want_paused {
                stream.pause().map_err(|e| e.to_string())
            } else {
                stream.play().map_err(|e| e.to_string())
            };
            // Silence from the data callback covers backends that refuse to pause.
            if let Err(err) = toggled {
                tracing::debug!(error = %err, "stream pause toggle failed");
            }
            stream_paused = want_paused;
        }

        let failure = stream_error.lock().ok().and_then(|mut guard| guard.take());
        if let Some(message) = failure {
            let _ = done_tx.send(SessionEnd::Failed(AudioError::Backend(message)));
            return;
        }
        if drained.load(Ordering::SeqCst) {
            let _ = done_tx.send(SessionEnd::Finished);
            return;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn build_stream(
    decoded: Decoded,
    drained: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    stream_error: Arc<Mutex<Option<String>>>,
) -> AudioResult<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| AudioError::Backend("no output device".into()))?;
    let supported = device
        .default_output_config()
        .map_err(|e| AudioError::Backend(e.to_string()))?;

    if supported.sample_format() != cpal::SampleFormat::F32 {
        return Err(AudioError::Backend(format!(
            "unsupported sample format: {:?}",
            supported.sample_format()
        )));
    }

    let out_channels = supported.channels() as usize;
    let config = cpal::StreamConfig {
        channels: supported.channels(),
        sample_rate: cpal::SampleRate(decoded.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let Decoded {
        samples, channels, ..
    } = decoded;
    let src_channels = channels.max(1);
    let total_frames = samples.len() / src_channels;
    let mut frame = 0usize;

    device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _| {
                if paused.load(Ordering::SeqCst) {
                    data.fill(0.0);
                    return;
                }
                for out in data.chunks_mut(out_channels.max(1)) {
                    if frame >= total_frames {
                        out.fill(0.0);
                        continue;
                    }
                    let base = frame * src_channels;
                    for (ch, sample) in out.iter_mut().enumerate() {
                        *sample = samples[base + ch.min(src_channels - 1)];
                    }
                    frame += 1;
                }
                if frame >= total_frames {
                    drained.store(true, Ordering::SeqCst);
                }
            },
            move |err| {
                tracing::error!(error = %err, "cpal stream error");
                if let Ok(mut guard) = stream_error.lock() {
                    guard.get_or_insert_with(|| err.to_string());
                }
            },
            None,
        )
        .map_err(|e| AudioError::Backend(e.to_string()))
}

/// The output thread is detached; it notices the stop flag within one poll
/// interval and drops the stream on its way out.
struct CpalControl {
    stop_flag: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl SessionControl for CpalControl {
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

fn decode(source: AudioSource) -> AudioResult<Decoded> {
    match source {
        AudioSource::File(path) => decode_file(&path),
        AudioSource::Url(url) => match url.strip_prefix("file://") {
            Some(stripped) => decode_file(&PathBuf::from(stripped)),
            None => Err(AudioError::UnsupportedSource(url)),
        },
        AudioSource::Bytes(bytes) => decode_stream(Box::new(Cursor::new(bytes)), Hint::new()),
    }
}

fn decode_file(path: &Path) -> AudioResult<Decoded> {
    let file = File::open(path).map_err(|e| AudioError::Io(e.to_string()))?;
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }
    decode_stream(Box::new(file), hint)
}

fn decode_stream(media: Box<dyn MediaSource>, hint: Hint) -> AudioResult<Decoded> {
    let mss = MediaSourceStream::new(media, Default::default());
    let probed = default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedSource(e.to_string()))?;
    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| AudioError::UnsupportedSource("no default track".into()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let mut decoder = default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::UnsupportedSource(e.to_string()))?;

    let mut samples = Vec::new();
    let mut channels = codec_params.channels.map(|c| c.count()).unwrap_or(0);
    let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(_)) => break,
            Err(err) => return Err(AudioError::Backend(err.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let audio_buf = match decoder.decode(&packet) {
            Ok(buf) => buf,
            // corrupt frames are skipped
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(err) => return Err(AudioError::Backend(err.to_string())),
        };
        let spec = *audio_buf.spec();
        channels = spec.channels.count();
        sample_rate = spec.rate;
        let mut sample_buf = SampleBuffer::<f32>::new(audio_buf.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(audio_buf);
        samples.extend_from_slice(sample_buf.samples());
    }

    if channels == 0 || sample_rate == 0 {
        return Err(AudioError::UnsupportedSource(
            "stream has no audio parameters".into(),
        ));
    }
    Ok(Decoded {
        samples,
        channels,
        sample_rate,
    })
}
