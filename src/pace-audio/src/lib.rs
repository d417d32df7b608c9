mod sink;
mod source;
#[cfg(feature = "cpal-backend")]
mod cpal_sink;

pub use sink::{
    AudioError, AudioResult, AudioSink, AudioSource, NullAudioSink, SessionControl, SessionEnd,
    SessionHandle,
};
pub use source::{ReferenceSource, StreamSource};
#[cfg(feature = "cpal-backend")]
pub use cpal_sink::CpalAudioSink;
