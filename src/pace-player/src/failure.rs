use pace_audio::AudioError;

use crate::MessageCategory;

/// Text markers recognised in otherwise unstructured failure reasons, checked
/// in order.
const REASON_MARKERS: &[(&str, MessageCategory)] = &[
    ("video unavailable", MessageCategory::VideoUnavailable),
    ("private video", MessageCategory::PrivateVideo),
    ("econnreset", MessageCategory::StreamReadError),
    ("connection reset", MessageCategory::StreamReadError),
    ("too many redirects", MessageCategory::TooManyRedirects),
];

/// Map a playback failure to the category reported to the user.
pub fn classify_failure(error: &AudioError) -> MessageCategory {
    match error {
        AudioError::Unavailable(_) => MessageCategory::VideoUnavailable,
        AudioError::Private(_) => MessageCategory::PrivateVideo,
        AudioError::ConnectionReset(_) => MessageCategory::StreamReadError,
        AudioError::TooManyRedirects(_) => MessageCategory::TooManyRedirects,
        other => {
            let reason = other.to_string().to_ascii_lowercase();
            REASON_MARKERS
                .iter()
                .find(|(marker, _)| reason.contains(marker))
                .map(|(_, category)| *category)
                .unwrap_or(MessageCategory::UnknownPlaybackError)
        }
    }
}
