use std::fmt::Display;

use crossbeam_channel::Sender;
use serde::Serialize;

/// One step of a run, reported to whatever is watching the log pane.
///
/// Events are emitted and forgotten. The presentation side (the channel
/// receiver) decides how to persist or display them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ProgressEvent {
    Connecting {
        url: String,
    },
    MetadataFetched {
        title: String,
        duration_secs: u64,
        views: u64,
    },
    StreamSelected {
        resolution: Option<String>,
        mime_type: String,
    },
    /// No stream matched the requested resolution/container, a substitute
    /// was picked instead
    QualityDowngraded {
        requested: String,
        actual: Option<String>,
    },
    /// Transfer progress, one event per 10% boundary crossed (never 100)
    Chunk {
        percent: u8,
    },
    SubtitlesSaved {
        language: String,
    },
    SubtitlesUnavailable {
        reason: String,
    },
    VideoComplete {
        title: String,
    },
    /// One playlist entry failed; the run carries on with the next one
    PlaylistItemFailed {
        index: usize,
        reason: String,
    },
    AllComplete,
}

impl ProgressEvent {
    /// Whether the event reports a degraded or failed step
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ProgressEvent::QualityDowngraded { .. }
                | ProgressEvent::SubtitlesUnavailable { .. }
                | ProgressEvent::PlaylistItemFailed { .. }
        )
    }
}

impl Display for ProgressEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressEvent::Connecting { url } => write!(f, "Connecting to {url}"),
            ProgressEvent::MetadataFetched {
                title,
                duration_secs,
                views,
            } => {
                write!(
                    f,
                    "Title: {title} ({}m {}s, {views} views)",
                    duration_secs / 60,
                    duration_secs % 60
                )
            }
            ProgressEvent::StreamSelected {
                resolution,
                mime_type,
            } => match resolution {
                Some(res) => write!(f, "Stream found: {res} - {mime_type}"),
                None => write!(f, "Stream found: {mime_type}"),
            },
            ProgressEvent::QualityDowngraded { requested, actual } => match actual {
                Some(actual) => {
                    write!(f, "Requested {requested} not available, using {actual}")
                }
                None => write!(f, "Requested {requested} not available, using best stream"),
            },
            ProgressEvent::Chunk { percent } => write!(f, "Progress: {percent}%"),
            ProgressEvent::SubtitlesSaved { language } => {
                write!(f, "Subtitles saved: {language}")
            }
            ProgressEvent::SubtitlesUnavailable { reason } => {
                write!(f, "No subtitles: {reason}")
            }
            ProgressEvent::VideoComplete { title } => write!(f, "Downloaded '{title}'"),
            ProgressEvent::PlaylistItemFailed { index, reason } => {
                write!(f, "Playlist entry {} failed: {reason}", index + 1)
            }
            ProgressEvent::AllComplete => write!(f, "All downloads completed"),
        }
    }
}

/// Sending half of the progress channel.
///
/// Must never block the worker: the channel is unbounded and a dropped
/// receiver turns emission into a no-op instead of an error.
#[derive(Debug, Clone)]
pub struct EventSink(Sender<ProgressEvent>);

impl EventSink {
    pub fn new(sender: Sender<ProgressEvent>) -> Self {
        Self(sender)
    }

    pub fn emit(&self, event: ProgressEvent) {
        let _ = self.0.send(event);
    }
}
