use crate::{
    result::{Error, Result},
    types::{Container, MediaKind, StreamDescriptor, VideoMetadata},
};

/// The selection preferences extracted from a download request
#[derive(Debug, Clone, Copy)]
pub struct StreamPrefs<'a> {
    pub media_kind: MediaKind,
    pub target_resolution: &'a str,
    pub container: Container,
}

/// The outcome of a selection: either the stream matched the request
/// exactly, or a substitute had to be picked
#[derive(Debug)]
pub enum Selection<'a> {
    Exact(&'a StreamDescriptor),
    Fallback(&'a StreamDescriptor),
}

impl<'a> Selection<'a> {
    pub fn stream(&self) -> &'a StreamDescriptor {
        match self {
            Selection::Exact(stream) | Selection::Fallback(stream) => stream,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Selection::Fallback(_))
    }
}

/// Pick exactly one stream for the request, or fail with
/// [`Error::NoStreamAvailable`] when the metadata offers nothing usable.
///
/// Pure selection over already-fetched metadata. The caller is responsible
/// for reporting a [`Selection::Fallback`] as a quality downgrade.
pub fn select_stream<'a>(
    metadata: &'a VideoMetadata,
    prefs: &StreamPrefs,
) -> Result<Selection<'a>> {
    match prefs.media_kind {
        MediaKind::Audio => best_audio(&metadata.streams).map(Selection::Exact),
        MediaKind::Video => select_video(&metadata.streams, prefs),
    }
}

/// The audio-only stream with the highest average bitrate.
/// Streams without a reported bitrate rank lowest. First one wins on ties,
/// preserving the provider's ordering.
fn best_audio(streams: &[StreamDescriptor]) -> Result<&StreamDescriptor> {
    let mut best: Option<&StreamDescriptor> = None;
    for stream in streams.iter().filter(|s| s.audio_only) {
        match best {
            Some(current) if stream.average_bitrate <= current.average_bitrate => {}
            _ => best = Some(stream),
        }
    }
    best.ok_or(Error::NoStreamAvailable)
}

fn select_video<'a>(
    streams: &'a [StreamDescriptor],
    prefs: &StreamPrefs,
) -> Result<Selection<'a>> {
    let exact = streams.iter().find(|s| {
        s.progressive
            && s.extension == prefs.container.as_str()
            && s.resolution.as_deref() == Some(prefs.target_resolution)
    });

    if let Some(stream) = exact {
        return Ok(Selection::Exact(stream));
    }

    highest_resolution(streams)
        .map(Selection::Fallback)
        .ok_or(Error::NoStreamAvailable)
}

/// Best stream by total quality, ignoring the requested format/resolution.
///
/// Progressive streams are preferred since they need no remuxing; within a
/// tier the highest parsed resolution wins, first one on ties. Never fails
/// on a non-empty stream set.
fn highest_resolution(streams: &[StreamDescriptor]) -> Option<&StreamDescriptor> {
    let best_of = |progressive_only: bool| {
        let mut best: Option<&StreamDescriptor> = None;
        for stream in streams.iter().filter(|s| s.progressive || !progressive_only) {
            match best {
                Some(current) if stream.resolution_height() <= current.resolution_height() => {}
                _ => best = Some(stream),
            }
        }
        best
    };

    best_of(true).or_else(|| best_of(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bitrate;

    fn video_stream(resolution: &str, extension: &str, progressive: bool) -> StreamDescriptor {
        StreamDescriptor {
            resolution: Some(resolution.to_string()),
            extension: extension.to_string(),
            progressive,
            audio_only: false,
            average_bitrate: None,
            mime_type: format!("video/{extension}"),
            size_bytes: 50_000_000,
            url: format!("https://cdn.example/{resolution}.{extension}"),
        }
    }

    fn audio_stream(kbps: Option<f64>) -> StreamDescriptor {
        StreamDescriptor {
            resolution: None,
            extension: "webm".to_string(),
            progressive: false,
            audio_only: true,
            average_bitrate: kbps.map(Bitrate::from_kbps),
            mime_type: "audio/webm".to_string(),
            size_bytes: 5_000_000,
            url: "https://cdn.example/audio".to_string(),
        }
    }

    fn metadata(streams: Vec<StreamDescriptor>) -> VideoMetadata {
        VideoMetadata {
            title: "test".to_string(),
            duration_secs: 60,
            views: 1,
            streams,
            captions: vec![],
        }
    }

    fn video_prefs<'a>(resolution: &'a str, container: Container) -> StreamPrefs<'a> {
        StreamPrefs {
            media_kind: MediaKind::Video,
            target_resolution: resolution,
            container,
        }
    }

    #[test]
    fn exact_match_is_returned_without_fallback() {
        let meta = metadata(vec![
            video_stream("1080p", "webm", true),
            video_stream("720p", "mp4", true),
            video_stream("720p", "mp4", false),
        ]);

        let selection = select_stream(&meta, &video_prefs("720p", Container::Mp4)).unwrap();
        assert!(!selection.is_fallback());
        assert_eq!(selection.stream().resolution.as_deref(), Some("720p"));
        assert!(selection.stream().progressive);
    }

    #[test]
    fn non_progressive_match_is_skipped() {
        // A 720p mp4 exists but is not progressive, so it is not an exact match
        let meta = metadata(vec![
            video_stream("720p", "mp4", false),
            video_stream("480p", "mp4", true),
        ]);

        let selection = select_stream(&meta, &video_prefs("720p", Container::Mp4)).unwrap();
        assert!(selection.is_fallback());
        assert_eq!(selection.stream().resolution.as_deref(), Some("480p"));
    }

    #[test]
    fn fallback_picks_highest_progressive_resolution() {
        let meta = metadata(vec![
            video_stream("360p", "mp4", true),
            video_stream("1080p", "webm", true),
            video_stream("2160p", "webm", false),
        ]);

        let selection = select_stream(&meta, &video_prefs("720p", Container::Mp4)).unwrap();
        assert!(selection.is_fallback());
        assert_eq!(selection.stream().resolution.as_deref(), Some("1080p"));
    }

    #[test]
    fn fallback_uses_split_streams_when_nothing_is_progressive() {
        let meta = metadata(vec![
            video_stream("1080p", "webm", false),
            video_stream("2160p", "webm", false),
        ]);

        let selection = select_stream(&meta, &video_prefs("720p", Container::Mp4)).unwrap();
        assert_eq!(selection.stream().resolution.as_deref(), Some("2160p"));
    }

    #[test]
    fn empty_streams_fail() {
        let meta = metadata(vec![]);
        let err = select_stream(&meta, &video_prefs("720p", Container::Mp4)).unwrap_err();
        assert!(matches!(err, Error::NoStreamAvailable));
    }

    #[test]
    fn audio_picks_highest_bitrate() {
        let meta = metadata(vec![
            video_stream("720p", "mp4", true),
            audio_stream(Some(128.0)),
            audio_stream(Some(160.0)),
            audio_stream(None),
        ]);
        let prefs = StreamPrefs {
            media_kind: MediaKind::Audio,
            target_resolution: "720p",
            container: Container::Mp4,
        };

        let selection = select_stream(&meta, &prefs).unwrap();
        assert!(!selection.is_fallback());
        assert_eq!(
            selection.stream().average_bitrate,
            Some(Bitrate::from_kbps(160.0))
        );
    }

    #[test]
    fn audio_ties_keep_provider_order() {
        let mut first = audio_stream(Some(128.0));
        first.url = "first".to_string();
        let mut second = audio_stream(Some(128.0));
        second.url = "second".to_string();

        let meta = metadata(vec![first, second]);
        let prefs = StreamPrefs {
            media_kind: MediaKind::Audio,
            target_resolution: "720p",
            container: Container::Mp4,
        };

        assert_eq!(select_stream(&meta, &prefs).unwrap().stream().url, "first");
    }

    #[test]
    fn audio_fails_without_audio_streams() {
        let meta = metadata(vec![video_stream("720p", "mp4", true)]);
        let prefs = StreamPrefs {
            media_kind: MediaKind::Audio,
            target_resolution: "720p",
            container: Container::Mp4,
        };

        let err = select_stream(&meta, &prefs).unwrap_err();
        assert!(matches!(err, Error::NoStreamAvailable));
    }
}
