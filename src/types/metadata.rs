use super::Bitrate;

/// Everything known about a single video, fetched once per run.
///
/// Both sequences keep the provider's original ordering, which the
/// selection policies rely on for tie breaking.
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub title: String,
    pub duration_secs: u64,
    pub views: u64,
    pub streams: Vec<StreamDescriptor>,
    pub captions: Vec<CaptionTrack>,
}

impl VideoMetadata {
    /// Look up a caption track by exact language code
    pub fn caption(&self, language_code: &str) -> Option<&CaptionTrack> {
        self.captions
            .iter()
            .find(|track| track.language_code == language_code)
    }
}

/// One fetchable encoded variant of a video, as reported by the provider
#[derive(Debug, Clone)]
pub struct StreamDescriptor {
    /// e.g. "720p". Absent for audio-only streams
    pub resolution: Option<String>,
    /// Bare container extension, e.g. "mp4"
    pub extension: String,
    /// Audio and video muxed into a single file
    pub progressive: bool,
    pub audio_only: bool,
    pub average_bitrate: Option<Bitrate>,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Direct fetch location, consumed by the transfer primitive
    pub url: String,
}

impl StreamDescriptor {
    /// Parse the vertical resolution out of strings like "720p".
    /// Unparsable or absent resolutions rank lowest in quality ordering.
    pub fn resolution_height(&self) -> Option<u32> {
        self.resolution
            .as_deref()
            .and_then(|res| res.trim_end_matches('p').parse().ok())
    }
}

/// A subtitle track the provider can render to text on demand
#[derive(Debug, Clone)]
pub struct CaptionTrack {
    pub language_code: String,
    /// Subtitle file extension, e.g. "srt" or "vtt"
    pub extension: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(resolution: Option<&str>) -> StreamDescriptor {
        StreamDescriptor {
            resolution: resolution.map(String::from),
            extension: "mp4".to_string(),
            progressive: true,
            audio_only: false,
            average_bitrate: None,
            mime_type: "video/mp4".to_string(),
            size_bytes: 0,
            url: String::new(),
        }
    }

    #[test]
    fn resolution_height_parsing() {
        assert_eq!(stream(Some("1080p")).resolution_height(), Some(1080));
        assert_eq!(stream(Some("720")).resolution_height(), Some(720));
        assert_eq!(stream(Some("abc")).resolution_height(), None);
        assert_eq!(stream(None).resolution_height(), None);
    }
}
