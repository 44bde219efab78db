use std::path::Path;

use tracing::debug;

use crate::{
    io::sanitize_title,
    outside::MediaProvider,
    result::{Error, Result},
    types::{CaptionTrack, VideoMetadata},
};

/// Language preference for caption tracks, most wanted first
const PREFERRED_LANGUAGES: [&str; 2] = ["fr", "en"];

/// Fetch the best-matching caption track and write it next to the media
/// file as `<title>_subtitles.<ext>`. Returns the chosen language code.
///
/// Fails with [`Error::NoCaptionsAvailable`] when the video carries no
/// captions at all. The caller treats every failure here as a warning,
/// never as a video failure.
pub fn fetch_captions(
    provider: &dyn MediaProvider,
    metadata: &VideoMetadata,
    out_dir: &Path,
) -> Result<String> {
    let track = choose_track(metadata).ok_or(Error::NoCaptionsAvailable)?;
    debug!("Caption track chosen: {}", track.language_code);

    let text = provider.render_captions(track)?;

    let filename = format!(
        "{}_subtitles.{}",
        sanitize_title(&metadata.title),
        track.extension
    );
    std::fs::write(out_dir.join(filename), text)?;

    Ok(track.language_code.clone())
}

/// Preferred languages first, then whatever the provider listed first
fn choose_track(metadata: &VideoMetadata) -> Option<&CaptionTrack> {
    PREFERRED_LANGUAGES
        .iter()
        .find_map(|code| metadata.caption(code))
        .or_else(|| metadata.captions.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(code: &str) -> CaptionTrack {
        CaptionTrack {
            language_code: code.to_string(),
            extension: "srt".to_string(),
            url: format!("https://captions.example/{code}"),
        }
    }

    fn metadata(codes: &[&str]) -> VideoMetadata {
        VideoMetadata {
            title: "test".to_string(),
            duration_secs: 0,
            views: 0,
            streams: vec![],
            captions: codes.iter().map(|c| track(c)).collect(),
        }
    }

    #[test]
    fn prefers_french_then_english() {
        let meta = metadata(&["es", "fr", "en"]);
        assert_eq!(choose_track(&meta).unwrap().language_code, "fr");

        let meta = metadata(&["es", "en"]);
        assert_eq!(choose_track(&meta).unwrap().language_code, "en");
    }

    #[test]
    fn falls_back_to_first_listed() {
        let meta = metadata(&["de"]);
        assert_eq!(choose_track(&meta).unwrap().language_code, "de");
    }

    #[test]
    fn empty_captions_yield_none() {
        assert!(choose_track(&metadata(&[])).is_none());
    }
}
