use std::{collections::BTreeMap, path::Path, process::Output, sync::OnceLock};

use miette::{miette, Context, IntoDiagnostic};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::{
    command::{assert_success_command, run_command, Capture, YT_DL, YT_DLP},
    http,
};
use crate::{
    result::{Error, Result},
    types::{Bitrate, CaptionTrack, StreamDescriptor, VideoMetadata},
};

/// A playlist page path or a `list=` query parameter
fn playlist_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:/playlist\b|[?&]list=)").unwrap())
}

/// Interface for the media-info provider: metadata, playlist expansion
/// and the raw byte transfer.
///
/// The selection and orchestration logic only ever talks to this trait,
/// so it can run against a fake in tests.
pub trait MediaProvider: Sync {
    /// Fetch the full metadata of a single video page
    fn fetch_video_metadata(&self, url: &str) -> Result<VideoMetadata>;

    /// Resolve a playlist URL into its ordered constituent video URLs
    fn expand_playlist(&self, url: &str) -> Result<Vec<String>>;

    /// Whether the URL looks like a playlist page
    fn is_playlist_url(&self, url: &str) -> bool {
        playlist_url_re().is_match(url)
    }

    /// Write the stream's bytes to `dest`, reporting
    /// `(bytes_done, bytes_total)` along the way. A failing callback
    /// aborts the transfer.
    fn transfer(
        &self,
        stream: &StreamDescriptor,
        dest: &Path,
        on_progress: &mut dyn FnMut(u64, u64) -> Result<()>,
    ) -> Result<()>;

    /// Render a caption track to subtitle text
    fn render_captions(&self, track: &CaptionTrack) -> Result<String>;
}

/// Production provider backed by the
/// [yt-dlp](https://github.com/yt-dlp/yt-dlp) program for metadata and by
/// plain HTTP for the byte transfer
pub struct Ytdl {
    program: &'static str,
    client: reqwest::blocking::Client,
}

impl Ytdl {
    /// Verify that the `yt-dlp` or `youtube-dl` binaries are reachable
    pub fn new() -> Result<Self> {
        let program = if assert_success_command(YT_DLP, |cmd| cmd.arg("--version")).is_ok() {
            YT_DLP
        } else if assert_success_command(YT_DL, |cmd| cmd.arg("--version")).is_ok() {
            YT_DL
        } else {
            return Err(miette!("Neither yt-dlp nor youtube-dl found").into());
        };
        debug!("Using '{program}' as the metadata provider");

        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(Error::from)?;

        Ok(Self { program, client })
    }

    /// Run the program and map an "unavailable" complaint on stderr to
    /// [`Error::NotFound`]. Any other failing status becomes a network
    /// error carrying the last stderr line.
    fn run_provider<F>(&self, f: F, capture: Capture) -> Result<Output>
    where
        F: FnOnce(&mut std::process::Command) -> &mut std::process::Command,
    {
        let res = run_command(self.program, f, capture | Capture::STDERR)?;

        let stderr = String::from_utf8_lossy(&res.stderr);
        let is_unavailable = stderr
            .lines()
            .any(|line| line.starts_with("ERROR:") && line.to_lowercase().contains("unavailable"));
        if is_unavailable {
            return Err(Error::NotFound("Stream reported unavailable".to_string()));
        }

        if !res.status.success() {
            let reason = stderr
                .lines()
                .last()
                .unwrap_or("no error output")
                .to_string();
            return Err(Error::Network(format!(
                "{} failed ({}): {reason}",
                self.program, res.status
            )));
        }

        Ok(res)
    }
}

impl MediaProvider for Ytdl {
    fn fetch_video_metadata(&self, url: &str) -> Result<VideoMetadata> {
        let res = self.run_provider(
            |cmd| cmd.arg("-q").arg("--skip-download").arg("-j").arg("--").arg(url),
            Capture::STDOUT,
        )?;

        let output = String::from_utf8_lossy(&res.stdout);
        let raw: RawInfo = serde_json::from_str(&output)
            .into_diagnostic()
            .wrap_err("Could not parse video info JSON")
            .map_err(Error::Miette)?;

        Ok(raw.into_metadata())
    }

    fn expand_playlist(&self, url: &str) -> Result<Vec<String>> {
        let res = self.run_provider(
            |cmd| {
                cmd.arg("-q")
                    .arg("--flat-playlist")
                    .arg("--get-url")
                    .arg("--")
                    .arg(url)
            },
            Capture::STDOUT,
        )?;

        let output = String::from_utf8_lossy(&res.stdout);
        Ok(output.split_whitespace().map(String::from).collect())
    }

    fn transfer(
        &self,
        stream: &StreamDescriptor,
        dest: &Path,
        on_progress: &mut dyn FnMut(u64, u64) -> Result<()>,
    ) -> Result<()> {
        http::download_to_file(&self.client, &stream.url, stream.size_bytes, dest, on_progress)
    }

    fn render_captions(&self, track: &CaptionTrack) -> Result<String> {
        http::fetch_text(&self.client, &track.url)
    }
}

/// The subset of `yt-dlp -j` output this crate consumes
#[derive(Debug, Deserialize)]
struct RawInfo {
    title: String,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    view_count: Option<u64>,
    #[serde(default)]
    formats: Vec<RawFormat>,
    /// Keyed by language code. BTreeMap keeps the language order
    /// deterministic for the "first available" caption fallback
    #[serde(default)]
    subtitles: BTreeMap<String, Vec<RawCaption>>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    ext: Option<String>,
    #[serde(default)]
    vcodec: Option<String>,
    #[serde(default)]
    acodec: Option<String>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    abr: Option<f64>,
    #[serde(default)]
    filesize: Option<u64>,
    #[serde(default)]
    filesize_approx: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCaption {
    url: String,
    #[serde(default)]
    ext: Option<String>,
}

impl RawInfo {
    fn into_metadata(self) -> VideoMetadata {
        let streams = self
            .formats
            .into_iter()
            .filter_map(RawFormat::into_descriptor)
            .collect();

        let captions = self
            .subtitles
            .into_iter()
            .filter_map(|(language_code, entries)| {
                // Prefer a directly usable srt payload, else take the first
                let entry = entries
                    .iter()
                    .find(|c| c.ext.as_deref() == Some("srt"))
                    .or_else(|| entries.first())?;
                Some(CaptionTrack {
                    language_code,
                    extension: entry.ext.clone().unwrap_or_else(|| "srt".to_string()),
                    url: entry.url.clone(),
                })
            })
            .collect();

        VideoMetadata {
            title: self.title,
            duration_secs: self.duration.unwrap_or(0.0).round().max(0.0) as u64,
            views: self.view_count.unwrap_or(0),
            streams,
            captions,
        }
    }
}

impl RawFormat {
    fn into_descriptor(self) -> Option<StreamDescriptor> {
        let url = self.url?;
        let ext = self.ext.unwrap_or_default();

        let has_video = self.vcodec.as_deref().is_some_and(|v| v != "none");
        let has_audio = self.acodec.as_deref().is_some_and(|a| a != "none");
        if !has_video && !has_audio {
            // Storyboard and other non-media formats
            return None;
        }

        let size_bytes = self
            .filesize
            .or_else(|| self.filesize_approx.map(|s| s.round() as u64))
            .unwrap_or(0);

        Some(StreamDescriptor {
            resolution: self.height.map(|h| format!("{h}p")),
            progressive: has_video && has_audio,
            audio_only: has_audio && !has_video,
            average_bitrate: self.abr.map(Bitrate::from_kbps),
            mime_type: format!("{}/{ext}", if has_video { "video" } else { "audio" }),
            extension: ext,
            size_bytes,
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UrlOnly;

    impl MediaProvider for UrlOnly {
        fn fetch_video_metadata(&self, _url: &str) -> Result<VideoMetadata> {
            unimplemented!()
        }
        fn expand_playlist(&self, _url: &str) -> Result<Vec<String>> {
            unimplemented!()
        }
        fn transfer(
            &self,
            _stream: &StreamDescriptor,
            _dest: &Path,
            _on_progress: &mut dyn FnMut(u64, u64) -> Result<()>,
        ) -> Result<()> {
            unimplemented!()
        }
        fn render_captions(&self, _track: &CaptionTrack) -> Result<String> {
            unimplemented!()
        }
    }

    #[test]
    fn playlist_url_recognition() {
        let provider = UrlOnly;
        assert!(provider.is_playlist_url("https://video.example/playlist?list=PL123"));
        assert!(provider.is_playlist_url("https://video.example/watch?v=abc&list=PL123"));
        assert!(!provider.is_playlist_url("https://video.example/watch?v=abc"));
        assert!(!provider.is_playlist_url("https://video.example/watch?v=playlister"));
    }

    #[test]
    fn raw_info_parses_into_metadata() {
        let json = r#"{
            "title": "Some Video",
            "duration": 125.4,
            "view_count": 42,
            "formats": [
                {"url": "https://cdn/sb", "ext": "mhtml", "vcodec": "none", "acodec": "none"},
                {"url": "https://cdn/a", "ext": "webm", "vcodec": "none", "acodec": "opus", "abr": 160.0},
                {"url": "https://cdn/v", "ext": "mp4", "vcodec": "avc1", "acodec": "mp4a",
                 "height": 720, "filesize": 50000000}
            ],
            "subtitles": {
                "en": [{"url": "https://cdn/en.vtt", "ext": "vtt"},
                       {"url": "https://cdn/en.srt", "ext": "srt"}]
            }
        }"#;

        let raw: RawInfo = serde_json::from_str(json).unwrap();
        let meta = raw.into_metadata();

        assert_eq!(meta.title, "Some Video");
        assert_eq!(meta.duration_secs, 125);
        assert_eq!(meta.views, 42);

        // The storyboard format is dropped
        assert_eq!(meta.streams.len(), 2);
        assert!(meta.streams[0].audio_only);
        assert_eq!(meta.streams[0].average_bitrate, Some(Bitrate::from_kbps(160.0)));
        assert!(meta.streams[1].progressive);
        assert_eq!(meta.streams[1].resolution.as_deref(), Some("720p"));
        assert_eq!(meta.streams[1].mime_type, "video/mp4");
        assert_eq!(meta.streams[1].size_bytes, 50_000_000);

        // The srt rendition wins over the vtt one
        assert_eq!(meta.captions.len(), 1);
        assert_eq!(meta.captions[0].extension, "srt");
        assert_eq!(meta.captions[0].url, "https://cdn/en.srt");
    }
}
