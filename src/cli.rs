use std::path::PathBuf;

use clap::Parser;

use crate::{
    platform,
    types::{Container, DownloadRequest, MediaKind},
};

macro_rules! arg_env {
    ($v:literal) => {
        concat!("VIDFETCH_", $v)
    };
}

/// Download a web video or a whole playlist to a local folder.
/// Pick video or audio-only, an advisory quality and container format,
/// and optionally grab the subtitles.
#[derive(Parser, Debug)]
pub struct Args {
    /// The video or playlist page URL to download
    #[clap(long, env = arg_env!("URL"))]
    pub url: String,

    /// Download the full video or only its audio stream
    #[clap(long = "type", value_enum, default_value_t = MediaKind::Video, env = arg_env!("TYPE"))]
    pub media_kind: MediaKind,

    /// The preferred vertical resolution, e.g. "720p".
    /// Advisory: the best available stream is used when it cannot be honored
    #[clap(long, default_value = "720p", env = arg_env!("RESOLUTION"))]
    pub resolution: String,

    /// The preferred container format for video downloads
    #[clap(long, value_enum, default_value_t = Container::Mp4, env = arg_env!("FORMAT"))]
    pub format: Container,

    /// The path to the output directory
    #[clap(long, default_value_os_t = platform::default_download_dir(), env = arg_env!("OUTPUT_DIR"))]
    pub output_dir: PathBuf,

    /// Download every video of the playlist when the URL points to one
    #[clap(long, env = arg_env!("PLAYLIST"))]
    pub playlist: bool,

    /// Also fetch the subtitles next to each media file
    #[clap(long, env = arg_env!("SUBTITLES"))]
    pub subtitles: bool,

    /// Log at debug level
    #[clap(long, env = arg_env!("DEBUG"))]
    pub debug: bool,
}

impl Args {
    pub fn into_request(self) -> DownloadRequest {
        DownloadRequest {
            source_url: self.url,
            media_kind: self.media_kind,
            target_resolution: self.resolution,
            container: self.format,
            expand_playlist: self.playlist,
            fetch_subtitles: self.subtitles,
            output_dir: self.output_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_form() {
        let args = Args::parse_from(["vidfetch", "--url", "https://video.example/watch?v=abc"]);
        assert_eq!(args.media_kind, MediaKind::Video);
        assert_eq!(args.resolution, "720p");
        assert_eq!(args.format, Container::Mp4);
        assert!(!args.playlist);
        assert!(!args.subtitles);
    }

    #[test]
    fn request_conversion_keeps_every_field() {
        let args = Args::parse_from([
            "vidfetch",
            "--url",
            "https://video.example/playlist?list=PL1",
            "--type",
            "audio",
            "--resolution",
            "1080p",
            "--format",
            "webm",
            "--output-dir",
            "/tmp/media",
            "--playlist",
            "--subtitles",
        ]);

        let request = args.into_request();
        assert_eq!(request.source_url, "https://video.example/playlist?list=PL1");
        assert_eq!(request.media_kind, MediaKind::Audio);
        assert_eq!(request.target_resolution, "1080p");
        assert_eq!(request.container, Container::Webm);
        assert_eq!(request.output_dir, PathBuf::from("/tmp/media"));
        assert!(request.expand_playlist);
        assert!(request.fetch_subtitles);
    }
}
