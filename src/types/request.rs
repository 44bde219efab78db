use std::path::PathBuf;

use clap::ValueEnum;

use super::Container;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MediaKind {
    Video,
    Audio,
}

/// One download request, immutable once handed to the orchestrator.
///
/// `target_resolution` and `container` are advisory: the selector honors
/// them when it can and degrades gracefully when it cannot.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub source_url: String,
    pub media_kind: MediaKind,
    pub target_resolution: String,
    pub container: Container,
    pub expand_playlist: bool,
    pub fetch_subtitles: bool,
    pub output_dir: PathBuf,
}
