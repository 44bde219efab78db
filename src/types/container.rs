use std::fmt::Display;

use clap::ValueEnum;

/// The advisory container format for video downloads.
///
/// Advisory only: when no progressive stream matches it, the selector
/// falls back to the best available stream whatever its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Container {
    Mp4,
    Webm,
    Mkv,
}

impl Container {
    /// Return the bare file extension.
    /// e.g. "mp4"
    pub fn as_str(self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Webm => "webm",
            Container::Mkv => "mkv",
        }
    }

    /// Return the extension with the leading dot.
    /// e.g. ".mp4"
    pub fn with_dot(self) -> &'static str {
        match self {
            Container::Mp4 => ".mp4",
            Container::Webm => ".webm",
            Container::Mkv => ".mkv",
        }
    }
}

impl Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
