use std::fmt::Display;

use miette::miette;

/// Every failure kind the downloader can surface.
///
/// The split matters for recovery: inside a playlist run, all per-video
/// kinds are caught at the per-video boundary and reported as events,
/// while `InvalidInput` and `Cancelled` always terminate the whole run.
#[derive(Debug)]
pub enum Error {
    /// The request was rejected before any network activity
    InvalidInput(String),

    /// Metadata fetch or byte transfer failed on the wire
    Network(String),

    /// The provider reported the video or playlist as unavailable
    NotFound(String),

    /// No stream matched and no fallback exists (empty stream set)
    NoStreamAvailable,

    /// The video carries no caption track at all
    NoCaptionsAvailable,

    /// The run was cancelled through its token
    Cancelled,

    Io(std::io::Error),

    Miette(miette::Report),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::Network(msg) => write!(f, "network error: {msg}"),
            Error::NotFound(msg) => write!(f, "not found: {msg}"),
            Error::NoStreamAvailable => write!(f, "no stream available"),
            Error::NoCaptionsAvailable => write!(f, "no captions available"),
            Error::Cancelled => write!(f, "cancelled"),
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Miette(report) => write!(f, "{report}"),
        }
    }
}

impl From<miette::Report> for Error {
    fn from(err: miette::Report) -> Self {
        Error::Miette(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl From<Error> for miette::Report {
    fn from(err: Error) -> Self {
        match err {
            Error::Miette(report) => report,
            err => miette!("{err}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
