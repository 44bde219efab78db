use std::{
    ops::Range,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use miette::miette;
use tracing::{error, info, warn};

use crate::{
    events::{EventSink, ProgressEvent},
    io,
    outside::MediaProvider,
    result::{Error, Result},
    select::{select_stream, StreamPrefs},
    subtitles,
    types::DownloadRequest,
};

/// Cooperative cancellation flag, checked between videos and between
/// chunk-progress callbacks
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Sequences a whole download run: validation, playlist expansion,
/// per-video processing with error isolation, and progress emission.
///
/// Runs on a single worker thread. Playlist entries are processed
/// strictly in order, one at a time, so failure isolation and ordered
/// progress reporting hold without any locking.
pub struct Orchestrator<'a> {
    provider: &'a dyn MediaProvider,
    events: EventSink,
    cancel: CancelToken,
    running: AtomicBool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(provider: &'a dyn MediaProvider, events: EventSink) -> Self {
        Self {
            provider,
            events,
            cancel: CancelToken::default(),
            running: AtomicBool::new(false),
        }
    }

    /// A handle the caller can use to interrupt the run from another thread
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Whether a run is currently active. The caller must not start a
    /// second run while this is true.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Execute the request to completion.
    ///
    /// Returns `Ok` on full success and on partial playlist success
    /// (failed entries are reported as [`ProgressEvent::PlaylistItemFailed`]).
    /// Fails on invalid input, on any error in single-video mode, and on
    /// cancellation.
    pub fn run(&self, request: &DownloadRequest) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(miette!("A download run is already active").into());
        }

        let res = self.run_inner(request);
        self.running.store(false, Ordering::SeqCst);

        if let Err(err) = &res {
            error!("Run aborted: {err}");
        }
        res
    }

    fn run_inner(&self, request: &DownloadRequest) -> Result<()> {
        validate(request)?;

        std::fs::create_dir_all(&request.output_dir)?;

        let playlist_mode =
            request.expand_playlist && self.provider.is_playlist_url(&request.source_url);
        let urls = if playlist_mode {
            let urls = self.provider.expand_playlist(&request.source_url)?;
            info!("{} videos in the playlist", urls.len());
            urls
        } else {
            vec![request.source_url.clone()]
        };

        for (index, url) in urls.iter().enumerate() {
            self.ensure_not_cancelled()?;

            if playlist_mode {
                info!("[{}/{}] Processing playlist entry", index + 1, urls.len());
            }

            match self.process_video(url, request) {
                Ok(()) => {}
                Err(err @ Error::Cancelled) => return Err(err),
                Err(err) if playlist_mode => {
                    warn!("Playlist entry {} failed: {err}", index + 1);
                    self.events.emit(ProgressEvent::PlaylistItemFailed {
                        index,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        self.events.emit(ProgressEvent::AllComplete);
        Ok(())
    }

    fn process_video(&self, url: &str, request: &DownloadRequest) -> Result<()> {
        self.events.emit(ProgressEvent::Connecting {
            url: url.to_string(),
        });

        let metadata = self.provider.fetch_video_metadata(url)?;
        info!(
            "Title: {} ({}m {}s, {} views)",
            metadata.title,
            metadata.duration_secs / 60,
            metadata.duration_secs % 60,
            metadata.views
        );
        self.events.emit(ProgressEvent::MetadataFetched {
            title: metadata.title.clone(),
            duration_secs: metadata.duration_secs,
            views: metadata.views,
        });

        let prefs = StreamPrefs {
            media_kind: request.media_kind,
            target_resolution: &request.target_resolution,
            container: request.container,
        };
        let selection = select_stream(&metadata, &prefs)?;
        let stream = selection.stream();

        if selection.is_fallback() {
            warn!(
                "Requested {} {} not available, falling back to the best stream",
                request.target_resolution, request.container
            );
            self.events.emit(ProgressEvent::QualityDowngraded {
                requested: format!("{} {}", request.target_resolution, request.container),
                actual: stream.resolution.clone(),
            });
        }
        self.events.emit(ProgressEvent::StreamSelected {
            resolution: stream.resolution.clone(),
            mime_type: stream.mime_type.clone(),
        });

        // Exact video matches carry the requested container extension;
        // fallback and audio streams keep their own
        let stem = io::sanitize_title(&metadata.title);
        let dest = io::find_unused_path(&request.output_dir, &stem, &stream.extension)?;
        info!("Downloading to '{}'", dest.display());

        let mut deciles = DecileTracker::default();
        self.provider
            .transfer(stream, &dest, &mut |done, total| {
                self.ensure_not_cancelled()?;
                for decile in deciles.crossed(done, total) {
                    self.events.emit(ProgressEvent::Chunk {
                        percent: decile * 10,
                    });
                }
                Ok(())
            })?;

        if request.fetch_subtitles {
            match subtitles::fetch_captions(self.provider, &metadata, &request.output_dir) {
                Ok(language) => {
                    info!("Subtitles saved ({language})");
                    self.events.emit(ProgressEvent::SubtitlesSaved { language });
                }
                Err(err) => {
                    warn!("Subtitles skipped: {err}");
                    self.events.emit(ProgressEvent::SubtitlesUnavailable {
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!("Downloaded '{}'", metadata.title);
        self.events.emit(ProgressEvent::VideoComplete {
            title: metadata.title,
        });
        Ok(())
    }

    fn ensure_not_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// The only failure allowed to abort a run before any network activity
fn validate(request: &DownloadRequest) -> Result<()> {
    let url = request.source_url.trim();
    if url.is_empty() {
        Err(Error::InvalidInput("no URL provided".to_string()))
    } else if url.ends_with("...") {
        // The GUI front seeds its entry with a "https://.../watch?v=..."
        // placeholder; treat it as unset
        Err(Error::InvalidInput(
            "the URL looks like an unset placeholder".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Tracks which 10% boundaries of a transfer were already reported.
///
/// Deciles 0..=9 (0% to 90%) are each reported exactly once, in order,
/// even when a single chunk jumps past several boundaries. The 100% mark
/// is never reported: completion is the `VideoComplete` event's job.
#[derive(Debug, Default)]
struct DecileTracker {
    next: u8,
}

impl DecileTracker {
    fn crossed(&mut self, done: u64, total: u64) -> Range<u8> {
        if total == 0 || self.next > 9 {
            return self.next..self.next;
        }

        let percent = (done.min(total) * 100 / total) as u8;
        let reached = (percent / 10).min(9);
        let end = (reached + 1).max(self.next);

        let range = self.next..end;
        self.next = end;
        range
    }
}
