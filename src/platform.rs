use std::path::PathBuf;

/// The default output directory for downloads.
///
/// Prefers the user's Videos directory when the platform has one and it
/// exists (typical on Linux), then Downloads, then the home directory,
/// then the current directory as a last resort.
pub fn default_download_dir() -> PathBuf {
    if let Some(videos) = dirs::video_dir() {
        if videos.exists() {
            return videos;
        }
    }

    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dir_is_never_empty() {
        let dir = default_download_dir();
        assert!(!dir.as_os_str().is_empty());
    }
}
