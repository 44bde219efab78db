use std::{
    io::{Read, Write},
    path::Path,
};

use miette::miette;
use tracing::debug;

use crate::result::{Error, Result};

const CHUNK_SIZE: usize = 64 * 1024;

/// Stream a URL to `dest`, reporting `(bytes_done, bytes_total)` after
/// every chunk.
///
/// The body is staged in a named temporary file next to the destination
/// so a failed transfer never leaves a half-written media file behind.
/// `size_hint` is used as the total when the server does not report a
/// content length.
///
/// The progress callback may fail (e.g. on cancellation), which aborts
/// the transfer and drops the temporary file.
pub fn download_to_file(
    client: &reqwest::blocking::Client,
    url: &str,
    size_hint: u64,
    dest: &Path,
    on_progress: &mut dyn FnMut(u64, u64) -> Result<()>,
) -> Result<()> {
    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(Error::Network(format!(
            "Server answered with status {}",
            response.status()
        )));
    }

    let total = response.content_length().unwrap_or(size_hint);
    let dest_dir = dest
        .parent()
        .ok_or_else(|| miette!("Destination '{}' has no parent directory", dest.display()))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".vidfetch-")
        .tempfile_in(dest_dir)?;

    let mut reader = response;
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut done: u64 = 0;

    on_progress(0, total)?;
    loop {
        let n = reader.read(&mut buf).map_err(Error::Io)?;
        if n == 0 {
            break;
        }
        tmp.write_all(&buf[..n])?;
        done += n as u64;
        on_progress(done.min(total), total)?;
    }
    tmp.flush()?;

    // Move into place. Rename can fail across filesystems, fall back to copy
    if let Err(persist_err) = tmp.persist(dest) {
        debug!("Moving file failed, falling back to copying");
        std::fs::copy(persist_err.file.path(), dest)?;
    }

    Ok(())
}

/// Fetch a small text resource (subtitle payloads)
pub fn fetch_text(client: &reqwest::blocking::Client, url: &str) -> Result<String> {
    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(Error::Network(format!(
            "Server answered with status {}",
            response.status()
        )));
    }
    Ok(response.text()?)
}
