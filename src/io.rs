use std::path::{Path, PathBuf};

use miette::miette;

use crate::result::Result;

/// Remove filesystem-unsafe characters from a video title so it can be
/// used as a file stem.
///
/// Splits on the unsafe set, trims the pieces and joins them with a single
/// space. Deterministic, and collision-safe in combination with
/// [`find_unused_path`].
pub fn sanitize_title(title: &str) -> String {
    let cleaned = title
        .split(|c: char| {
            matches!(
                c,
                '\'' | '"' | '/' | '\\' | '|' | '~' | '$' | '#' | ':' | '*' | '?' | '<' | '>'
            ) || c.is_control()
        })
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}

/// Find an output path in `out_dir` that does not exist yet.
///
/// Checks filenames one by one until one is free:
/// `<stem>.<ext>`, then `<stem> (2).<ext>` and up.
pub fn find_unused_path(out_dir: &Path, stem: &str, extension: &str) -> Result<PathBuf> {
    let mut output = out_dir.to_path_buf();

    output.push(format!("{stem}.{extension}"));
    if !output.exists() {
        return Ok(output);
    }

    for n in 2u16.. {
        output.set_file_name(format!("{stem} ({n}).{extension}"));
        if !output.exists() {
            return Ok(output);
        }
    }

    Err(miette!("Could not find an unused filename for '{stem}'").into())
}
