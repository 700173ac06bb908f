//! Input validation: make sure the path names a readable PDF before pdfium
//! sees it.
//!
//! pdfium reports a missing file and a corrupt file with the same opaque
//! error. Checking existence, permissions and the `%PDF` magic bytes up front
//! turns those into distinct [`HighlightError`] variants.

use crate::error::HighlightError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local file path, returning it as an owned `PathBuf`.
pub fn resolve_local(path: &Path) -> Result<PathBuf, HighlightError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(HighlightError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(HighlightError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(HighlightError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(HighlightError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}
