//! Binary sink — persist raw bytes at a destination path.
//!
//! Writes go to a temp file in the destination directory followed by a
//! rename, so a crashed or cancelled request never leaves a partial file
//! at the final path. Existing files are overwritten.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// Save `bytes` at `destination`, creating parent directories as needed.
///
/// Returns the canonical absolute path of the written file.
pub async fn save_bytes(bytes: &[u8], destination: &Path) -> Result<PathBuf> {
    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Temp file lives next to the destination so the rename stays on one
    // filesystem and is atomic.
    let tmp = temp_sibling(destination);
    tokio::fs::write(&tmp, bytes).await?;

    if let Err(e) = tokio::fs::rename(&tmp, destination).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    let absolute = tokio::fs::canonicalize(destination).await?;
    debug!(path = %absolute.display(), size = bytes.len(), "saved bytes");
    Ok(absolute)
}

fn temp_sibling(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    let tmp_name = format!(".{name}.{}.tmp", uuid::Uuid::new_v4().simple());
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(tmp_name),
        _ => PathBuf::from(tmp_name),
    }
}
