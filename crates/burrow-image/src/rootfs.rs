//! One-shot root filesystem provisioning.
//!
//! Creates `<scratch-root>/<id>/rootfs`, downloads the archive into it,
//! extracts the archive in place, and deletes the archive. Nothing is rolled
//! back on failure and the directory is never cleaned up here.

use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;
use std::path::PathBuf;

use burrow_common::config::BurrowConfig;
use burrow_common::error::{BurrowError, Result};
use burrow_common::types::InstanceId;

/// Provisions a fresh root filesystem for `id` and returns its location.
///
/// # Errors
///
/// Returns [`BurrowError::Filesystem`] if the directory tree cannot be
/// created or the archive cannot be written, stat'ed, or removed,
/// [`BurrowError::Download`] if the fetch fails, and
/// [`BurrowError::Extraction`] if the archive is malformed.
pub fn provision(config: &BurrowConfig, id: &InstanceId) -> Result<PathBuf> {
    let rootfs = config.rootfs_dir(id);
    tracing::info!(id = %id, rootfs = %rootfs.display(), "creating container root filesystem");

    DirBuilder::new()
        .recursive(true)
        .mode(0o755)
        .create(&rootfs)
        .map_err(|e| BurrowError::Filesystem {
            path: rootfs.clone(),
            source: e,
        })?;

    let archive = rootfs.join(config.archive_file_name());
    let _ = crate::source::download(&config.source_url, &archive)?;
    let _ = crate::archive::extract_archive(&archive, &rootfs)?;

    let _ = std::fs::metadata(&archive).map_err(|e| BurrowError::Filesystem {
        path: archive.clone(),
        source: e,
    })?;
    std::fs::remove_file(&archive).map_err(|e| BurrowError::Filesystem {
        path: archive.clone(),
        source: e,
    })?;
    tracing::info!(archive = %archive.display(), "archive deleted");

    Ok(rootfs)
}
