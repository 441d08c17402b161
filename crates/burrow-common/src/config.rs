//! Provisioning configuration for a Burrow instance.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::InstanceId;

/// Where the root filesystem comes from and where it is materialized.
///
/// The CLI always runs with [`BurrowConfig::default`]; the fields exist so the
/// library can be pointed at a local archive server and a temporary directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurrowConfig {
    /// URL of the (optionally gzip-compressed) tar archive.
    pub source_url: String,
    /// Directory under which `<id>/rootfs` is created.
    pub scratch_root: PathBuf,
}

impl BurrowConfig {
    /// Returns the instance directory `<scratch_root>/<id>`.
    #[must_use]
    pub fn instance_dir(&self, id: &InstanceId) -> PathBuf {
        self.scratch_root.join(id.as_str())
    }

    /// Returns the rootfs location `<scratch_root>/<id>/rootfs`.
    #[must_use]
    pub fn rootfs_dir(&self, id: &InstanceId) -> PathBuf {
        self.instance_dir(id).join(crate::constants::ROOTFS_DIR_NAME)
    }

    /// Returns the final path segment of the source URL, used as the download file name.
    ///
    /// Query strings and fragments are ignored. Falls back to `rootfs.tar.gz`
    /// when the URL has no usable segment.
    #[must_use]
    pub fn archive_file_name(&self) -> String {
        let without_query = self
            .source_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        Path::new(without_query.trim_end_matches('/'))
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.contains(':'))
            .map_or_else(|| "rootfs.tar.gz".to_string(), str::to_string)
    }
}

impl Default for BurrowConfig {
    fn default() -> Self {
        Self {
            source_url: crate::constants::DEFAULT_ROOTFS_URL.to_string(),
            scratch_root: PathBuf::from(crate::constants::DEFAULT_SCRATCH_ROOT),
        }
    }
}
