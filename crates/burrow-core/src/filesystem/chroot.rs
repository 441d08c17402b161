//! Root filesystem confinement via `chroot(2)`.
//!
//! `chroot` only changes how the process resolves `/`. The working directory
//! still points outside the new root until it is changed, so the two calls
//! are always made together.

use std::path::Path;

use burrow_common::error::{BurrowError, Result};

/// Changes the root directory to `new_root` and the working directory to the new `/`.
///
/// # Errors
///
/// Returns [`BurrowError::Syscall`] if either `chroot(2)` or `chdir(2)` fails.
pub fn enter_root(new_root: &Path) -> Result<()> {
    tracing::info!(new_root = %new_root.display(), "changing root");
    nix::unistd::chroot(new_root).map_err(|e| BurrowError::Syscall {
        operation: "chroot",
        source: e.into(),
    })?;
    nix::unistd::chdir("/").map_err(|e| BurrowError::Syscall {
        operation: "chdir",
        source: e.into(),
    })?;
    Ok(())
}
