//! UTS namespace isolation.
//!
//! Allows the container to have its own hostname.

use burrow_common::error::{BurrowError, Result};

/// Sets the hostname of the calling process's UTS namespace.
///
/// Must only be called after the process was created in a new UTS namespace,
/// otherwise it renames the host.
///
/// # Errors
///
/// Returns [`BurrowError::Syscall`] if `sethostname(2)` fails.
pub fn set_hostname(hostname: &str) -> Result<()> {
    nix::unistd::sethostname(hostname).map_err(|e| BurrowError::Syscall {
        operation: "sethostname",
        source: e.into(),
    })?;
    tracing::debug!(hostname, "hostname set");
    Ok(())
}
