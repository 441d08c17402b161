//! Outward entry point for `burrow run`.
//!
//! Provisions the root filesystem, then re-executes the running binary with
//! the internal verb inside new UTS and PID namespaces and waits for it.

use std::path::Path;

use burrow_common::config::BurrowConfig;
use burrow_common::constants::{INSTANCE_CONTEXT_ENV, INTERNAL_VERB};
use burrow_common::error::{BurrowError, Result};
use burrow_common::types::{InstanceContext, InstanceId, ProcessSpec};
use burrow_core::namespace::NamespaceConfig;

/// Provisions a root filesystem for `id` and runs `workload` confined inside it.
///
/// Returns the exit code of the re-executed process, which is the workload's
/// own exit code unless confinement failed.
///
/// # Errors
///
/// Returns an error if provisioning fails, the current executable cannot be
/// resolved, or the re-exec cannot be spawned. Provisioning errors are
/// raised before any namespace is created.
pub fn launch(config: &BurrowConfig, id: &InstanceId, workload: &ProcessSpec) -> Result<i32> {
    let exe = std::env::current_exe().map_err(|e| BurrowError::Spawn {
        command: "current executable".into(),
        source: e,
    })?;
    launch_with_executable(config, id, workload, &exe)
}

/// Same as [`launch`], but re-executes `exe` instead of the running binary.
///
/// `exe` must be a `burrow` binary that understands the internal verb.
///
/// # Errors
///
/// Returns an error if provisioning fails or `exe` cannot be spawned.
pub fn launch_with_executable(
    config: &BurrowConfig,
    id: &InstanceId,
    workload: &ProcessSpec,
    exe: &Path,
) -> Result<i32> {
    tracing::info!(id = %id, command = %workload, pid = std::process::id(), "launching instance");

    let rootfs = burrow_image::rootfs::provision(config, id)?;
    let context = InstanceContext {
        id: id.clone(),
        rootfs,
    };

    let argv = reexec_argv(exe, workload);
    let env = [(INSTANCE_CONTEXT_ENV, context.encode()?)];

    let code = crate::process::spawn_in_namespaces(exe, &argv, &env, NamespaceConfig::default())?;
    tracing::info!(
        id = %id,
        exit_code = code,
        rootfs = %context.rootfs.display(),
        "instance exited, root filesystem left in place"
    );
    Ok(code)
}

/// Builds the re-exec command line: the binary, the internal verb, then the
/// workload's argv unmodified.
fn reexec_argv(exe: &Path, workload: &ProcessSpec) -> Vec<String> {
    let mut argv = vec![
        exe.to_string_lossy().into_owned(),
        INTERNAL_VERB.to_string(),
    ];
    argv.extend(workload.argv());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reexec_argv_forwards_workload_unmodified() {
        let workload = ProcessSpec {
            program: "/bin/sh".into(),
            args: vec!["-c".into(), "echo --help".into()],
        };
        let argv = reexec_argv(Path::new("/usr/local/bin/burrow"), &workload);
        assert_eq!(
            argv,
            vec!["/usr/local/bin/burrow", "hey", "/bin/sh", "-c", "echo --help"]
        );
    }
}
