//! Child-side entry point for the internal verb.
//!
//! Runs only as the launcher's re-exec, already inside the new namespaces:
//! set the hostname, chroot + chdir into the provisioned rootfs, then run
//! the workload and hand back its exit code.

use burrow_common::constants::{INSTANCE_CONTEXT_ENV, INTERNAL_VERB};
use burrow_common::error::{BurrowError, Result};
use burrow_common::types::{InstanceContext, ProcessSpec};

/// Reads the instance context the launcher placed in the environment.
///
/// # Errors
///
/// Returns [`BurrowError::InvalidArgument`] when the variable is absent, which
/// means the internal verb was invoked directly instead of by `run`, and a
/// serialization error when it is malformed.
pub fn context_from_env() -> Result<InstanceContext> {
    let value = std::env::var(INSTANCE_CONTEXT_ENV).map_err(|_| BurrowError::InvalidArgument {
        message: format!(
            "`{INTERNAL_VERB}` is internal and only valid when re-executed by `run`"
        ),
    })?;
    InstanceContext::decode(&value)
}

/// Confines the current process to `context` and runs `workload`.
///
/// # Errors
///
/// Returns [`BurrowError::Syscall`] if setting the hostname, `chroot`, or
/// `chdir` fails, and [`BurrowError::Spawn`] if the workload cannot start.
pub fn enter(context: &InstanceContext, workload: &ProcessSpec) -> Result<i32> {
    tracing::info!(
        id = %context.id,
        pid = std::process::id(),
        command = %workload,
        "entered new namespaces"
    );

    burrow_core::namespace::uts::set_hostname(context.id.as_str())?;
    burrow_core::filesystem::chroot::enter_root(&context.rootfs)?;
    crate::process::run_workload(workload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_context_is_an_invalid_argument() {
        if std::env::var_os(INSTANCE_CONTEXT_ENV).is_some() {
            return;
        }
        let err = context_from_env().expect_err("context must be missing");
        match err {
            BurrowError::InvalidArgument { message } => assert!(message.contains("hey")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
