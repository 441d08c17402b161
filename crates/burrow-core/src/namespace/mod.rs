//! Linux namespace selection for container isolation.
//!
//! The launcher asks the kernel for new namespaces at process creation time
//! through `clone(2)` flags. Only UTS and PID isolation are supported; mount,
//! network, IPC, user, and cgroup namespaces are shared with the host.

pub mod uts;

use nix::sched::CloneFlags;

/// Which namespaces a re-executed process is created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceConfig {
    /// Isolate PID namespace. The new process becomes PID 1 inside it.
    pub pid: bool,
    /// Isolate UTS (hostname) namespace.
    pub uts: bool,
}

impl NamespaceConfig {
    /// Returns the `clone(2)` flags requesting the configured namespaces.
    #[must_use]
    pub fn clone_flags(&self) -> CloneFlags {
        let mut flags = CloneFlags::empty();
        if self.uts {
            flags |= CloneFlags::CLONE_NEWUTS;
        }
        if self.pid {
            flags |= CloneFlags::CLONE_NEWPID;
        }
        flags
    }
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            pid: true,
            uts: true,
        }
    }
}
