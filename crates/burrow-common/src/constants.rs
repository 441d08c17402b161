//! System-wide constants and default paths.

/// Root filesystem image fetched for every instance.
pub const DEFAULT_ROOTFS_URL: &str =
    "https://dl-cdn.alpinelinux.org/alpine/v3.18/releases/x86_64/alpine-minirootfs-3.18.0-x86_64.tar.gz";

/// Directory under which per-instance scratch directories are created.
pub const DEFAULT_SCRATCH_ROOT: &str = "/tmp";

/// Name of the extracted root filesystem directory inside an instance directory.
pub const ROOTFS_DIR_NAME: &str = "rootfs";

/// Length of the generated instance identifier.
pub const INSTANCE_ID_LENGTH: usize = 8;

/// Internal verb the launcher re-executes itself with.
pub const INTERNAL_VERB: &str = "hey";

/// Environment variable carrying the serialized instance context across the re-exec.
pub const INSTANCE_CONTEXT_ENV: &str = "BURROW_INSTANCE";

/// Exit code reported when an internal step fails or a child returns no status.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Offset added to a signal number when a child is killed by that signal.
pub const SIGNAL_EXIT_OFFSET: i32 = 128;
