//! Process spawning inside isolated namespaces.
//!
//! Two kinds of children are created: the launcher's re-exec of the current
//! binary, which must be born inside new namespaces and therefore goes through
//! `clone(2)`, and the workload, which is an ordinary child with inherited
//! stdio.

use std::ffi::{CString, OsStr};
use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::raw::c_char;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use burrow_common::constants::{FAILURE_EXIT_CODE, INSTANCE_CONTEXT_ENV, SIGNAL_EXIT_OFFSET};
use burrow_common::error::{BurrowError, Result};
use burrow_common::types::ProcessSpec;
use burrow_core::namespace::NamespaceConfig;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::fcntl::OFlag;
use nix::unistd::{Pid, pipe2};

/// Stack handed to the cloned child. It only needs enough room to call `execve`.
const CLONE_STACK_SIZE: usize = 1024 * 1024;

/// Exit status of a cloned child whose `execve` failed, as with shells.
const EXEC_FAILED: isize = 127;

/// Width of the errno a failed child reports over the exec-status pipe.
const ERRNO_LEN: usize = std::mem::size_of::<i32>();

/// A NUL-terminated pointer array over owned C strings.
struct CStringArray {
    _owned: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl CStringArray {
    fn new<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let owned = items
            .into_iter()
            .map(|s| to_cstring(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let ptrs = owned
            .iter()
            .map(|c| c.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();
        Ok(Self {
            _owned: owned,
            ptrs,
        })
    }

    fn as_ptr(&self) -> *const *const c_char {
        self.ptrs.as_ptr()
    }
}

fn to_cstring(bytes: &[u8]) -> Result<CString> {
    CString::new(bytes).map_err(|_| BurrowError::InvalidArgument {
        message: format!(
            "argument contains an interior NUL byte: {}",
            String::from_utf8_lossy(bytes)
        ),
    })
}

/// Builds `KEY=VALUE` entries from the current environment with `extra` layered on top.
fn environment(extra: &[(&str, String)]) -> Vec<Vec<u8>> {
    let mut env: Vec<Vec<u8>> = std::env::vars_os()
        .filter(|(key, _)| !extra.iter().any(|(k, _)| key.as_os_str() == OsStr::new(k)))
        .map(|(key, value)| {
            let mut entry = key.as_bytes().to_vec();
            entry.push(b'=');
            entry.extend_from_slice(value.as_bytes());
            entry
        })
        .collect();
    env.extend(extra.iter().map(|(k, v)| format!("{k}={v}").into_bytes()));
    env
}

/// Starts `exe` with `argv` as a new process inside the configured namespaces
/// and blocks until it exits, returning its exit code.
///
/// The child inherits stdin, stdout, and stderr. `extra_env` is added to the
/// current environment. With a new PID namespace the child is PID 1 inside it.
///
/// # Errors
///
/// Returns [`BurrowError::InvalidArgument`] if an argument contains a NUL
/// byte, [`BurrowError::Syscall`] if `clone(2)` fails, and
/// [`BurrowError::Spawn`] if `exe` could not be executed or waiting on the
/// child fails.
pub fn spawn_in_namespaces(
    exe: &Path,
    argv: &[String],
    extra_env: &[(&str, String)],
    namespaces: NamespaceConfig,
) -> Result<i32> {
    let path = to_cstring(exe.as_os_str().as_bytes())?;
    let c_argv = CStringArray::new(argv)?;
    let c_env = CStringArray::new(environment(extra_env))?;
    let mut stack = vec![0u8; CLONE_STACK_SIZE];

    // Closed by a successful execve. Otherwise the child reports its errno here.
    let (status_read, status_write) = pipe2(OFlag::O_CLOEXEC).map_err(|e| BurrowError::Syscall {
        operation: "pipe2",
        source: e.into(),
    })?;
    let status_fd = status_write.as_raw_fd();

    // Runs in the child. It must not allocate: other threads of the parent
    // may have held the allocator lock when the address space was copied.
    let callback = Box::new(|| -> isize {
        // SAFETY: every pointer refers to a NUL-terminated string owned by
        // the parent's copied address space, and both arrays end in NULL.
        unsafe {
            let _ = libc::execve(path.as_ptr(), c_argv.as_ptr(), c_env.as_ptr());
            let errno = Errno::last_raw().to_ne_bytes();
            let _ = libc::write(status_fd, errno.as_ptr().cast(), errno.len());
        }
        EXEC_FAILED
    });

    let flags = namespaces.clone_flags();
    // SAFETY: the child runs only the callback above, which calls async-signal-safe
    // functions on memory prepared before the clone, and the stack outlives it.
    let pid = unsafe { nix::sched::clone(callback, &mut stack, flags, Some(Signal::SIGCHLD as i32)) }
        .map_err(|e| BurrowError::Syscall {
            operation: "clone",
            source: e.into(),
        })?;
    drop(status_write);

    if let Some(errno) = exec_failure(status_read) {
        let _ = wait_for(pid);
        return Err(BurrowError::Spawn {
            command: exe.display().to_string(),
            source: io::Error::from_raw_os_error(errno),
        });
    }
    tracing::info!(pid = pid.as_raw(), exe = %exe.display(), ?flags, "re-executed in new namespaces");

    wait_for(pid)
}

/// Reads the exec-status pipe until every write end is closed.
///
/// Returns the child's errno if its `execve` failed, `None` once it has
/// exec'd successfully.
fn exec_failure(status_read: OwnedFd) -> Option<i32> {
    let mut report = Vec::with_capacity(ERRNO_LEN);
    let _ = File::from(status_read).read_to_end(&mut report);
    let bytes: [u8; ERRNO_LEN] = report.get(..ERRNO_LEN)?.try_into().ok()?;
    Some(i32::from_ne_bytes(bytes))
}

/// Blocks until `pid` terminates and converts its status into an exit code.
///
/// # Errors
///
/// Returns [`BurrowError::Spawn`] if `waitpid(2)` fails for a reason other than `EINTR`.
pub fn wait_for(pid: Pid) -> Result<i32> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(code),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(SIGNAL_EXIT_OFFSET + signal as i32),
            Ok(_) | Err(Errno::EINTR) => {}
            Err(e) => {
                return Err(BurrowError::Spawn {
                    command: format!("pid {pid}"),
                    source: e.into(),
                });
            }
        }
    }
}

/// Runs the workload as a child with inherited stdio and returns its exit code.
///
/// The instance context variable is not passed on to the workload.
///
/// # Errors
///
/// Returns [`BurrowError::Spawn`] if the command cannot be started.
pub fn run_workload(spec: &ProcessSpec) -> Result<i32> {
    tracing::info!(command = %spec, "starting workload");
    let status = Command::new(&spec.program)
        .args(&spec.args)
        .env_remove(INSTANCE_CONTEXT_ENV)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| BurrowError::Spawn {
            command: spec.program.clone(),
            source: e,
        })?;
    let code = exit_code(status);
    tracing::info!(exit_code = code, "workload exited");
    Ok(code)
}

/// Maps an exit status to a shell-style exit code (`128 + signo` for signals).
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|s| SIGNAL_EXIT_OFFSET + s))
        .unwrap_or(FAILURE_EXIT_CODE)
}
