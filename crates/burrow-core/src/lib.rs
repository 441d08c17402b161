//! # burrow-core
//!
//! Low-level Linux isolation primitives for the Burrow runtime.
//!
//! This crate provides safe wrappers over:
//! - **Namespaces**: selecting the UTS and PID namespaces a new process gets,
//!   and setting the hostname inside a fresh UTS namespace.
//! - **Filesystem**: the `chroot` + `chdir("/")` pair that confines a process
//!   to its provisioned root filesystem.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod filesystem;
pub mod namespace;
