//! Instance bootstrap for the Burrow runtime.
//!
//! The program runs twice per invocation. The [`launcher`] provisions a root
//! filesystem and re-executes the current binary inside new UTS and PID
//! namespaces; the re-executed copy lands in [`entry`], which confines itself
//! and runs the workload.

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod entry;
pub mod launcher;
pub mod process;
