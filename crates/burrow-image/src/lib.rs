//! # burrow-image
//!
//! Root filesystem materialization for the Burrow runtime.
//!
//! Handles:
//! - **Sources**: blocking HTTP(S) download of the rootfs archive.
//! - **Archives**: sequential, order-preserving extraction of tar and
//!   gzip-compressed tar archives.
//! - **Rootfs**: the one-shot provisioning pipeline that ties both together
//!   under `<scratch-root>/<id>/rootfs`.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod archive;
pub mod rootfs;
pub mod source;

#[cfg(test)]
pub(crate) mod testutil;
