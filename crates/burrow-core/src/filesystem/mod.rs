//! Filesystem confinement for container isolation.

pub mod chroot;
