//! # jailing-core
//!
//! Provisioning and transition engine for chroot-style jails.
//!
//! This crate provides:
//! - **Filesystem**: directory skeleton, read-only host mirrors, custom
//!   binds, device nodes, compatibility symlinks, and teardown.
//! - **Capabilities**: bounding-set enumeration and reduction.
//! - **Handoff**: `chroot(2)` followed by capability drop and `execve(2)`.
//!
//! All system calls go through the [`os::Os`] facade; unsafe calls are
//! confined to [`os::LinuxOs`] with `// SAFETY:` documentation.

pub mod capability;
pub mod filesystem;
pub mod handoff;
pub mod os;
pub mod provision;
