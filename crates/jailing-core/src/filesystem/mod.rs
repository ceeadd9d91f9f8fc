//! Filesystem construction and teardown for a jail root.
//!
//! Provides the directory skeleton, read-only host mirrors, device nodes,
//! compatibility symlinks, and mount-table driven teardown.

pub mod device;
pub mod mount;
pub mod mount_table;
pub mod symlink;
pub mod teardown;
pub mod topology;
