//! Transition of the current process into a provisioned jail.
//!
//! The sequence is fixed: `chroot(2)`, working directory reset, bounding
//! set reduction, then `execve(2)`. The command must never observe the
//! host filesystem or the full capability set.

use std::convert::Infallible;
use std::path::Path;

use jailing_common::error::{JailError, Result};
use jailing_common::types::{Capability, JailRoot};

use crate::capability::{KernelCapabilities, drop_bounding_set};
use crate::os::Os;

/// Chroots into `root`, drops capabilities outside `retained`, and
/// replaces the process image with `command`.
///
/// Only returns on failure.
///
/// # Errors
///
/// Returns an error if `command` is empty or any step fails; nothing is
/// rolled back.
pub fn enter_jail<O: Os + ?Sized>(
    os: &O,
    root: &JailRoot,
    retained: &[Capability],
    command: &[String],
) -> Result<Infallible> {
    if command.is_empty() {
        return Err(JailError::Validation {
            message: "no command given for the jail".into(),
        });
    }

    os.chdir(root.as_path())?;
    os.chroot(root.as_path())?;
    os.chdir(Path::new("/"))?;
    tracing::info!(root = %root, "entered jail");

    let _ = drop_bounding_set(os, &KernelCapabilities::new(os), retained)?;

    tracing::info!(command = ?command, "executing jailed command");
    os.exec(command)
}
