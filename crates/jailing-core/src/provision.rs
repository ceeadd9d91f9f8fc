//! The provisioning pipeline.
//!
//! Each step checks its own precondition before acting, so a run that
//! failed halfway converges when simply invoked again.

use std::convert::Infallible;

use jailing_common::config::JailLayout;
use jailing_common::error::Result;
use jailing_common::types::{JailRoot, MountSpec};

use crate::filesystem::{device, mount, symlink, teardown, topology};
use crate::handoff;
use crate::os::Os;

/// Builds, enters, or tears down one jail.
#[derive(Debug)]
pub struct Provisioner<'a, O: Os + ?Sized> {
    os: &'a O,
    root: &'a JailRoot,
    layout: &'a JailLayout,
}

impl<'a, O: Os + ?Sized> Provisioner<'a, O> {
    /// Creates a provisioner for `root` shaped by `layout`.
    pub const fn new(os: &'a O, root: &'a JailRoot, layout: &'a JailLayout) -> Self {
        Self { os, root, layout }
    }

    /// Brings the jail to its complete state.
    ///
    /// Runs the skeleton, file copies, host mirrors, custom binds, device
    /// nodes and compatibility symlinks in that order.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; completed steps are kept.
    pub fn provision(&self, binds: &[MountSpec]) -> Result<()> {
        tracing::info!(root = %self.root, binds = binds.len(), "provisioning jail");
        topology::build_skeleton(self.root, self.layout)?;
        topology::copy_files(self.root, self.layout)?;
        mount::mirror_host_dirs(self.os, self.root, self.layout)?;
        mount::bind_custom(self.os, self.root, binds)?;
        device::create_devices(self.os, self.root, self.layout)?;
        symlink::repair_symlinks(self.os, self.root, self.layout)?;
        Ok(())
    }

    /// Provisions the jail, then hands off to `command` if one is given.
    ///
    /// Returns only when `command` is empty; the jail is then ready and the
    /// process has not left the host root.
    ///
    /// # Errors
    ///
    /// Returns the first provisioning error, or the handoff error.
    pub fn run(&self, binds: &[MountSpec], command: &[String]) -> Result<()> {
        self.provision(binds)?;
        if command.is_empty() {
            tracing::info!(root = %self.root, "no command given, jail ready");
            return Ok(());
        }
        match self.enter(command)? {}
    }

    /// Hands the process over to `command` inside the jail.
    ///
    /// # Errors
    ///
    /// Only returns on failure.
    pub fn enter(&self, command: &[String]) -> Result<Infallible> {
        handoff::enter_jail(self.os, self.root, &self.layout.retained_capabilities, command)
    }

    /// Unmounts everything below the jail root. Returns the mount count.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing or an unmount fails.
    pub fn teardown(&self) -> Result<usize> {
        teardown::unmount_all(self.os, self.root)
    }
}
