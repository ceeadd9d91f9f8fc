//! `--umount` mode: reverse every mount below the jail root.

use jailing_common::config::JailLayout;
use jailing_common::types::JailRoot;
use jailing_core::os::LinuxOs;
use jailing_core::provision::Provisioner;

use crate::output;

/// Unmounts everything below `root`, leaving its directories in place.
///
/// # Errors
///
/// Returns an error if `root` is not an existing directory or an unmount
/// fails.
pub fn execute(root: &JailRoot, layout: &JailLayout) -> anyhow::Result<()> {
    let os = LinuxOs;
    let count = Provisioner::new(&os, root, layout).teardown()?;
    output::torn_down(root, count);
    Ok(())
}
