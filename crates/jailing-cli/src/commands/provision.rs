//! Default mode: provision the jail, then report readiness or hand off.

use jailing_common::config::JailLayout;
use jailing_common::error::Result;
use jailing_common::types::{JailRoot, MountSpec};
use jailing_core::os::LinuxOs;
use jailing_core::provision::Provisioner;

use super::Cli;
use crate::output;

/// Provisions `root` and either reports readiness or runs the command.
///
/// Bind specs are validated before anything on disk is touched.
///
/// # Errors
///
/// Returns an error if a bind spec is invalid, provisioning fails, or the
/// command cannot be started inside the jail.
pub fn execute(root: &JailRoot, layout: &JailLayout, cli: &Cli) -> anyhow::Result<()> {
    let binds = parse_binds(&cli.bind, &cli.robind)?;

    Provisioner::new(&LinuxOs, root, layout).run(&binds, &cli.command)?;
    output::ready(root);
    Ok(())
}

fn parse_binds(read_write: &[String], read_only: &[String]) -> Result<Vec<MountSpec>> {
    let rw = read_write.iter().map(|s| MountSpec::parse(s, false));
    let ro = read_only.iter().map(|s| MountSpec::parse(s, true));
    rw.chain(ro).collect()
}
