//! Minimal character device nodes under the jail's `dev/`.

use jailing_common::config::JailLayout;
use jailing_common::constants::DEV_DIR;
use jailing_common::error::Result;
use jailing_common::types::JailRoot;

use super::topology::create_dir;
use crate::os::Os;

/// Creates each layout device node whose path is currently absent.
///
/// Whatever already occupies a node's path is accepted as-is; its type is
/// not inspected.
///
/// # Errors
///
/// Returns an error if `dev/` cannot be created or `mknod(2)` fails.
pub fn create_devices<O: Os + ?Sized>(
    os: &O,
    root: &JailRoot,
    layout: &JailLayout,
) -> Result<()> {
    let dev = root.join(DEV_DIR);
    create_dir(&dev)?;
    for node in &layout.devices {
        let path = dev.join(&node.name);
        if path.symlink_metadata().is_ok() {
            tracing::debug!(path = %path.display(), "device node already present");
            continue;
        }
        os.make_char_device(&path, node)?;
        tracing::info!(
            path = %path.display(),
            major = node.major,
            minor = node.minor,
            mode = format_args!("{:o}", node.mode),
            "created device node"
        );
    }
    Ok(())
}
