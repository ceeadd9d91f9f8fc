//! Jail layout configuration.
//!
//! The layout is plain data handed to every provisioning component. The
//! default reproduces the standard jail; a JSON file can replace any part.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{JailError, Result};
use crate::types::{Capability, DeviceNode, LinkSpec};

/// Everything that shapes the filesystem view of a jail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JailLayout {
    /// Host root that bind and copy sources are resolved against.
    pub host_root: PathBuf,
    /// Directories created empty.
    pub new_dirs: Vec<PathBuf>,
    /// World-writable scratch directories.
    pub temp_dirs: Vec<PathBuf>,
    /// Host directories mirrored read-only or as symlinks.
    pub bind_dirs: Vec<PathBuf>,
    /// Host files copied once.
    pub copy_files: Vec<PathBuf>,
    /// Character devices created under `dev/`.
    pub devices: Vec<DeviceNode>,
    /// Compatibility symlinks.
    pub symlinks: Vec<LinkSpec>,
    /// Capabilities kept in the bounding set at handoff.
    pub retained_capabilities: Vec<Capability>,
}

impl Default for JailLayout {
    fn default() -> Self {
        let (link, target) = constants::LOCK_SYMLINK;
        Self {
            host_root: PathBuf::from(constants::HOST_ROOT),
            new_dirs: paths(constants::NEW_DIRS),
            temp_dirs: paths(constants::TEMP_DIRS),
            bind_dirs: paths(constants::BIND_DIRS),
            copy_files: paths(constants::COPY_FILES),
            devices: vec![
                DeviceNode::new("null", 1, 3, 0o666),
                DeviceNode::new("zero", 1, 5, 0o666),
                DeviceNode::new("random", 1, 9, 0o444),
                DeviceNode::new("urandom", 1, 9, 0o444),
            ],
            symlinks: vec![LinkSpec {
                path: PathBuf::from(link),
                target: PathBuf::from(target),
            }],
            retained_capabilities: constants::RETAINED_CAPABILITIES
                .iter()
                .map(|&n| Capability::new(n))
                .collect(),
        }
    }
}

impl JailLayout {
    /// Loads a layout from a JSON file; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid layout.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| JailError::io(path, e))?;
        let layout: Self = serde_json::from_str(&text)?;
        if !layout.host_root.is_absolute() {
            return Err(JailError::Validation {
                message: format!(
                    "layout host_root must be absolute: {}",
                    layout.host_root.display()
                ),
            });
        }
        Ok(layout)
    }

    /// Resolves a layout entry against the host root.
    #[must_use]
    pub fn host_path(&self, relative: &Path) -> PathBuf {
        self.host_root.join(relative.strip_prefix("/").unwrap_or(relative))
    }

    /// Whether a capability survives the bounding-set drop.
    #[must_use]
    pub fn retains(&self, cap: Capability) -> bool {
        self.retained_capabilities.contains(&cap)
    }
}

fn paths(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}
