//! Domain primitive types used across the jailing workspace.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{JailError, Result};

/// Absolute path of a jail's root directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JailRoot(PathBuf);

impl JailRoot {
    /// Validates and wraps a jail root path.
    ///
    /// # Errors
    ///
    /// Returns [`JailError::Validation`] if the path is not absolute.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(JailError::Validation {
                message: format!("jail root must be an absolute path: {}", path.display()),
            });
        }
        Ok(Self(path))
    }

    /// Returns the root as a path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Resolves a jail-relative path under this root.
    #[must_use]
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.0.join(strip_root(relative.as_ref()))
    }
}

impl fmt::Display for JailRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A user-requested bind of a host directory into the jail.
///
/// Constructed only through [`MountSpec::new`] or [`MountSpec::parse`], so
/// both paths are always absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec {
    host_path: PathBuf,
    jail_path: PathBuf,
    read_only: bool,
}

impl MountSpec {
    /// Creates a bind spec from a host path and a destination inside the jail.
    ///
    /// # Errors
    ///
    /// Returns [`JailError::Validation`] if either path is relative or the
    /// destination contains a `..` component.
    pub fn new(
        host_path: impl Into<PathBuf>,
        jail_path: impl Into<PathBuf>,
        read_only: bool,
    ) -> Result<Self> {
        let host_path = host_path.into();
        let jail_path = jail_path.into();
        for path in [&host_path, &jail_path] {
            if !path.is_absolute() {
                return Err(JailError::Validation {
                    message: format!("bind paths must be absolute: {}", path.display()),
                });
            }
        }
        if jail_path.components().any(|c| c == Component::ParentDir) {
            return Err(JailError::Validation {
                message: format!(
                    "bind destination must stay inside the jail: {}",
                    jail_path.display()
                ),
            });
        }
        Ok(Self {
            host_path,
            jail_path,
            read_only,
        })
    }

    /// Parses `src[:dest]`; `dest` defaults to `src`.
    ///
    /// # Errors
    ///
    /// Returns [`JailError::Validation`] if the text is empty, either path
    /// is relative, or the destination climbs out with `..`.
    pub fn parse(text: &str, read_only: bool) -> Result<Self> {
        let (src, dest) = text.split_once(':').unwrap_or((text, text));
        if src.is_empty() || dest.is_empty() {
            return Err(JailError::Validation {
                message: format!("malformed bind spec: {text:?}"),
            });
        }
        Self::new(src, dest, read_only)
    }

    /// Host directory to expose.
    #[must_use]
    pub fn host_path(&self) -> &Path {
        &self.host_path
    }

    /// Destination as seen from inside the jail (absolute).
    #[must_use]
    pub fn jail_path(&self) -> &Path {
        &self.jail_path
    }

    /// Whether the bind is remounted read-only.
    #[must_use]
    pub const fn read_only(&self) -> bool {
        self.read_only
    }
}

impl fmt::Display for MountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.read_only { "ro" } else { "rw" };
        write!(
            f,
            "{}:{} ({mode})",
            self.host_path.display(),
            self.jail_path.display()
        )
    }
}

/// A character device node created under the jail's `dev/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceNode {
    /// File name inside `dev/`.
    pub name: String,
    /// Device major number.
    pub major: u64,
    /// Device minor number.
    pub minor: u64,
    /// Permission bits applied to the node.
    pub mode: u32,
}

impl DeviceNode {
    /// Creates a device node description.
    #[must_use]
    pub fn new(name: impl Into<String>, major: u64, minor: u64, mode: u32) -> Self {
        Self {
            name: name.into(),
            major,
            minor,
            mode,
        }
    }
}

/// A symlink placed inside the jail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    /// Jail-relative path of the link.
    pub path: PathBuf,
    /// Link target, stored verbatim.
    pub target: PathBuf,
}

/// A Linux capability number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(u32);

impl Capability {
    /// `CAP_SETGID`.
    pub const SETGID: Self = Self(6);
    /// `CAP_SETUID`.
    pub const SETUID: Self = Self(7);
    /// `CAP_NET_BIND_SERVICE`.
    pub const NET_BIND_SERVICE: Self = Self(10);
    /// `CAP_SYS_ADMIN`.
    pub const SYS_ADMIN: Self = Self(21);

    /// Wraps a raw capability number.
    #[must_use]
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    /// Returns the raw capability number.
    #[must_use]
    pub const fn number(self) -> u32 {
        self.0
    }

    /// Returns the kernel name of the capability, if this build knows it.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        CAPABILITY_NAMES.get(self.0 as usize).copied()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "cap_{}", self.0),
        }
    }
}

const CAPABILITY_NAMES: &[&str] = &[
    "CAP_CHOWN",
    "CAP_DAC_OVERRIDE",
    "CAP_DAC_READ_SEARCH",
    "CAP_FOWNER",
    "CAP_FSETID",
    "CAP_KILL",
    "CAP_SETGID",
    "CAP_SETUID",
    "CAP_SETPCAP",
    "CAP_LINUX_IMMUTABLE",
    "CAP_NET_BIND_SERVICE",
    "CAP_NET_BROADCAST",
    "CAP_NET_ADMIN",
    "CAP_NET_RAW",
    "CAP_IPC_LOCK",
    "CAP_IPC_OWNER",
    "CAP_SYS_MODULE",
    "CAP_SYS_RAWIO",
    "CAP_SYS_CHROOT",
    "CAP_SYS_PTRACE",
    "CAP_SYS_PACCT",
    "CAP_SYS_ADMIN",
    "CAP_SYS_BOOT",
    "CAP_SYS_NICE",
    "CAP_SYS_RESOURCE",
    "CAP_SYS_TIME",
    "CAP_SYS_TTY_CONFIG",
    "CAP_MKNOD",
    "CAP_LEASE",
    "CAP_AUDIT_WRITE",
    "CAP_AUDIT_CONTROL",
    "CAP_SETFCAP",
    "CAP_MAC_OVERRIDE",
    "CAP_MAC_ADMIN",
    "CAP_SYSLOG",
    "CAP_WAKE_ALARM",
    "CAP_BLOCK_SUSPEND",
    "CAP_AUDIT_READ",
    "CAP_PERFMON",
    "CAP_BPF",
    "CAP_CHECKPOINT_RESTORE",
];

/// Drops leading `/` components so a path can be joined under a root.
fn strip_root(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect()
}
