//! Default jail layout tables and system-wide constants.
//!
//! These tables seed [`crate::config::JailLayout::default`]; components
//! never read them directly so tests can substitute their own layout.

/// Directories created empty with the default mode.
pub const NEW_DIRS: &[&str] = &["etc", "run", "usr", "var/log"];

/// Scratch directories created world-writable.
pub const TEMP_DIRS: &[&str] = &["tmp", "run/lock", "var/tmp"];

/// Mode applied to every scratch directory.
pub const TEMP_DIR_MODE: u32 = 0o777;

/// Host directories mirrored read-only (or as symlinks) into the jail.
pub const BIND_DIRS: &[&str] = &[
    "bin",
    "lib",
    "lib64",
    "sbin",
    "usr/bin",
    "usr/include",
    "usr/lib",
    "usr/lib64",
    "usr/libexec",
    "usr/sbin",
    "usr/share",
    "usr/src",
    "etc/alternatives",
    "etc/pki/tls/certs",
    "etc/pki/ca-trust",
    "etc/ssl/certs",
];

/// Host files copied into the jail once and never overwritten.
pub const COPY_FILES: &[&str] = &["etc/group", "etc/passwd", "etc/resolv.conf", "etc/hosts"];

/// Directory holding the jail's device nodes.
pub const DEV_DIR: &str = "dev";

/// Compatibility symlink created inside the jail, as `(path, target)`.
pub const LOCK_SYMLINK: (&str, &str) = ("var/lock", "../run/lock");

/// File placed in an empty custom bind source so it reads as non-empty.
pub const BIND_SENTINEL: &str = ".jailing";

/// Capability numbers kept in the bounding set: `CAP_SETGID`, `CAP_SETUID`
/// and `CAP_NET_BIND_SERVICE`.
pub const RETAINED_CAPABILITIES: &[u32] = &[6, 7, 10];

/// Kernel mount table of the calling process.
pub const MOUNT_TABLE_PATH: &str = "/proc/self/mounts";

/// Default host root every bind and copy source is resolved against.
pub const HOST_ROOT: &str = "/";

/// Environment variable that may supply the jail root.
pub const ROOT_ENV: &str = "JAILING_ROOT";

/// Application name used in CLI output.
pub const APP_NAME: &str = "jailing";
