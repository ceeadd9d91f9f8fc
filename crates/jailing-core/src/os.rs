//! Thin facade over the system calls a jail needs.
//!
//! Every mount, device node, chroot, capability change and `execve(2)`
//! goes through [`Os`] so the provisioning logic can be exercised
//! without privilege. [`LinuxOs`] is the real implementation.

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use jailing_common::error::{JailError, Result};
use jailing_common::types::{Capability, DeviceNode};

/// System operations used by the provisioning engine.
pub trait Os {
    /// Bind-mounts `source` onto `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if `mount(2)` fails.
    fn bind_mount(&self, source: &Path, target: &Path) -> Result<()>;

    /// Remounts an existing bind at `target` read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if `mount(2)` fails.
    fn remount_read_only(&self, target: &Path) -> Result<()>;

    /// Unmounts the topmost mount at `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if `umount(2)` fails.
    fn unmount(&self, target: &Path) -> Result<()>;

    /// Lists every mount point in the live mount table, in table order.
    ///
    /// # Errors
    ///
    /// Returns an error if the mount table cannot be read.
    fn mount_points(&self) -> Result<Vec<PathBuf>>;

    /// Reports whether `target` currently shows `source`, i.e. a bind of
    /// `source` is the topmost mount at `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if either path cannot be inspected.
    fn exposes(&self, source: &Path, target: &Path) -> Result<bool>;

    /// Creates a character device node at `path` with the node's exact mode.
    ///
    /// # Errors
    ///
    /// Returns an error if `mknod(2)` or the mode change fails.
    fn make_char_device(&self, path: &Path, node: &DeviceNode) -> Result<()>;

    /// Creates a symlink at `link` pointing to `target`.
    ///
    /// # Errors
    ///
    /// Returns the raw I/O error so callers can tolerate `AlreadyExists`.
    fn symlink(&self, target: &Path, link: &Path) -> std::io::Result<()>;

    /// Changes the root directory of the calling process.
    ///
    /// # Errors
    ///
    /// Returns an error if `chroot(2)` fails.
    fn chroot(&self, root: &Path) -> Result<()>;

    /// Changes the working directory of the calling process.
    ///
    /// # Errors
    ///
    /// Returns an error if `chdir(2)` fails.
    fn chdir(&self, path: &Path) -> Result<()>;

    /// Reports whether `cap` is in the bounding set.
    ///
    /// # Errors
    ///
    /// Returns the raw OS error; `EINVAL` means the kernel does not know `cap`.
    fn capability_bounded(&self, cap: Capability) -> std::io::Result<bool>;

    /// Removes `cap` from the bounding set.
    ///
    /// # Errors
    ///
    /// Returns an error if `prctl(PR_CAPBSET_DROP)` fails.
    fn drop_bounding_capability(&self, cap: Capability) -> Result<()>;

    /// Replaces the process image with `command`, searching `PATH`.
    ///
    /// # Errors
    ///
    /// Only returns if `execvp(3)` failed.
    fn exec(&self, command: &[String]) -> Result<Infallible>;
}

/// [`Os`] backed by the running Linux kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxOs;

#[cfg(target_os = "linux")]
impl Os for LinuxOs {
    fn bind_mount(&self, source: &Path, target: &Path) -> Result<()> {
        use nix::mount::{MsFlags, mount};

        mount(
            Some(source),
            target,
            None::<&str>,
            MsFlags::MS_BIND,
            None::<&str>,
        )
        .map_err(|e| JailError::sys("bind mount", target, e))
    }

    fn remount_read_only(&self, target: &Path) -> Result<()> {
        use nix::mount::{MsFlags, mount};

        mount(
            None::<&str>,
            target,
            None::<&str>,
            MsFlags::MS_BIND | MsFlags::MS_REMOUNT | MsFlags::MS_RDONLY,
            None::<&str>,
        )
        .map_err(|e| JailError::sys("read-only remount", target, e))
    }

    fn unmount(&self, target: &Path) -> Result<()> {
        nix::mount::umount(target).map_err(|e| JailError::sys("unmount", target, e))
    }

    fn mount_points(&self) -> Result<Vec<PathBuf>> {
        let path = Path::new(jailing_common::constants::MOUNT_TABLE_PATH);
        let table = std::fs::read_to_string(path).map_err(|e| JailError::io(path, e))?;
        Ok(crate::filesystem::mount_table::parse_mount_points(&table))
    }

    fn exposes(&self, source: &Path, target: &Path) -> Result<bool> {
        same_file(source, target)
    }

    fn make_char_device(&self, path: &Path, node: &DeviceNode) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        use nix::sys::stat::{Mode, SFlag, makedev, mknod};

        let mode = Mode::from_bits_truncate(node.mode as libc::mode_t);
        mknod(path, SFlag::S_IFCHR, mode, makedev(node.major, node.minor))
            .map_err(|e| JailError::sys("mknod", path, e))?;
        // mknod honours the umask; apply the requested bits exactly.
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(node.mode))
            .map_err(|e| JailError::io(path, e))
    }

    fn symlink(&self, target: &Path, link: &Path) -> std::io::Result<()> {
        std::os::unix::fs::symlink(target, link)
    }

    fn chroot(&self, root: &Path) -> Result<()> {
        nix::unistd::chroot(root).map_err(|e| JailError::sys("chroot", root, e))
    }

    fn chdir(&self, path: &Path) -> Result<()> {
        nix::unistd::chdir(path).map_err(|e| JailError::sys("chdir", path, e))
    }

    #[allow(unsafe_code)]
    fn capability_bounded(&self, cap: Capability) -> std::io::Result<bool> {
        // SAFETY: PR_CAPBSET_READ only reads kernel state; unknown numbers
        // are reported through EINVAL.
        let rc = unsafe {
            libc::prctl(
                libc::PR_CAPBSET_READ,
                libc::c_ulong::from(cap.number()),
                0,
                0,
                0,
            )
        };
        match rc {
            -1 => Err(std::io::Error::last_os_error()),
            rc => Ok(rc == 1),
        }
    }

    #[allow(unsafe_code)]
    fn drop_bounding_capability(&self, cap: Capability) -> Result<()> {
        // SAFETY: PR_CAPBSET_DROP takes a plain integer and touches no
        // memory owned by this process.
        let rc = unsafe {
            libc::prctl(
                libc::PR_CAPBSET_DROP,
                libc::c_ulong::from(cap.number()),
                0,
                0,
                0,
            )
        };
        if rc == -1 {
            return Err(JailError::Capability {
                message: format!(
                    "dropping {cap} from the bounding set failed: {}",
                    std::io::Error::last_os_error()
                ),
            });
        }
        Ok(())
    }

    fn exec(&self, command: &[String]) -> Result<Infallible> {
        use std::ffi::CString;

        let Some(name) = command.first() else {
            return Err(JailError::Validation {
                message: "no command to execute".into(),
            });
        };
        let args = command
            .iter()
            .map(|arg| CString::new(arg.as_str()))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| JailError::Validation {
                message: "command arguments must not contain NUL bytes".into(),
            })?;
        nix::unistd::execvp(&args[0], &args).map_err(|e| JailError::Exec {
            command: name.clone(),
            source: e.into(),
        })
    }
}

#[cfg(not(target_os = "linux"))]
impl Os for LinuxOs {
    fn bind_mount(&self, _source: &Path, _target: &Path) -> Result<()> {
        Err(unsupported())
    }

    fn remount_read_only(&self, _target: &Path) -> Result<()> {
        Err(unsupported())
    }

    fn unmount(&self, _target: &Path) -> Result<()> {
        Err(unsupported())
    }

    fn mount_points(&self) -> Result<Vec<PathBuf>> {
        Err(unsupported())
    }

    fn exposes(&self, source: &Path, target: &Path) -> Result<bool> {
        same_file(source, target)
    }

    fn make_char_device(&self, _path: &Path, _node: &DeviceNode) -> Result<()> {
        Err(unsupported())
    }

    fn symlink(&self, target: &Path, link: &Path) -> std::io::Result<()> {
        std::os::unix::fs::symlink(target, link)
    }

    fn chroot(&self, _root: &Path) -> Result<()> {
        Err(unsupported())
    }

    fn chdir(&self, _path: &Path) -> Result<()> {
        Err(unsupported())
    }

    fn capability_bounded(&self, _cap: Capability) -> std::io::Result<bool> {
        Err(std::io::Error::from(std::io::ErrorKind::Unsupported))
    }

    fn drop_bounding_capability(&self, _cap: Capability) -> Result<()> {
        Err(unsupported())
    }

    fn exec(&self, _command: &[String]) -> Result<Infallible> {
        Err(unsupported())
    }
}

/// A bind mount makes the target report the source's device and inode.
fn same_file(source: &Path, target: &Path) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let src = std::fs::metadata(source).map_err(|e| JailError::io(source, e))?;
    let dst = std::fs::metadata(target).map_err(|e| JailError::io(target, e))?;
    Ok(src.dev() == dst.dev() && src.ino() == dst.ino())
}

#[cfg(not(target_os = "linux"))]
fn unsupported() -> JailError {
    JailError::Validation {
        message: "Linux required for jail operations".into(),
    }
}
