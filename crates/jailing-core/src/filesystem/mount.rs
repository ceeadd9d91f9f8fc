//! Bind mounts of host directories into the jail.
//!
//! For the host allow-list, emptiness of the jail-side directory is the
//! idempotency signal: a non-empty target means an earlier run already
//! satisfied it. User-requested binds are satisfied once the destination
//! shows the requested source.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use jailing_common::config::JailLayout;
use jailing_common::constants::BIND_SENTINEL;
use jailing_common::error::{JailError, Result};
use jailing_common::types::{JailRoot, MountSpec};

use super::topology::create_dir;
use crate::os::Os;

/// Mirrors the layout's host directories into the jail.
///
/// Entries absent on the host are skipped. A host symlink is recreated as
/// a symlink; anything else becomes a read-only bind. A failed bind is
/// logged and skipped so a re-run can converge; a bind that cannot be made
/// read-only is fatal.
///
/// # Errors
///
/// Returns an error if a jail directory cannot be created or inspected, or
/// if a read-only remount fails.
pub fn mirror_host_dirs<O: Os + ?Sized>(
    os: &O,
    root: &JailRoot,
    layout: &JailLayout,
) -> Result<()> {
    for dir in &layout.bind_dirs {
        let host = layout.host_path(dir);
        let Ok(meta) = host.symlink_metadata() else {
            tracing::debug!(host = %host.display(), "not present on host, skipping");
            continue;
        };
        let target = root.join(dir);

        if meta.file_type().is_symlink() {
            mirror_symlink(os, &host, &target)?;
            continue;
        }

        create_dir(&target)?;
        if !is_empty_dir(&target)? {
            tracing::debug!(target = %target.display(), "bind already satisfied");
            continue;
        }
        match os.bind_mount(&host, &target) {
            Ok(()) => {
                os.remount_read_only(&target)?;
                tracing::info!(host = %host.display(), target = %target.display(), "bound read-only");
            }
            Err(e) => tracing::warn!(error = %e, "skipping host directory"),
        }
    }
    Ok(())
}

/// Applies user-requested binds: read-write specs first, then read-only.
///
/// A destination already showing its last requested source is left alone,
/// so a re-run applies nothing there; otherwise every spec naming it is
/// bound in order and later ones shadow earlier ones. Existing content at
/// the destination, copied files or a static bind, does not prevent the
/// bind. Empty sources receive a sentinel file first.
///
/// # Errors
///
/// Any failure is fatal: these binds were asked for explicitly.
pub fn bind_custom<O: Os + ?Sized>(os: &O, root: &JailRoot, specs: &[MountSpec]) -> Result<()> {
    let ordered: Vec<&MountSpec> = specs
        .iter()
        .filter(|s| !s.read_only())
        .chain(specs.iter().filter(|s| s.read_only()))
        .collect();

    // The last spec per destination is the one a finished run leaves visible.
    let mut topmost: HashMap<PathBuf, &Path> = HashMap::new();
    for spec in &ordered {
        mark_non_empty(spec.host_path())?;
        let target = root.join(spec.jail_path());
        create_dir(&target)?;
        let _ = topmost.insert(target, spec.host_path());
    }
    let mut satisfied = HashSet::new();
    for (target, source) in &topmost {
        if os.exposes(source, target)? {
            tracing::debug!(target = %target.display(), "custom bind already in place");
            let _ = satisfied.insert(target.clone());
        }
    }

    for spec in ordered {
        let target = root.join(spec.jail_path());
        if satisfied.contains(&target) {
            continue;
        }
        os.bind_mount(spec.host_path(), &target)?;
        if spec.read_only() {
            os.remount_read_only(&target)?;
        }
        tracing::info!(spec = %spec, target = %target.display(), "custom bind applied");
    }
    Ok(())
}

fn mirror_symlink<O: Os + ?Sized>(os: &O, host: &Path, target: &Path) -> Result<()> {
    if target
        .symlink_metadata()
        .is_ok_and(|m| m.file_type().is_symlink())
    {
        tracing::debug!(target = %target.display(), "symlink already mirrored");
        return Ok(());
    }
    let link = fs::read_link(host).map_err(|e| JailError::io(host, e))?;
    if let Some(parent) = target.parent() {
        create_dir(parent)?;
    }
    match os.symlink(&link, target) {
        Ok(()) => {
            tracing::info!(target = %target.display(), link = %link.display(), "mirrored host symlink");
        }
        Err(e) => {
            tracing::warn!(target = %target.display(), error = %e, "cannot mirror host symlink");
        }
    }
    Ok(())
}

fn mark_non_empty(source: &Path) -> Result<()> {
    if source.is_dir() && is_empty_dir(source)? {
        let sentinel = source.join(BIND_SENTINEL);
        fs::write(&sentinel, b"").map_err(|e| JailError::io(&sentinel, e))?;
        tracing::debug!(sentinel = %sentinel.display(), "marked empty bind source");
    }
    Ok(())
}

pub(crate) fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(path).map_err(|e| JailError::io(path, e))?;
    Ok(entries.next().is_none())
}
