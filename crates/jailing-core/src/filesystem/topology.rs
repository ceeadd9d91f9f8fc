//! Jail directory skeleton and one-time configuration copies.

use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

use jailing_common::config::JailLayout;
use jailing_common::constants::TEMP_DIR_MODE;
use jailing_common::error::{JailError, Result};
use jailing_common::types::JailRoot;

/// Creates the root plus every empty and scratch directory of the layout.
///
/// Scratch directories are forced to mode `0777`; a jail without writable
/// scratch space is unusable, so a failed mode change is fatal.
///
/// # Errors
///
/// Returns an error if a directory cannot be created or its mode changed.
pub fn build_skeleton(root: &JailRoot, layout: &JailLayout) -> Result<()> {
    create_dir(root.as_path())?;
    for dir in layout.new_dirs.iter().chain(&layout.temp_dirs) {
        create_dir(&root.join(dir))?;
    }
    for dir in &layout.temp_dirs {
        let path = root.join(dir);
        fs::set_permissions(&path, fs::Permissions::from_mode(TEMP_DIR_MODE))
            .map_err(|e| JailError::io(&path, e))?;
    }
    tracing::debug!(root = %root, "jail skeleton ready");
    Ok(())
}

/// Copies each layout file from the host unless the jail already has it.
///
/// Existing jail copies are never overwritten, so local edits survive
/// re-provisioning. Sources missing on the host are skipped.
///
/// # Errors
///
/// Returns an error if a present source cannot be copied.
pub fn copy_files(root: &JailRoot, layout: &JailLayout) -> Result<()> {
    for file in &layout.copy_files {
        let target = root.join(file);
        if target.symlink_metadata().is_ok() {
            tracing::debug!(path = %target.display(), "jail copy already present");
            continue;
        }
        let source = layout.host_path(file);
        if !source.exists() {
            tracing::warn!(source = %source.display(), "copy source missing on host, skipping");
            continue;
        }
        if let Some(parent) = target.parent() {
            create_dir(parent)?;
        }
        copy_preserving(&source, &target)?;
        tracing::info!(source = %source.display(), target = %target.display(), "copied file into jail");
    }
    Ok(())
}

pub(crate) fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| JailError::io(path, e))
}

/// Copies a file keeping its mode, ownership and timestamps.
///
/// The target is opened with `create_new`, so a copy that appeared since
/// the existence check is never clobbered.
fn copy_preserving(source: &Path, target: &Path) -> Result<()> {
    let meta = fs::metadata(source).map_err(|e| JailError::io(source, e))?;
    let mut input = fs::File::open(source).map_err(|e| JailError::io(source, e))?;
    let mut output = fs::File::create_new(target).map_err(|e| JailError::io(target, e))?;
    let _ = std::io::copy(&mut input, &mut output).map_err(|e| JailError::io(target, e))?;

    let times = fs::FileTimes::new()
        .set_accessed(meta.accessed().map_err(|e| JailError::io(source, e))?)
        .set_modified(meta.modified().map_err(|e| JailError::io(source, e))?);
    output
        .set_times(times)
        .and_then(|()| output.set_permissions(meta.permissions()))
        .map_err(|e| JailError::io(target, e))?;

    if let Err(e) = std::os::unix::fs::fchown(&output, Some(meta.uid()), Some(meta.gid())) {
        // Unprivileged runs cannot hand files to other owners.
        tracing::debug!(target = %target.display(), error = %e, "ownership not preserved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn layout_with_host(host: &Path) -> JailLayout {
        JailLayout {
            host_root: host.to_path_buf(),
            ..JailLayout::default()
        }
    }

    #[test]
    fn skeleton_creates_all_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = JailRoot::new(dir.path().join("jail")).unwrap();
        build_skeleton(&root, &JailLayout::default()).unwrap();

        for name in ["etc", "run", "usr", "var/log", "tmp", "run/lock", "var/tmp"] {
            assert!(root.join(name).is_dir(), "{name} missing");
        }
    }

    #[test]
    fn skeleton_makes_scratch_dirs_world_writable() {
        let dir = tempfile::tempdir().unwrap();
        let root = JailRoot::new(dir.path()).unwrap();
        build_skeleton(&root, &JailLayout::default()).unwrap();

        let mode = fs::metadata(root.join("var/tmp")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o777);
    }

    #[test]
    fn skeleton_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let root = JailRoot::new(dir.path()).unwrap();
        build_skeleton(&root, &JailLayout::default()).unwrap();
        build_skeleton(&root, &JailLayout::default()).unwrap();
    }

    #[test]
    fn copies_files_once_and_keeps_local_edits() {
        let host = tempfile::tempdir().unwrap();
        fs::create_dir_all(host.path().join("etc")).unwrap();
        fs::write(host.path().join("etc/passwd"), "root:x:0:0::/root:/bin/sh\n").unwrap();
        let jail = tempfile::tempdir().unwrap();
        let root = JailRoot::new(jail.path()).unwrap();
        let layout = layout_with_host(host.path());

        copy_files(&root, &layout).unwrap();
        assert_eq!(
            fs::read_to_string(root.join("etc/passwd")).unwrap(),
            "root:x:0:0::/root:/bin/sh\n"
        );

        fs::write(root.join("etc/passwd"), "edited\n").unwrap();
        copy_files(&root, &layout).unwrap();
        assert_eq!(fs::read_to_string(root.join("etc/passwd")).unwrap(), "edited\n");
    }

    #[test]
    fn copy_skips_sources_missing_on_host() {
        let host = tempfile::tempdir().unwrap();
        let jail = tempfile::tempdir().unwrap();
        let root = JailRoot::new(jail.path()).unwrap();

        copy_files(&root, &layout_with_host(host.path())).unwrap();
        assert!(!root.join("etc/hosts").exists());
    }

    #[test]
    fn copy_preserves_mode() {
        let host = tempfile::tempdir().unwrap();
        let source = host.path().join("etc/group");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "wheel:x:10:\n").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o640)).unwrap();
        let jail = tempfile::tempdir().unwrap();
        let root = JailRoot::new(jail.path()).unwrap();
        let layout = JailLayout {
            copy_files: vec![PathBuf::from("etc/group")],
            ..layout_with_host(host.path())
        };

        copy_files(&root, &layout).unwrap();
        let mode = fs::metadata(root.join("etc/group")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
