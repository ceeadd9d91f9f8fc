//! Compatibility symlinks inside the jail.

use std::io::ErrorKind;

use jailing_common::config::JailLayout;
use jailing_common::error::{JailError, Result};
use jailing_common::types::JailRoot;

use crate::os::Os;

/// Creates each layout symlink, treating an occupied path as done.
///
/// # Errors
///
/// Returns an error if link creation fails for any reason other than the
/// path already existing.
pub fn repair_symlinks<O: Os + ?Sized>(
    os: &O,
    root: &JailRoot,
    layout: &JailLayout,
) -> Result<()> {
    for link in &layout.symlinks {
        let path = root.join(&link.path);
        match os.symlink(&link.target, &path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), target = %link.target.display(), "created symlink");
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!(path = %path.display(), "symlink path already occupied");
            }
            Err(e) => return Err(JailError::io(path, e)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::os::testing::FakeOs;

    #[test]
    fn creates_var_lock_link() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("var")).unwrap();
        let root = JailRoot::new(dir.path()).unwrap();
        repair_symlinks(&FakeOs::default(), &root, &JailLayout::default()).unwrap();

        assert_eq!(
            fs::read_link(root.join("var/lock")).unwrap(),
            PathBuf::from("../run/lock")
        );
    }

    #[test]
    fn existing_directory_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("var/lock")).unwrap();
        let root = JailRoot::new(dir.path()).unwrap();
        repair_symlinks(&FakeOs::default(), &root, &JailLayout::default()).unwrap();

        assert!(root.join("var/lock").is_dir());
    }

    #[test]
    fn rerun_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("var")).unwrap();
        let root = JailRoot::new(dir.path()).unwrap();
        let os = FakeOs::default();
        repair_symlinks(&os, &root, &JailLayout::default()).unwrap();
        repair_symlinks(&os, &root, &JailLayout::default()).unwrap();
    }

    #[test]
    fn missing_parent_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = JailRoot::new(dir.path()).unwrap();
        assert!(repair_symlinks(&FakeOs::default(), &root, &JailLayout::default()).is_err());
    }
}
