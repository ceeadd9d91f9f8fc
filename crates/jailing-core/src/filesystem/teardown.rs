//! Reversal of every mount beneath a jail root.

use std::path::{Path, PathBuf};

use jailing_common::error::{JailError, Result};
use jailing_common::types::JailRoot;

use crate::os::Os;

/// Unmounts everything mounted strictly below `root`, deepest first.
///
/// Directories are never removed. Returns the number of mounts undone.
///
/// # Errors
///
/// Returns [`JailError::Precondition`] if `root` is not an existing
/// directory, or the first failing unmount.
pub fn unmount_all<O: Os + ?Sized>(os: &O, root: &JailRoot) -> Result<usize> {
    let path = root.as_path();
    if !path.is_dir() {
        return Err(JailError::Precondition {
            path: path.to_path_buf(),
            message: "jail root does not exist or is not a directory".into(),
        });
    }
    // The kernel reports resolved paths.
    let resolved = std::fs::canonicalize(path).map_err(|e| JailError::io(path, e))?;

    let targets = unmount_order(&resolved, os.mount_points()?);
    for target in &targets {
        os.unmount(target)?;
        tracing::info!(target = %target.display(), "unmounted");
    }
    tracing::info!(root = %root, count = targets.len(), "jail torn down");
    Ok(targets.len())
}

/// Selects mounts under `root` and orders them so children go before
/// parents and, at equal depth, later mounts before earlier ones.
fn unmount_order(root: &Path, table: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut targets: Vec<PathBuf> = table
        .into_iter()
        .rev()
        .filter(|p| p != root && p.starts_with(root))
        .collect();
    targets.sort_by_key(|p| std::cmp::Reverse(p.components().count()));
    targets
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::os::testing::{Call, FakeOs};

    #[test]
    fn orders_children_before_parents() {
        let table = vec![
            PathBuf::from("/srv/jail/usr"),
            PathBuf::from("/srv/jail/usr/lib"),
            PathBuf::from("/srv/jail/bin"),
        ];
        let order = unmount_order(Path::new("/srv/jail"), table);
        assert_eq!(
            order,
            vec![
                PathBuf::from("/srv/jail/usr/lib"),
                PathBuf::from("/srv/jail/bin"),
                PathBuf::from("/srv/jail/usr"),
            ]
        );
    }

    #[test]
    fn ignores_root_itself_and_prefix_siblings() {
        let table = vec![
            PathBuf::from("/srv/jail"),
            PathBuf::from("/srv/jail2/bin"),
            PathBuf::from("/srv/jailbin"),
            PathBuf::from("/proc"),
        ];
        assert!(unmount_order(Path::new("/srv/jail"), table).is_empty());
    }

    #[test]
    fn stacked_mounts_are_each_unmounted() {
        let table = vec![PathBuf::from("/srv/jail/data"), PathBuf::from("/srv/jail/data")];
        assert_eq!(unmount_order(Path::new("/srv/jail"), table).len(), 2);
    }

    #[test]
    fn removes_exactly_the_jail_mounts_and_keeps_directories() {
        let dir = tempfile::tempdir().unwrap();
        let base = fs::canonicalize(dir.path()).unwrap();
        for sub in ["usr/bin", "lib", "data"] {
            fs::create_dir_all(base.join(sub)).unwrap();
        }
        let os = FakeOs::default();
        os.mounts.borrow_mut().extend([
            PathBuf::from("/proc"),
            base.join("usr/bin"),
            base.join("lib"),
            base.join("data"),
        ]);

        let root = JailRoot::new(&base).unwrap();
        assert_eq!(unmount_all(&os, &root).unwrap(), 3);
        assert_eq!(*os.mounts.borrow(), vec![PathBuf::from("/proc")]);
        assert_eq!(
            os.calls().iter().filter(|c| matches!(c, Call::Unmount(_))).count(),
            3
        );
        for sub in ["usr/bin", "lib", "data"] {
            assert!(base.join(sub).is_dir());
        }
    }

    #[test]
    fn missing_root_is_a_precondition_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = JailRoot::new(dir.path().join("absent")).unwrap();
        assert!(matches!(
            unmount_all(&FakeOs::default(), &root),
            Err(JailError::Precondition { .. })
        ));
    }

    #[test]
    fn file_root_is_a_precondition_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, b"").unwrap();
        let root = JailRoot::new(file).unwrap();
        assert!(matches!(
            unmount_all(&FakeOs::default(), &root),
            Err(JailError::Precondition { .. })
        ));
    }
}
