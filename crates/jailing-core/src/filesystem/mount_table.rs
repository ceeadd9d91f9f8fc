//! Parsing of the kernel mount table (`/proc/self/mounts`).

use std::path::PathBuf;

/// Extracts the mount point column from a `mounts`-format table.
///
/// Lines with fewer than two fields are skipped. The kernel escapes
/// space, tab, newline and backslash as three-digit octal sequences.
#[must_use]
pub fn parse_mount_points(table: &str) -> Vec<PathBuf> {
    table
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(|field| PathBuf::from(unescape(field)))
        .collect()
}

fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if let Some(byte) = bytes.get(i + 1..i + 4).and_then(octal) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn octal(digits: &[u8]) -> Option<u8> {
    digits.iter().try_fold(0u8, |acc, &d| {
        if (b'0'..=b'7').contains(&d) {
            acc.checked_mul(8)?.checked_add(d - b'0')
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/sda1 / ext4 rw,relatime 0 0
/dev/sda1 /srv/jail/usr/bin ext4 ro,relatime 0 0
/dev/sdb1 /srv/my\\040jail/lib ext4 ro,relatime 0 0
";

    #[test]
    fn parses_mount_points_in_table_order() {
        let points = parse_mount_points(TABLE);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], PathBuf::from("/proc"));
        assert_eq!(points[2], PathBuf::from("/srv/jail/usr/bin"));
    }

    #[test]
    fn decodes_octal_escapes() {
        let points = parse_mount_points(TABLE);
        assert_eq!(points[3], PathBuf::from("/srv/my jail/lib"));
    }

    #[test]
    fn leaves_stray_backslashes_alone() {
        assert_eq!(unescape(r"/a\9b"), r"/a\9b");
        assert_eq!(unescape(r"/end\"), r"/end\");
    }

    #[test]
    fn skips_malformed_lines() {
        assert!(parse_mount_points("garbage\n\n").is_empty());
    }
}
