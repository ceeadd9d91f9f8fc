//! User-facing status lines.
//!
//! Status goes to stdout so scripts can wait on it; diagnostics go
//! through `tracing` to stderr.

use jailing_common::constants::APP_NAME;
use jailing_common::types::JailRoot;

/// Reports a provisioned jail with no command to run.
#[allow(clippy::print_stdout)]
pub fn ready(root: &JailRoot) {
    println!("{}", ready_message(root));
}

/// Reports a finished teardown.
#[allow(clippy::print_stdout)]
pub fn torn_down(root: &JailRoot, count: usize) {
    println!("{}", teardown_message(root, count));
}

fn ready_message(root: &JailRoot) -> String {
    format!("{APP_NAME}: jail ready at {root}")
}

fn teardown_message(root: &JailRoot, count: usize) -> String {
    let noun = if count == 1 { "mount" } else { "mounts" };
    format!("{APP_NAME}: removed {count} {noun} under {root}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> JailRoot {
        JailRoot::new("/tmp/jailA").unwrap()
    }

    #[test]
    fn ready_message_names_the_root() {
        assert_eq!(ready_message(&root()), "jailing: jail ready at /tmp/jailA");
    }

    #[test]
    fn teardown_message_pluralises() {
        assert_eq!(
            teardown_message(&root(), 1),
            "jailing: removed 1 mount under /tmp/jailA"
        );
        assert_eq!(
            teardown_message(&root(), 0),
            "jailing: removed 0 mounts under /tmp/jailA"
        );
    }
}
