//! CLI flag definitions and dispatch.

pub mod provision;
pub mod umount;

use std::path::PathBuf;

use clap::Parser;
use jailing_common::config::JailLayout;
use jailing_common::constants::ROOT_ENV;
use jailing_common::types::JailRoot;

/// Build a chroot jail bound to the host's system directories and run a
/// command inside it.
#[derive(Parser, Debug)]
#[command(name = "jailing", version, about, long_about = None)]
pub struct Cli {
    /// Absolute path of the jail root; created if absent.
    #[arg(long, env = ROOT_ENV, value_name = "PATH")]
    pub root: PathBuf,

    /// Host directories to bind read-write, as SRC[:DEST] (repeatable, comma-separated).
    #[arg(long, value_name = "SRC[:DEST]", value_delimiter = ',')]
    pub bind: Vec<String>,

    /// Host directories to bind read-only, as SRC[:DEST] (repeatable, comma-separated).
    #[arg(long, value_name = "SRC[:DEST]", value_delimiter = ',')]
    pub robind: Vec<String>,

    /// Unmount everything below the jail root instead of provisioning it.
    #[arg(long)]
    pub umount: bool,

    /// JSON file replacing parts of the default jail layout.
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Log provisioning steps (overridden by `RUST_LOG`).
    #[arg(short, long)]
    pub verbose: bool,

    /// Command and arguments to run inside the jail.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Dispatches the parsed flags to teardown or provisioning.
///
/// # Errors
///
/// Returns an error if validation, provisioning, teardown, or the handoff
/// fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let root = JailRoot::new(&cli.root)?;
    let layout = match &cli.layout {
        Some(path) => JailLayout::from_json_file(path)?,
        None => JailLayout::default(),
    };

    if cli.umount {
        return umount::execute(&root, &layout);
    }
    provision::execute(&root, &layout, &cli)
}
