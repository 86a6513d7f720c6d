//! Move every file whose name contains "test" into a `tests/` folder.
//!
//! The tree below the start directory is scanned top-down. The destination
//! folder itself is never scanned, and files whose name is already taken in
//! the destination are left where they are.

mod exit_codes;
mod logging;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use relokit_io_fs::{EnumRelocateConflictStrategy, SpecRelocateOptions, relocate_files};

#[derive(Parser)]
#[command(
    name = "relokit",
    version,
    about = "Relocate files with \"test\" in their name into one folder"
)]
struct Cli {
    /// Directory to scan recursively.
    #[arg(default_value = ".")]
    start_dir: PathBuf,

    /// Destination folder name, created under the start directory.
    #[arg(short, long, default_value = "tests")]
    dest: String,

    /// What to do when the destination already holds a file with the same name.
    #[arg(long, value_enum, default_value_t = ConflictArg::Skip)]
    on_conflict: ConflictArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ConflictArg {
    /// Leave the source file in place and report it.
    Skip,
    /// Move under `<stem>_<n><.ext>`.
    Rename,
}

impl From<ConflictArg> for EnumRelocateConflictStrategy {
    fn from(value: ConflictArg) -> Self {
        match value {
            ConflictArg::Skip => Self::Skip,
            ConflictArg::Rename => Self::Rename,
        }
    }
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FATAL);
    }
    std::process::exit(exit_codes::OK);
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let spec_options = SpecRelocateOptions {
        rule_conflict_file: cli.on_conflict.into(),
        ..SpecRelocateOptions::default()
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Starting search and relocation of files...").context("write stdout")?;

    let report = relocate_files(&cli.start_dir, &cli.dest, spec_options, &mut out)
        .with_context(|| format!("relocate files under {}", cli.start_dir.display()))?;
    tracing::debug!(%report, "done");

    writeln!(out, "Done.").context("write stdout")?;
    Ok(())
}
