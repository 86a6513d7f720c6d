//! Filesystem tree traversal and move orchestration.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::report::{ReportRelocate, ReportRelocateBuilder};
use crate::spec::{
    EnumRelocateConflictStrategy, EnumRelocateOutcome, RelocateError, SpecRelocateOptions,
};
use crate::status::StatusWriter;
use crate::util::{
    SpecRelocatePattern, absolutize_path, derive_renamed_destination, dir_identity,
    is_path_occupied, move_entry, validate_destination_name,
};

#[derive(Debug, Clone)]
struct SpecFileEntry {
    path_file_src: PathBuf,
    name_file: OsString,
}

struct SpecRelocateContext<'a, W: Write> {
    path_dir_dst: PathBuf,
    id_dir_dst: Option<(u64, u64)>,
    rule_conflict_file: EnumRelocateConflictStrategy,
    spec_pattern: SpecRelocatePattern,
    builder_report: ReportRelocateBuilder,
    status: StatusWriter<'a, W>,
}

/// Move every file below `dir_start` whose name matches the configured
/// pattern into `dir_start/name_dir_destination`.
///
/// This function performs:
/// 1. Input validation (destination name, pattern).
/// 2. Destination creation when missing.
/// 3. Top-down traversal; the destination directory is pruned.
/// 4. One move attempt per matched file, with collisions handled by
///    [`SpecRelocateOptions::rule_conflict_file`].
/// 5. Summary line and report aggregation.
///
/// Progress is written line by line to `status_sink`.
///
/// Returns [`ReportRelocate`] when the run completes (with possible per-file
/// errors stored in the report). Returns [`RelocateError`] only for setup
/// failures, in which case no file has been moved.
pub fn relocate_files<P, W>(
    dir_start: P,
    name_dir_destination: &str,
    spec_options: SpecRelocateOptions,
    status_sink: &mut W,
) -> Result<ReportRelocate, RelocateError>
where
    P: AsRef<Path>,
    W: Write,
{
    validate_destination_name(name_dir_destination)?;
    let spec_pattern =
        SpecRelocatePattern::compile(&spec_options.pattern, spec_options.rule_pattern)?;

    let path_dir_start = absolutize_path(dir_start.as_ref());
    let path_dir_dst = absolutize_path(&path_dir_start.join(name_dir_destination));

    let mut status = StatusWriter::new(status_sink);
    let if_created_dst = ensure_destination(&path_dir_dst)?;
    if if_created_dst {
        tracing::debug!(dst = %path_dir_dst.display(), "created destination directory");
        status.created_destination(&path_dir_dst);
    }

    let mut spec_ctx = SpecRelocateContext {
        path_dir_dst: path_dir_dst.clone(),
        id_dir_dst: dir_identity(&path_dir_dst),
        rule_conflict_file: spec_options.rule_conflict_file,
        spec_pattern,
        builder_report: ReportRelocateBuilder::new(path_dir_dst, if_created_dst),
        status,
    };

    walk_directory(&path_dir_start, &mut spec_ctx);

    let cnt_moved = spec_ctx.builder_report.cnt_moved();
    spec_ctx
        .status
        .summary(cnt_moved, &spec_options.pattern, name_dir_destination);
    spec_ctx.status.flush();

    let report = spec_ctx.builder_report.build();
    tracing::debug!(%report, "relocation finished");
    Ok(report)
}

/// Returns whether the directory had to be created.
fn ensure_destination(path_dir_dst: &Path) -> Result<bool, RelocateError> {
    match fs::metadata(path_dir_dst) {
        Ok(meta_dir_dst) if meta_dir_dst.is_dir() => return Ok(false),
        Ok(_) => {
            return Err(RelocateError::DirectoryCreation {
                path: path_dir_dst.to_path_buf(),
                message: "Destination exists and is not a directory.".to_string(),
            });
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(RelocateError::DirectoryCreation {
                path: path_dir_dst.to_path_buf(),
                message: e.to_string(),
            });
        }
    }

    fs::create_dir_all(path_dir_dst).map_err(|e| RelocateError::DirectoryCreation {
        path: path_dir_dst.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(true)
}

fn is_destination_dir<W: Write>(path_dir: &Path, spec_ctx: &SpecRelocateContext<'_, W>) -> bool {
    if path_dir == spec_ctx.path_dir_dst {
        return true;
    }
    spec_ctx
        .id_dir_dst
        .is_some_and(|id_dir_dst| dir_identity(path_dir) == Some(id_dir_dst))
}

fn walk_directory<W: Write>(path_root: &Path, spec_ctx: &mut SpecRelocateContext<'_, W>) {
    if is_destination_dir(path_root, spec_ctx) {
        tracing::debug!(dir = %path_root.display(), "destination directory pruned");
        return;
    }
    tracing::debug!(dir = %path_root.display(), "visiting directory");

    let mut l_dirs: Vec<PathBuf> = Vec::new();
    let mut l_files: Vec<SpecFileEntry> = Vec::new();

    let iter_entries = match fs::read_dir(path_root) {
        Ok(iter) => iter,
        Err(e) => {
            tracing::warn!(dir = %path_root.display(), error = %e, "failed to read directory");
            spec_ctx.builder_report.add_warning(format!(
                "Failed to read directory {} ({e})",
                path_root.display()
            ));
            return;
        }
    };

    for _entry_res in iter_entries {
        let entry = match _entry_res {
            Ok(v) => v,
            Err(e) => {
                spec_ctx.builder_report.add_warning(format!(
                    "Failed to read directory entry under {} ({e})",
                    path_root.display()
                ));
                continue;
            }
        };

        let path_entry = entry.path();
        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) => {
                spec_ctx
                    .builder_report
                    .add_warning(format!("Failed to inspect {} ({e})", path_entry.display()));
                continue;
            }
        };

        // Symlinks to directories count as directories but are never followed.
        if cfg_file_type.is_dir() {
            l_dirs.push(path_entry);
        } else if cfg_file_type.is_symlink() && path_entry.is_dir() {
            tracing::debug!(dir = %path_entry.display(), "symlinked directory not followed");
        } else {
            l_files.push(SpecFileEntry {
                path_file_src: path_entry,
                name_file: entry.file_name(),
            });
        }
    }

    l_dirs.sort();
    l_files.sort_by(|a, b| a.name_file.cmp(&b.name_file));

    for _file_entry in l_files {
        handle_file_entry(_file_entry, spec_ctx);
    }

    for path_dir_sub in l_dirs {
        walk_directory(&path_dir_sub, spec_ctx);
    }
}

fn handle_file_entry<W: Write>(
    spec_file_entry: SpecFileEntry,
    spec_ctx: &mut SpecRelocateContext<'_, W>,
) {
    spec_ctx.builder_report.add_scanned();

    let name_file = spec_file_entry.name_file.to_string_lossy().into_owned();
    if !spec_ctx.spec_pattern.is_match(&name_file) {
        return;
    }
    spec_ctx.builder_report.add_matched();

    let path_file_dst = spec_ctx.path_dir_dst.join(&spec_file_entry.name_file);
    if spec_file_entry.path_file_src == path_file_dst {
        return;
    }

    let outcome = relocate_file(
        &spec_file_entry,
        path_file_dst,
        &spec_ctx.path_dir_dst,
        spec_ctx.rule_conflict_file,
    );
    match &outcome {
        EnumRelocateOutcome::Moved { path_src, path_dst } => {
            tracing::debug!(src = %path_src.display(), dst = %path_dst.display(), "moved");
            spec_ctx.status.moved(path_src, path_dst);
        }
        EnumRelocateOutcome::SkippedCollision { path_dst, .. } => {
            tracing::debug!(dst = %path_dst.display(), "destination occupied; skipped");
            spec_ctx.status.collision(&name_file, &spec_ctx.path_dir_dst);
        }
        EnumRelocateOutcome::Failed { path_src, message } => {
            tracing::warn!(src = %path_src.display(), error = %message, "move failed");
            spec_ctx.status.failed(path_src, message);
        }
    }
    spec_ctx.builder_report.add_outcome(outcome);
}

fn relocate_file(
    spec_file_entry: &SpecFileEntry,
    path_file_dst: PathBuf,
    path_dir_dst: &Path,
    rule_conflict_file: EnumRelocateConflictStrategy,
) -> EnumRelocateOutcome {
    let path_src = spec_file_entry.path_file_src.clone();
    let if_occupied = match is_path_occupied(&path_file_dst) {
        Ok(v) => v,
        Err(e) => {
            return EnumRelocateOutcome::Failed {
                path_src,
                message: e.to_string(),
            };
        }
    };
    let path_target = if if_occupied {
        match rule_conflict_file {
            EnumRelocateConflictStrategy::Skip => {
                return EnumRelocateOutcome::SkippedCollision {
                    path_src,
                    path_dst: path_file_dst,
                };
            }
            EnumRelocateConflictStrategy::Rename => {
                match derive_renamed_destination(path_dir_dst, &spec_file_entry.name_file) {
                    Ok(v) => v,
                    Err(e) => {
                        return EnumRelocateOutcome::Failed {
                            path_src,
                            message: e.to_string(),
                        };
                    }
                }
            }
        }
    } else {
        path_file_dst
    };

    match move_entry(&path_src, &path_target) {
        Ok(()) => EnumRelocateOutcome::Moved {
            path_src,
            path_dst: path_target,
        },
        Err(e) => EnumRelocateOutcome::Failed {
            path_src,
            message: e.to_string(),
        },
    }
}
