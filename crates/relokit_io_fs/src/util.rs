use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use regex::{Regex, RegexBuilder};

use crate::spec::{EnumRelocatePatternMode, RelocateError};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

/// Compiled, case-insensitive file-name predicate.
#[derive(Debug, Clone)]
pub(crate) enum SpecRelocatePattern {
    /// Lower-cased needle.
    Literal(String),
    Glob(GlobMatcher),
    Regex(Regex),
}

impl SpecRelocatePattern {
    pub(crate) fn compile(
        pattern: &str,
        rule_pattern: EnumRelocatePatternMode,
    ) -> Result<Self, RelocateError> {
        if pattern.is_empty() {
            return Err(RelocateError::InvalidPattern(
                "Arg `pattern` must not be empty.".to_string(),
            ));
        }

        match rule_pattern {
            EnumRelocatePatternMode::Literal => Ok(Self::Literal(pattern.to_lowercase())),
            EnumRelocatePatternMode::Glob => {
                let matcher = GlobBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        RelocateError::InvalidPattern(format!("Invalid glob pattern: {e}"))
                    })?
                    .compile_matcher();
                Ok(Self::Glob(matcher))
            }
            EnumRelocatePatternMode::Regex => {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        RelocateError::InvalidPattern(format!("Invalid regex pattern: {e}"))
                    })?;
                Ok(Self::Regex(regex))
            }
        }
    }

    pub(crate) fn is_match(&self, name_file: &str) -> bool {
        match self {
            Self::Literal(needle) => name_file.to_lowercase().contains(needle.as_str()),
            Self::Glob(matcher) => matcher.is_match(name_file),
            Self::Regex(regex) => regex.is_match(name_file),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _normalize_lexically(path: &Path) -> PathBuf {
    let mut path_out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                path_out.pop();
            }
            other => path_out.push(other.as_os_str()),
        }
    }
    path_out
}

/// Absolute path with `.`/`..` removed; symlinks are left unresolved.
pub(crate) fn absolutize_path(path: &Path) -> PathBuf {
    let path_abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    _normalize_lexically(&path_abs)
}

/// The destination must be a relative path that stays below the start directory.
pub(crate) fn validate_destination_name(name_dir_dst: &str) -> Result<(), RelocateError> {
    let path_name = Path::new(name_dir_dst);
    if name_dir_dst.is_empty() {
        return Err(RelocateError::InvalidDestinationName(
            "Destination folder name must not be empty.".to_string(),
        ));
    }
    if path_name.is_absolute() || path_name.has_root() {
        return Err(RelocateError::InvalidDestinationName(format!(
            "Destination folder name must be relative: {name_dir_dst}"
        )));
    }

    let mut n_normal = 0usize;
    for component in path_name.components() {
        match component {
            Component::Normal(_) => n_normal += 1,
            Component::CurDir => {}
            _ => {
                return Err(RelocateError::InvalidDestinationName(format!(
                    "Destination folder name escapes the start directory: {name_dir_dst}"
                )));
            }
        }
    }
    if n_normal == 0 {
        return Err(RelocateError::InvalidDestinationName(format!(
            "Destination folder name must name a directory below the start directory: {name_dir_dst}"
        )));
    }
    Ok(())
}

/// `(dev, ino)` of the directory at `path`, following symlinks.
#[cfg(unix)]
pub(crate) fn dir_identity(path: &Path) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;

    fs::metadata(path).ok().map(|stat| (stat.dev(), stat.ino()))
}

#[cfg(not(unix))]
pub(crate) fn dir_identity(_path: &Path) -> Option<(u64, u64)> {
    None
}

/// Whether any entry (including a dangling symlink) occupies `path`.
///
/// Errors other than `NotFound` are returned; the caller cannot tell whether
/// the name is taken.
pub(crate) fn is_path_occupied(path: &Path) -> Result<bool, io::Error> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// First free `<stem>_<i><.ext>` under `path_dir_dst`, starting at `i = 1`.
pub(crate) fn derive_renamed_destination(
    path_dir_dst: &Path,
    name_file: &OsStr,
) -> Result<PathBuf, io::Error> {
    let path_name = Path::new(name_file);
    let stem = path_name.file_stem().unwrap_or(name_file);
    let extension = path_name.extension();

    let mut i: u64 = 1;
    loop {
        let mut name_candidate = OsString::from(stem);
        name_candidate.push(format!("_{i}"));
        if let Some(extension) = extension {
            name_candidate.push(".");
            name_candidate.push(extension);
        }
        let path_candidate = path_dir_dst.join(name_candidate);
        if !is_path_occupied(&path_candidate)? {
            return Ok(path_candidate);
        }
        i += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MovePrimitives

/// Move one non-directory entry, falling back to copy-then-delete across
/// filesystems.
pub(crate) fn move_entry(path_src: &Path, path_dst: &Path) -> Result<(), io::Error> {
    match fs::rename(path_src, path_dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(
                src = %path_src.display(),
                dst = %path_dst.display(),
                "rename crosses devices; copying instead"
            );
            move_across_devices(path_src, path_dst)
        }
        Err(e) => Err(e),
    }
}

fn move_across_devices(path_src: &Path, path_dst: &Path) -> Result<(), io::Error> {
    let meta_src = fs::symlink_metadata(path_src)?;
    let cfg_file_type = meta_src.file_type();
    if cfg_file_type.is_symlink() {
        create_symbolic_link(path_src, path_dst)?;
    } else if cfg_file_type.is_file() {
        copy_file_with_metadata(path_src, path_dst)?;
    } else {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!(
                "Special file cannot be moved across filesystems: {}",
                path_src.display()
            ),
        ));
    }

    if let Err(e) = fs::remove_file(path_src) {
        let _ = fs::remove_file(path_dst);
        return Err(e);
    }
    Ok(())
}

pub(crate) fn create_symbolic_link(path_src: &Path, path_dst: &Path) -> Result<(), io::Error> {
    let target = fs::read_link(path_src)?;

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(&target, path_dst)
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::{symlink_dir, symlink_file};
        if path_src.is_dir() {
            symlink_dir(&target, path_dst)
        } else {
            symlink_file(&target, path_dst)
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (target, path_dst);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "Symbolic links are unsupported on this platform",
        ))
    }
}

pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    if let Err(e) = apply_metadata(path_file_src, path_file_dst) {
        let _ = fs::remove_file(path_file_dst);
        return Err(e);
    }
    Ok(())
}

fn apply_metadata(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    #[cfg(target_os = "linux")]
    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        if let Err(e) = xattr::set(path_file_dst, &name, &raw_value) {
            tracing::debug!(
                dst = %path_file_dst.display(),
                attr = ?name,
                error = %e,
                "extended attribute not copied"
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;
    use std::path::{Path, PathBuf};

    use filetime::FileTime;

    use super::{
        SpecRelocatePattern, absolutize_path, copy_file_with_metadata, derive_renamed_destination,
        is_path_occupied, move_entry, validate_destination_name,
    };
    use crate::spec::{EnumRelocatePatternMode, RelocateError};

    #[test]
    fn literal_pattern_ignores_case() {
        let pattern =
            SpecRelocatePattern::compile("Test", EnumRelocatePatternMode::Literal).expect("compile");
        assert!(pattern.is_match("a_test.txt"));
        assert!(pattern.is_match("MyTESTS.rs"));
        assert!(pattern.is_match("Contest.md"));
        assert!(!pattern.is_match("notes.md"));
    }

    #[test]
    fn glob_pattern_matches_whole_name_ignoring_case() {
        let pattern =
            SpecRelocatePattern::compile("test_*.py", EnumRelocatePatternMode::Glob).expect("glob");
        assert!(pattern.is_match("test_b.py"));
        assert!(pattern.is_match("TEST_B.PY"));
        assert!(!pattern.is_match("a_test_b.py"));
    }

    #[test]
    fn regex_pattern_searches_ignoring_case() {
        let pattern =
            SpecRelocatePattern::compile(r"_test\.\w+$", EnumRelocatePatternMode::Regex)
                .expect("regex");
        assert!(pattern.is_match("a_TEST.txt"));
        assert!(!pattern.is_match("test_a.txt"));
    }

    #[test]
    fn invalid_or_empty_patterns_are_rejected() {
        let err = SpecRelocatePattern::compile("(", EnumRelocatePatternMode::Regex)
            .expect_err("must fail");
        assert!(matches!(err, RelocateError::InvalidPattern(_)));

        let err = SpecRelocatePattern::compile("a[", EnumRelocatePatternMode::Glob)
            .expect_err("must fail");
        assert!(matches!(err, RelocateError::InvalidPattern(_)));

        let err = SpecRelocatePattern::compile("", EnumRelocatePatternMode::Literal)
            .expect_err("must fail");
        assert!(matches!(err, RelocateError::InvalidPattern(_)));
    }

    #[cfg(unix)]
    #[test]
    fn absolutize_removes_dot_segments() {
        assert_eq!(
            absolutize_path(Path::new("/data/./src/../tests")),
            PathBuf::from("/data/tests")
        );
        assert_eq!(absolutize_path(Path::new("/..")), PathBuf::from("/"));
        assert!(absolutize_path(Path::new(".")).is_absolute());
    }

    #[test]
    fn destination_name_must_stay_below_start() {
        assert!(validate_destination_name("tests").is_ok());
        assert!(validate_destination_name("build/tests").is_ok());
        for name_bad in ["", ".", "../tests", "tests/../..", "/tmp/tests"] {
            let err = validate_destination_name(name_bad).expect_err(name_bad);
            assert!(matches!(err, RelocateError::InvalidDestinationName(_)));
        }
    }

    #[test]
    fn renamed_destination_skips_taken_suffixes() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::write(tmp.path().join("dup_test.txt"), "a").expect("write");
        std::fs::write(tmp.path().join("dup_test_1.txt"), "b").expect("write");

        let path_dst =
            derive_renamed_destination(tmp.path(), OsStr::new("dup_test.txt")).expect("rename");
        assert_eq!(path_dst, tmp.path().join("dup_test_2.txt"));

        let path_dst =
            derive_renamed_destination(tmp.path(), OsStr::new(".testrc")).expect("rename");
        assert_eq!(path_dst, tmp.path().join(".testrc_1"));
    }

    #[test]
    fn move_entry_reports_vanished_source() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let err = move_entry(&tmp.path().join("gone_test"), &tmp.path().join("x"))
            .expect_err("must fail");
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        assert!(!is_path_occupied(&tmp.path().join("x")).expect("stat"));
    }

    #[test]
    fn copy_keeps_bytes_and_mtime() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_src = tmp.path().join("a_test.bin");
        let path_dst = tmp.path().join("b_test.bin");
        std::fs::write(&path_src, b"payload").expect("write");
        let mtime = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&path_src, mtime).expect("set mtime");

        copy_file_with_metadata(&path_src, &path_dst).expect("copy");

        assert_eq!(std::fs::read(&path_dst).expect("read"), b"payload");
        let stat_dst = std::fs::metadata(&path_dst).expect("stat");
        assert_eq!(FileTime::from_last_modification_time(&stat_dst), mtime);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_counts_as_occupied() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_link = tmp.path().join("dangling");
        std::os::unix::fs::symlink(tmp.path().join("missing"), &path_link).expect("symlink");
        assert!(is_path_occupied(&path_link).expect("stat"));
    }

    #[cfg(unix)]
    #[test]
    fn occupancy_lookup_error_is_not_a_collision() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_blocker = tmp.path().join("blocker");
        std::fs::write(&path_blocker, "file").expect("write");

        let err = is_path_occupied(&path_blocker.join("a_test.txt")).expect_err("must fail");
        assert_ne!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
