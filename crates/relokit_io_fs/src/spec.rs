//! Relocation specification models, per-file outcomes and top-level error types.

use std::fmt;
use std::path::PathBuf;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Pattern matching mode for the file-name filter.
///
/// Every mode ignores case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRelocatePatternMode {
    /// Substring containment over the lower-cased file name.
    Literal,
    /// Shell-like wildcards (`*`, `?`, character classes) over the whole name.
    Glob,
    /// Regular expression searched anywhere in the name.
    Regex,
}

/// Existing destination entry conflict policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRelocateConflictStrategy {
    /// Keep destination entry and leave the source file in place.
    Skip,
    /// Move the source file under the first free `<stem>_<i><.ext>` name.
    Rename,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `relocate_files`.
#[derive(Debug, Clone)]
pub struct SpecRelocateOptions {
    /// Text a file name must match to be relocated.
    pub pattern: String,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumRelocatePatternMode,
    /// Conflict behavior for already occupied destination names.
    pub rule_conflict_file: EnumRelocateConflictStrategy,
}

impl Default for SpecRelocateOptions {
    fn default() -> Self {
        Self {
            pattern: "test".to_string(),
            rule_pattern: EnumRelocatePatternMode::Literal,
            rule_conflict_file: EnumRelocateConflictStrategy::Skip,
        }
    }
}

/// One move failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRelocateError {
    /// Source path that could not be moved.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// One completed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRelocateMove {
    pub path_src: PathBuf,
    pub path_dst: PathBuf,
}

/// Result of one file-move attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumRelocateOutcome {
    /// File now lives at `path_dst`.
    Moved { path_src: PathBuf, path_dst: PathBuf },
    /// `path_dst` was occupied; the source stays where it is.
    SkippedCollision { path_src: PathBuf, path_dst: PathBuf },
    /// Move attempt failed; the source is expected to be untouched.
    Failed { path_src: PathBuf, message: String },
}

/// "Top-level call failed" errors (input validation / setup stage).
///
/// Nothing on disk is moved when one of these is returned.
#[derive(Debug)]
pub enum RelocateError {
    /// Destination name is empty, absolute or escapes the start directory.
    InvalidDestinationName(String),
    /// Invalid match pattern.
    InvalidPattern(String),
    /// Destination directory could not be created.
    DirectoryCreation {
        /// Destination path that failed creation.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
}

impl fmt::Display for RelocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDestinationName(msg) => write!(f, "{msg}"),
            Self::InvalidPattern(msg) => write!(f, "{msg}"),
            Self::DirectoryCreation { path, message } => write!(
                f,
                "Failed to create destination directory {}: {message}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for RelocateError {}

// #endregion
////////////////////////////////////////////////////////////////////////////////
