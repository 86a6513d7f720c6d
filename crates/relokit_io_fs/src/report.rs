//! Relocation report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::{EnumRelocateOutcome, SpecRelocateError, SpecRelocateMove};

/// Aggregate counters and diagnostics for one `relocate_files` run.
#[derive(Debug, Default, Clone)]
pub struct ReportRelocate {
    /// Destination directory files were moved into.
    pub path_dir_dst: PathBuf,
    /// Whether the destination directory was created by this run.
    pub if_created_dst: bool,
    /// Number of file entries inspected outside the destination.
    pub cnt_scanned: u64,
    /// Number of inspected files whose name matched the pattern.
    pub cnt_matched: u64,
    /// Number of files moved into the destination.
    pub cnt_moved: u64,
    /// Number of matched files left in place because of a collision.
    pub cnt_skipped: u64,
    /// Completed moves in traversal order.
    pub moves: Vec<SpecRelocateMove>,
    /// Source paths skipped because their destination name was occupied.
    pub collisions: Vec<PathBuf>,
    /// Non-fatal warnings collected during traversal.
    pub warnings: Vec<String>,
    /// Per-file failures.
    pub errors: Vec<SpecRelocateError>,
}

impl ReportRelocate {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_matched".to_string(), self.cnt_matched);
        dict_counts.insert("cnt_moved".to_string(), self.cnt_moved);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} scanned={} matched={} moved={} skipped={} errors={} warnings={}",
            dict_counts["cnt_scanned"],
            dict_counts["cnt_matched"],
            dict_counts["cnt_moved"],
            dict_counts["cnt_skipped"],
            dict_counts["cnt_errors"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportRelocate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[RELOCATE]"))
    }
}

/// Mutable accumulator for relocation statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportRelocateBuilder {
    path_dir_dst: PathBuf,
    if_created_dst: bool,
    cnt_scanned: u64,
    cnt_matched: u64,
    moves: Vec<SpecRelocateMove>,
    collisions: Vec<PathBuf>,
    errors: Vec<SpecRelocateError>,
    warnings: Vec<String>,
}

impl ReportRelocateBuilder {
    pub fn new(path_dir_dst: PathBuf, if_created_dst: bool) -> Self {
        Self {
            path_dir_dst,
            if_created_dst,
            ..Self::default()
        }
    }

    /// Increment scanned count by one.
    pub fn add_scanned(&mut self) {
        self.cnt_scanned += 1;
    }

    /// Increment matched count by one.
    pub fn add_matched(&mut self) {
        self.cnt_matched += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Fold one per-file outcome into the report.
    pub fn add_outcome(&mut self, outcome: EnumRelocateOutcome) {
        match outcome {
            EnumRelocateOutcome::Moved { path_src, path_dst } => {
                self.moves.push(SpecRelocateMove { path_src, path_dst });
            }
            EnumRelocateOutcome::SkippedCollision { path_src, .. } => {
                self.collisions.push(path_src);
            }
            EnumRelocateOutcome::Failed { path_src, message } => {
                self.errors.push(SpecRelocateError {
                    path: path_src,
                    exception: message,
                });
            }
        }
    }

    /// Moves recorded so far.
    pub fn cnt_moved(&self) -> u64 {
        self.moves.len() as u64
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportRelocate {
        ReportRelocate {
            path_dir_dst: self.path_dir_dst,
            if_created_dst: self.if_created_dst,
            cnt_scanned: self.cnt_scanned,
            cnt_matched: self.cnt_matched,
            cnt_moved: self.moves.len() as u64,
            cnt_skipped: self.collisions.len() as u64,
            moves: self.moves,
            collisions: self.collisions,
            warnings: self.warnings,
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{ReportRelocate, ReportRelocateBuilder};
    use crate::spec::EnumRelocateOutcome;

    #[test]
    fn report_relocate_to_dict_and_format() {
        let report = ReportRelocate {
            cnt_scanned: 8,
            cnt_matched: 5,
            cnt_moved: 3,
            cnt_skipped: 2,
            warnings: vec!["w".to_string()],
            ..ReportRelocate::default()
        };

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_scanned"], 8);
        assert_eq!(dict_counts["cnt_matched"], 5);
        assert_eq!(dict_counts["cnt_moved"], 3);
        assert_eq!(dict_counts["cnt_skipped"], 2);
        assert_eq!(dict_counts["cnt_errors"], 0);
        assert_eq!(dict_counts["cnt_warnings"], 1);

        let txt = report.format("[RELOCATE]");
        assert_eq!(
            txt,
            "[RELOCATE] scanned=8 matched=5 moved=3 skipped=2 errors=0 warnings=1"
        );
        assert_eq!(report.to_string(), txt);
    }

    #[test]
    fn builder_folds_each_outcome_kind() {
        let mut builder = ReportRelocateBuilder::new(PathBuf::from("/r/tests"), true);
        builder.add_outcome(EnumRelocateOutcome::Moved {
            path_src: PathBuf::from("/r/a_test.txt"),
            path_dst: PathBuf::from("/r/tests/a_test.txt"),
        });
        builder.add_outcome(EnumRelocateOutcome::SkippedCollision {
            path_src: PathBuf::from("/r/b_test.txt"),
            path_dst: PathBuf::from("/r/tests/b_test.txt"),
        });
        builder.add_outcome(EnumRelocateOutcome::Failed {
            path_src: PathBuf::from("/r/c_test.txt"),
            message: "Permission denied".to_string(),
        });
        assert_eq!(builder.cnt_moved(), 1);

        let report = builder.build();
        assert!(report.if_created_dst);
        assert_eq!(report.cnt_moved, 1);
        assert_eq!(report.cnt_skipped, 1);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.collisions, vec![PathBuf::from("/r/b_test.txt")]);
        assert_eq!(report.errors[0].exception, "Permission denied");
    }
}
