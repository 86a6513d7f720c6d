//! `relokit_io_fs` v1:
//! Rust-side file relocation engine.
//!
//! Modules:
//! - `relocate` : traversal and move orchestration
//! - `spec`     : enums/options/outcomes/errors
//! - `report`   : run-time report model
//! - `status`   : human-readable progress lines
//! - `util`     : shared helper functions

pub mod relocate;
pub mod report;
pub mod spec;
mod status;
mod util;

pub use relocate::relocate_files;
pub use report::{ReportRelocate, ReportRelocateBuilder};
pub use spec::{
    EnumRelocateConflictStrategy, EnumRelocateOutcome, EnumRelocatePatternMode, RelocateError,
    SpecRelocateError, SpecRelocateMove, SpecRelocateOptions,
};
