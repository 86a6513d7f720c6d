//! Stable exit codes for the `relokit` command.

/// Run completed; per-file failures are reported but do not change the code.
pub const OK: i32 = 0;
/// Run aborted before any file was moved (bad arguments or destination).
pub const FATAL: i32 = 1;
