//! Exit codes of the `minutes` binary.

pub const SUCCESS: i32 = 0;
/// A pipeline stage (generation or evaluation) failed.
pub const STAGE_FAILED: i32 = 1;
/// Bad config, bad arguments or unreadable input.
pub const CONFIG_ERROR: i32 = 2;
