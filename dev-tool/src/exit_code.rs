/// Everything went fine.
pub const NO_ERROR: i32 = 0;

/// The command could not run to completion.
pub const FATAL_ERROR: i32 = 1;

/// The command completed but some inputs were skipped.
pub const NON_FATAL_ERROR: i32 = 2;
