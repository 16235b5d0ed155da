//! CLI Exit Code Registry
//!
//! Single source of truth for `dtree` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Success                                         |
//! | 1    | General error (unspecified)                     |
//! | 2    | Usage error (bad args, unreadable file)         |
//! | 3    | Tree document failed schema/shape validation    |
//! | 4    | Tree document is not valid JSON / wrong shape   |
//! | 5    | Edit operation stream could not be parsed       |
//! | 6    | Settings file could not be loaded               |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing or unreadable file.
pub const EXIT_USAGE: u8 = 2;

/// Tree document violates field constraints or tree shape.
pub const EXIT_INVALID_TREE: u8 = 3;

/// Tree document could not be parsed.
pub const EXIT_PARSE: u8 = 4;

/// Edit operation stream could not be parsed.
pub const EXIT_OPS_PARSE: u8 = 5;

/// Settings file could not be loaded.
pub const EXIT_CONFIG: u8 = 6;
