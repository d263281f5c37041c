//! Protocol-level constants shared by the server, control and bridge crates.

/// Default MMS port when neither the command line nor the config names one.
pub const DEFAULT_PORT: u16 = 8102;

/// Longest object reference a control binding keeps.
pub const MAX_OBJECT_REFERENCE_LEN: usize = 255;

/// Name of the operate sub-element of a controllable data object.
pub const OPERATE: &str = "Oper";

/// Name of the status value attribute.
pub const STATUS_VALUE: &str = "stVal";

/// Name of the timestamp attribute next to a status value.
pub const TIMESTAMP: &str = "t";

/// Suffix the bridge appends when a path names a data object instead of an attribute.
pub const STATUS_SUFFIX: &str = ".stVal";

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "IED";
