/// Error types for the sxgeo library
use std::fmt;

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, GeoError>;

/// Main error type for database open and lookup operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    /// I/O errors while opening or mapping the database file
    Io(String),

    /// First three bytes of the file are not the "SxG" signature
    BadSignature,

    /// Header fields fail basic sanity checks (zero counts, bad id width)
    BadHeader(String),

    /// A pack-format descriptor string could not be parsed
    BadDescriptor(String),

    /// A decode step would read past the end of a buffer or record span
    Truncated {
        /// What was being decoded when the data ran out
        what: &'static str,
        /// Byte position the decode started from
        offset: usize,
    },

    /// A read request exceeds the loaded buffer. Always indicates
    /// corruption or an internal invariant violation, never clamped.
    OutOfRange {
        /// Requested start offset
        offset: usize,
        /// Requested length
        len: usize,
        /// Actual buffer size
        size: usize,
    },
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoError::Io(msg) => write!(f, "I/O error: {}", msg),
            GeoError::BadSignature => write!(f, "Bad signature: expected \"SxG\""),
            GeoError::BadHeader(msg) => write!(f, "Bad header: {}", msg),
            GeoError::BadDescriptor(msg) => write!(f, "Bad pack descriptor: {}", msg),
            GeoError::Truncated { what, offset } => {
                write!(f, "Truncated data: {} at offset {}", what, offset)
            }
            GeoError::OutOfRange { offset, len, size } => {
                write!(
                    f,
                    "Read out of range: {} bytes at offset {} exceeds buffer of {} bytes",
                    len, offset, size
                )
            }
        }
    }
}

impl std::error::Error for GeoError {}

impl From<std::io::Error> for GeoError {
    fn from(err: std::io::Error) -> Self {
        GeoError::Io(err.to_string())
    }
}
