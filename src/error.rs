//! Error types.
//!
//! This closes the teacher's open-ended `ErrorKind` (io / malformed-data /
//! schema-non-conformance / platform-limits / illegal-schema / api-usage /
//! other) down to the fixed set of failures this format actually defines,
//! while keeping the same hand-rolled shape (no `thiserror`).

use std::fmt::{self, Display, Formatter};

pub type Result<T> = std::result::Result<T, Error>;

/// The closed set of ways a write or a read can fail.
#[derive(Debug)]
pub enum Error {
    /// A datum does not conform to the writer's schema at write time.
    DatumTypeMismatch { path: String, reason: String },
    /// The writer/reader schema pair fails the compatibility matrix.
    SchemaIncompatible { writer: String, reader: String },
    /// `|unscaled| >= 10^precision`, `precision` is missing, or the input
    /// isn't numeric.
    DecimalOutOfRange { detail: String },
    /// A schema tag outside the closed set was encountered.
    UnknownSchemaKind { detail: String },
    /// The reader declares a field the writer omitted, with no default.
    MissingDefault { field: String },
    /// Underlying I/O failure, propagated unchanged.
    Stream(std::io::Error),
}

impl Error {
    pub(crate) fn mismatch(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::DatumTypeMismatch { path: path.into(), reason: reason.into() }
    }
}

macro_rules! bail_mismatch {
    ($path:expr, $($e:tt)*) => {
        return Err($crate::error::Error::mismatch($path, format!($($e)*)))
    };
}

macro_rules! ensure_mismatch {
    ($c:expr, $path:expr, $($e:tt)*) => {
        if !$c { bail_mismatch!($path, $($e)*); }
    };
}

pub(crate) use bail_mismatch;
pub(crate) use ensure_mismatch;

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Stream(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Error::DatumTypeMismatch { path, reason } =>
                write!(f, "datum does not conform to schema at {}: {}", path, reason),
            Error::SchemaIncompatible { writer, reader } =>
                write!(f, "writer schema {} is not compatible with reader schema {}", writer, reader),
            Error::DecimalOutOfRange { detail } =>
                write!(f, "decimal out of range: {}", detail),
            Error::UnknownSchemaKind { detail } =>
                write!(f, "unknown schema kind: {}", detail),
            Error::MissingDefault { field } =>
                write!(f, "reader field {:?} is absent from the writer and has no default", field),
            Error::Stream(e) => write!(f, "stream error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Stream(e) => Some(e),
            _ => None,
        }
    }
}
