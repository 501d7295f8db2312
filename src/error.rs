use thiserror::Error;

// ---------------------------------------------------------------------------
// DatasetError – every failure the container layer can report
// ---------------------------------------------------------------------------

/// Errors raised by dataset construction, slicing, attribute access and
/// mapper orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DatasetError {
    /// Invalid or insufficient constructor arguments.
    #[error("configuration error: {0}")]
    Config(String),

    /// Array dimensionality or attribute length does not match.
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: String,
        expected: String,
        actual: String,
    },

    /// A number of supplied items does not match an axis length.
    #[error("count mismatch for {what}: expected {expected}, got {actual}")]
    CountMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// Attribute name cannot be found in any collection.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// A dotted attribute name used an unknown collection prefix.
    #[error("unknown collection '{0}', possible values are: 'sa', 'fa', 'a'")]
    UnknownCollection(String),

    /// A selector index lies outside of the axis.
    #[error("index {index} out of bounds for axis of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Two static feature selections cannot be merged into one.
    #[error("incompatible mappers: {0}")]
    IncompatibleMappers(String),

    /// A mapper refused its input.
    #[error("mapper error: {0}")]
    Mapper(String),
}

impl DatasetError {
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    #[must_use]
    pub fn shape_mismatch(
        what: impl Into<String>,
        expected: impl std::fmt::Debug,
        actual: impl std::fmt::Debug,
    ) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }

    #[must_use]
    pub fn count_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::CountMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    #[must_use]
    pub fn lookup(reason: impl Into<String>) -> Self {
        Self::Lookup(reason.into())
    }

    #[must_use]
    pub fn mapper(reason: impl Into<String>) -> Self {
        Self::Mapper(reason.into())
    }
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
