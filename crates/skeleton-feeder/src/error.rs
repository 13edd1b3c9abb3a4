//! Error types for the skeleton feeder.
//!
//! This module is the single source of truth for all error types in the
//! crate. Every module that produces an error imports its error type from
//! here rather than defining it inline.
//!
//! ## Hierarchy
//!
//! ```text
//! FeederError (top-level)
//! ├── ConfigError    (config validation / file loading / split name)
//! ├── DatasetError   (archive loading, array shapes, labels, indexing)
//! └── SkeletonError  (bone pair table validation)
//! ```

use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// FeederResult
// ---------------------------------------------------------------------------

/// Convenient `Result` alias used by orchestration-level functions.
pub type FeederResult<T> = Result<T, FeederError>;

// ---------------------------------------------------------------------------
// FeederError
// ---------------------------------------------------------------------------

/// Top-level error type for the skeleton feeder.
///
/// Lower-level functions in [`crate::config`], [`crate::dataset`] and
/// [`crate::skeleton`] return their own module-specific error types which are
/// coerced into `FeederError` via [`From`].
#[derive(Debug, Error)]
pub enum FeederError {
    /// A configuration validation or loading error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A dataset loading or access error.
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// The bone pair table is malformed.
    #[error("Skeleton error: {0}")]
    Skeleton(#[from] SkeletonError),

    /// A shape mismatch was detected between two arrays.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        actual: Vec<usize>,
    },

    /// An operation that needs at least one sample was given none.
    #[error("Dataset is empty")]
    EmptyDataset,
}

impl FeederError {
    /// Construct a [`FeederError::ShapeMismatch`].
    pub fn shape_mismatch(expected: Vec<usize>, actual: Vec<usize>) -> Self {
        FeederError::ShapeMismatch { expected, actual }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors produced when loading or validating a [`FeederConfig`].
///
/// [`FeederConfig`]: crate::config::FeederConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field has an invalid value.
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// The split name is not one of `train` / `test`.
    #[error("Data split `{0}` is not supported (expected `train` or `test`)")]
    UnknownSplit(String),

    /// A configuration file could not be read from disk.
    #[error("Cannot read config file `{path}`: {source}")]
    FileRead {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file contains malformed JSON.
    #[error("Cannot parse config file `{path}`: {source}")]
    ParseError {
        /// Path that was being parsed.
        path: PathBuf,
        /// Underlying JSON parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Construct a [`ConfigError::InvalidValue`].
    pub fn invalid_value<S: Into<String>>(field: &'static str, reason: S) -> Self {
        ConfigError::InvalidValue { field, reason: reason.into() }
    }
}

// ---------------------------------------------------------------------------
// DatasetError
// ---------------------------------------------------------------------------

/// Errors produced while loading or accessing dataset samples.
///
/// All of these are fatal at load time except [`DatasetError::IndexOutOfBounds`],
/// which is returned by per-sample access.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The archive file was not found on disk.
    #[error("Data not found at `{path}`: {message}")]
    DataNotFound {
        /// Path that was expected to contain data.
        path: PathBuf,
        /// Additional context.
        message: String,
    },

    /// A required array is missing from the archive.
    #[error("Array `{key}` missing from archive `{path}` (found: {available:?})")]
    MissingArray {
        /// Archive path.
        path: PathBuf,
        /// Key that was looked up.
        key: String,
        /// Keys actually present in the archive.
        available: Vec<String>,
    },

    /// An array was found but its shape or contents are wrong.
    #[error("Invalid data format in `{path}`: {message}")]
    InvalidFormat {
        /// Path of the malformed archive.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// The archive or one of its members could not be decoded.
    #[error("NumPy read error in `{path}`: {message}")]
    NpzReadError {
        /// Path of the `.npz` / `.npy` file.
        path: PathBuf,
        /// Error description.
        message: String,
    },

    /// A sample index is out of bounds.
    #[error("Index {idx} out of bounds (dataset has {len} samples)")]
    IndexOutOfBounds {
        /// The requested index.
        idx: usize,
        /// Total length of the dataset.
        len: usize,
    },

    /// A low-level I/O error while reading a data file.
    #[error("I/O error reading `{path}`: {source}")]
    IoError {
        /// Path being read when the error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl DatasetError {
    /// Construct a [`DatasetError::DataNotFound`].
    pub fn not_found<S: Into<String>>(path: impl Into<PathBuf>, msg: S) -> Self {
        DatasetError::DataNotFound { path: path.into(), message: msg.into() }
    }

    /// Construct a [`DatasetError::InvalidFormat`].
    pub fn invalid_format<S: Into<String>>(path: impl Into<PathBuf>, msg: S) -> Self {
        DatasetError::InvalidFormat { path: path.into(), message: msg.into() }
    }

    /// Construct a [`DatasetError::IoError`].
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatasetError::IoError { path: path.into(), source }
    }

    /// Construct a [`DatasetError::NpzReadError`].
    pub fn npz_read<S: Into<String>>(path: impl Into<PathBuf>, msg: S) -> Self {
        DatasetError::NpzReadError { path: path.into(), message: msg.into() }
    }
}

// ---------------------------------------------------------------------------
// SkeletonError
// ---------------------------------------------------------------------------

/// Errors produced while validating a bone pair table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkeletonError {
    /// The table does not have one entry per joint.
    #[error("Bone table has {found} entries, expected {expected}")]
    WrongLength {
        /// Number of entries found.
        found: usize,
        /// Number of joints.
        expected: usize,
    },

    /// A joint index is outside `1..=num_joints` (pairs are 1-based).
    #[error("Joint index {index} out of range 1..={num_joints}")]
    JointOutOfRange {
        /// The offending 1-based index.
        index: usize,
        /// Number of joints.
        num_joints: usize,
    },

    /// A joint appears as a child more than once.
    #[error("Joint {joint} has more than one parent")]
    DuplicateChild {
        /// The 1-based joint index.
        joint: usize,
    },

    /// The number of self-parented joints is not exactly one.
    #[error("Bone table must have exactly one root, found {found}")]
    RootCount {
        /// Number of roots found.
        found: usize,
    },

    /// Following parents from `joint` never reaches the root.
    #[error("Joint {joint} is part of a cycle and never reaches the root")]
    Cycle {
        /// The 1-based joint index.
        joint: usize,
    },
}
