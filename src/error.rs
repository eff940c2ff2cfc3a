//! Error type shared by every stage of the detection pipeline.

/// Errors produced while configuring or running near-duplicate detection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// No `(bands, rows)` pair in the search ranges satisfies the thresholds.
    ///
    /// Fatal: the hash family cannot be sized without it.
    #[error(
        "no feasible (b, r) in the search ranges for s_high={s_high}, s_low={s_low}, \
         p_min={p_min}, p_max={p_max}"
    )]
    Configuration {
        /// High similarity threshold.
        s_high: f64,
        /// Low similarity threshold.
        s_low: f64,
        /// Minimum collision probability required at `s_high`.
        p_min: f64,
        /// Maximum collision probability tolerated at `s_low`.
        p_max: f64,
    },
    /// A parameter is out of range or inconsistent.
    #[error("invalid parameter: {0}")]
    InvalidParam(&'static str),
    /// A probability or similarity threshold is outside `[0, 1]`.
    #[error("invalid threshold {name}={value} (must be within [0, 1])")]
    InvalidThreshold {
        /// Threshold name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// An input record is missing a required field.
    #[error("malformed document at position {index}: {reason}")]
    MalformedDocument {
        /// Position of the record in the input stream.
        index: usize,
        /// What was missing.
        reason: &'static str,
    },
    /// Length mismatch between expected and provided sequences.
    #[error("dimension mismatch (expected {expected}, got {got})")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Actual provided length.
        got: usize,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
