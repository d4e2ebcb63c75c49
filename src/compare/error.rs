use thiserror::Error;

/// Errors from the comparison core.
///
/// All three are fatal to the single comparison that raised them, but a host
/// running many comparisons can match on the variant and keep going; nothing
/// in the core panics or retries.
#[derive(Debug, Error)]
pub enum CompareError {
    /// Malformed input series: empty, non-increasing timestamps, or a voiced
    /// frame with a non-positive frequency.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The DTW cost matrix would exceed the configured cell ceiling.
    #[error("DTW matrix of {cells} cells exceeds the configured limit of {limit}")]
    ResourceLimitExceeded { cells: usize, limit: usize },

    /// Alignment succeeded but no frame pair was voiced on both sides, so
    /// there is nothing to score. Surfaced instead of reporting zeros.
    #[error("no mutually voiced frames to compare")]
    NoVoicedOverlap,
}

pub type Result<T> = std::result::Result<T, CompareError>;
