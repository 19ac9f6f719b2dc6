//! Error types shared across the crate.

/// Errors produced by field arithmetic, point codecs, and key handling.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// Byte or hex input is structurally malformed (wrong length,
    /// non-canonical Ristretto form, bad hex digits).
    #[error("invalid encoding: {0}")]
    InvalidEncoding(&'static str),

    /// A decoded integer exceeds its allowed range.
    #[error("value out of range: {0}")]
    OutOfRange(&'static str),

    /// Decoded coordinates do not describe a curve point.
    #[error("point is not on the curve")]
    NotOnCurve,

    /// A caller-supplied value violates an operation's preconditions.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Rejection sampling failed to produce a private key.
    #[error("no valid private key found in 1024 iterations, PRNG is broken")]
    PrngExhausted,
}

/// Result alias used throughout the crate.
pub type CurveResult<T> = Result<T, CurveError>;
