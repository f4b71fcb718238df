//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `RgError` via `#[from]`
//! where they surface one of these variants.

use thiserror::Error;

/// Errors raised by `rg-core` helpers, chiefly [`SimConfig::validate`].
///
/// [`SimConfig::validate`]: crate::SimConfig::validate
#[derive(Debug, Error)]
pub enum RgError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `rg-core`.
pub type RgResult<T> = Result<T, RgError>;
