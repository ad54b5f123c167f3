//! Result type alias
//!
//! Convenience alias that uses [`SyncError`] as the error type.

use super::errors::SyncError;

/// Result type alias for engine operations
///
/// # Examples
///
/// ```
/// use procedures_sync::domain::result::Result;
/// use procedures_sync::domain::errors::SyncError;
///
/// fn failing_function() -> Result<()> {
///     Err(SyncError::Configuration("SNOWSTORM_VALUESET_URL is not set".to_string()))
/// }
///
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, SyncError>;
