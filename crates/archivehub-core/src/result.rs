//! Application result type alias.

use crate::error::AppError;

/// Result type used throughout ArchiveHub.
///
/// All fallible operations at crate boundaries return [`AppResult`].
pub type AppResult<T> = Result<T, AppError>;
