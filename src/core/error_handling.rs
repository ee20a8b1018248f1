//! Generic error handling utilities
//!
//! Unified handling for errors that surface before a scan starts, keeping the
//! distinction between user-actionable failures and internal ones.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// User-actionable errors (malformed queries, bad plugin metadata) carry a
/// message the CLI prints verbatim, usually with a usage suggestion attached.
/// System errors get generic context on the console and full detail in the
/// debug log.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a specific, user-actionable message
    fn is_user_actionable(&self) -> bool;

    /// The message to display when the error is user-actionable
    ///
    /// Must be `Some` exactly when `is_user_actionable()` is true.
    fn user_message(&self) -> Option<String>;
}

/// Log an error with detail appropriate to its specificity
///
/// User-actionable errors log their own message; system errors log the
/// operation context, with the raw error kept at debug level either way.
pub fn log_error_with_context<E: ContextualError>(error: &E, operation_context: &str) {
    if let Some(user_msg) = error.user_message() {
        log::error!("FATAL: {user_msg}");
    } else {
        log::error!("FATAL: {operation_context}");
    }
    log::debug!("DETAIL: {error}");
    log::debug!("DEBUG_DETAILS: {error:?}");
}
