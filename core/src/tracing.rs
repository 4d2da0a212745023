//! Tracing utilities for list query observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site. Parameter values are never recorded.

/// Emit a debug-level tracing event with the SQL text and parameter count.
///
/// ```ignore
/// dynlist_trace_query!(&rendered.text, rendered.params.len());
/// ```
#[macro_export]
macro_rules! dynlist_trace_query {
    ($sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, params = $param_count, "dynlist.query");
        #[cfg(not(feature = "tracing"))]
        let _ = (&$sql, &$param_count);
    };
}

/// Emit an error-level event for a failed statement. The SQL is truncated by the caller.
///
/// ```ignore
/// dynlist_trace_failure!(truncated_sql, err);
/// ```
#[macro_export]
macro_rules! dynlist_trace_failure {
    ($sql:expr, $error:expr) => {
        #[cfg(feature = "tracing")]
        tracing::error!(sql = %$sql, error = %$error, "dynlist.query.failed");
        #[cfg(not(feature = "tracing"))]
        let _ = (&$sql, &$error);
    };
}

/// Emit a debug-level event when a cursor is rejected.
#[macro_export]
macro_rules! dynlist_trace_cursor {
    ($reason:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(reason = %$reason, "dynlist.cursor.rejected");
        #[cfg(not(feature = "tracing"))]
        let _ = &$reason;
    };
}

/// Emit a trace-level event for a caller filter, sort or search field that was ignored.
///
/// ```ignore
/// dynlist_trace_dropped!("sort", &sort.field);
/// ```
#[macro_export]
macro_rules! dynlist_trace_dropped {
    ($kind:literal, $field:expr) => {
        #[cfg(feature = "tracing")]
        tracing::trace!(kind = $kind, field = %$field, "dynlist.dropped");
        #[cfg(not(feature = "tracing"))]
        let _ = &$field;
    };
}
