//! Tracing utilities for scan observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]`
//! boilerplate at every call site.

/// Emit a debug-level tracing event when a scan plan is built.
///
/// ```ignore
/// aquifer_trace_plan!(shape.type_name, columns.len());
/// ```
#[macro_export]
macro_rules! aquifer_trace_plan {
    ($ty:expr, $column_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(destination = %$ty, columns = $column_count, "aquifer.plan");
    };
}

/// Emit a debug-level tracing event when a scan completes.
///
/// ```ignore
/// aquifer_trace_scan!(shape.type_name, row_count);
/// ```
#[macro_export]
macro_rules! aquifer_trace_scan {
    ($ty:expr, $row_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(destination = %$ty, rows = $row_count, "aquifer.scan");
    };
}
