//! crates/logging/src/tracing_macros.rs
//! Convenience macros for dsync-specific tracing.
//!
//! These macros provide ergonomic wrappers around standard tracing macros
//! with fixed targets for each dsync subsystem.

/// Emit a copy operation trace.
///
/// # Example
/// ```ignore
/// trace_copy!("copying {}", path);
/// ```
#[macro_export]
macro_rules! trace_copy {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "dsync::copy", $($arg)*)
    };
}

/// Emit a deletion operation trace.
///
/// # Example
/// ```ignore
/// trace_del!("deleting {}", path);
/// ```
#[macro_export]
macro_rules! trace_del {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "dsync::delete", $($arg)*)
    };
}

/// Emit a file list trace.
///
/// # Example
/// ```ignore
/// trace_flist!("building file list: {} entries", count);
/// ```
#[macro_export]
macro_rules! trace_flist {
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: "dsync::flist", $($arg)*)
    };
}

/// Emit a statistics trace.
///
/// # Example
/// ```ignore
/// trace_stats!("transferred {} bytes", bytes);
/// ```
#[macro_export]
macro_rules! trace_stats {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "dsync::stats", $($arg)*)
    };
}

/// Emit a delta computation trace.
///
/// # Example
/// ```ignore
/// trace_delta!("computed delta: {} blocks", count);
/// ```
#[macro_export]
macro_rules! trace_delta {
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: "dsync::delta", $($arg)*)
    };
}

/// Emit a filter evaluation trace.
///
/// # Example
/// ```ignore
/// trace_filter!("excluding {} via {}", path, pattern);
/// ```
#[macro_export]
macro_rules! trace_filter {
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: "dsync::filter", $($arg)*)
    };
}

/// Emit an I/O operation trace.
///
/// # Example
/// ```ignore
/// trace_io!("read {} bytes from {}", count, path);
/// ```
#[macro_export]
macro_rules! trace_io {
    ($($arg:tt)*) => {
        $crate::tracing::trace!(target: "dsync::io", $($arg)*)
    };
}

/// Emit a warning about a per-entry failure that did not stop the run.
///
/// # Example
/// ```ignore
/// warn_entry!("cannot read {}: {}", path, error);
/// ```
#[macro_export]
macro_rules! warn_entry {
    ($($arg:tt)*) => {
        $crate::tracing::warn!(target: "dsync::entry", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_expand_without_subscriber() {
        let path = "a/b.txt";
        crate::trace_copy!("copying {path}");
        crate::trace_del!("deleting {}", path);
        crate::trace_flist!(entries = 3, "file list built");
        crate::trace_stats!("transferred {} bytes", 10);
        crate::trace_delta!("delta for {}", path);
        crate::trace_filter!("excluded {}", path);
        crate::trace_io!("read {} bytes", 4);
        crate::warn_entry!("failed {}", path);
    }
}
