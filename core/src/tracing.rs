//! Tracing utilities for query, embed and save observability.
//!
//! Enable the `tracing` feature to emit spans and events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site. The feature is checked in the crate that expands the
//! macro, so downstream crates forward their own `tracing` feature.

/// Emit a debug-level tracing event with the SQL text sent to a connection.
///
/// ```ignore
/// chaos_trace_query!(&sql);
/// ```
#[macro_export]
macro_rules! chaos_trace_query {
    ($sql:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, "chaos.query");
    };
}

/// Emit a debug-level tracing event after a batched relation fetch.
///
/// ```ignore
/// chaos_trace_embed!("images", owners.len(), fetched.len());
/// ```
#[macro_export]
macro_rules! chaos_trace_embed {
    ($relation:expr, $owners:expr, $fetched:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            relation = %$relation,
            owners = $owners,
            fetched = $fetched,
            "chaos.embed"
        );
    };
}

/// Emit an info-level tracing event after child or pivot reconciliation.
///
/// ```ignore
/// chaos_trace_save!("tags", kept, inserted, deleted);
/// ```
#[macro_export]
macro_rules! chaos_trace_save {
    ($relation:expr, $kept:expr, $inserted:expr, $deleted:expr) => {
        #[cfg(feature = "tracing")]
        tracing::info!(
            relation = %$relation,
            kept = $kept,
            inserted = $inserted,
            deleted = $deleted,
            "chaos.save"
        );
    };
}
