//! Metric helpers for `opticast`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! every helper is a no-op, so call sites stay unconditional.

/// Name of the counter tracking accepted fragment captures.
pub const FRAGMENTS_INGESTED: &str = "opticast_fragments_ingested_total";
/// Name of the counter tracking dropped fragment captures.
pub const FRAGMENTS_REJECTED: &str = "opticast_fragments_rejected_total";
/// Name of the counter tracking completed transfers.
pub const TRANSFERS_COMPLETED: &str = "opticast_transfers_completed_total";
/// Name of the counter tracking destroyed messages.
pub const MESSAGES_DESTROYED: &str = "opticast_messages_destroyed_total";

/// Record a fragment capture that reached the assembler.
pub fn inc_fragments_ingested() {
    #[cfg(feature = "metrics")]
    metrics::counter!(FRAGMENTS_INGESTED).increment(1);
}

/// Record a fragment capture dropped at the ingestion boundary.
pub fn inc_fragments_rejected() {
    #[cfg(feature = "metrics")]
    metrics::counter!(FRAGMENTS_REJECTED).increment(1);
}

/// Record a transfer reaching full fragment coverage.
pub fn inc_transfers_completed() {
    #[cfg(feature = "metrics")]
    metrics::counter!(TRANSFERS_COMPLETED).increment(1);
}

/// Record a message reaching its destroyed state.
pub fn inc_messages_destroyed() {
    #[cfg(feature = "metrics")]
    metrics::counter!(MESSAGES_DESTROYED).increment(1);
}
