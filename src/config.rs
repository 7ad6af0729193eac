//! Transfer configuration.
//!
//! [`TransferConfig`] bounds one transfer's resource usage and timing. The
//! fragment capacity is usually derived from the optical code's byte budget
//! at the chosen error-correction level (an external concern) via
//! [`TransferConfig::for_frame_budget`].

use std::{num::NonZeroUsize, time::Duration};

use serde::{Deserialize, Serialize};

use crate::fragment::{Assembler, Splitter, fragment_overhead};

/// Default logical payload bytes carried by one optical code.
pub const DEFAULT_FRAGMENT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(512) {
    Some(capacity) => capacity,
    None => panic!("default fragment capacity must be non-zero"),
};

/// Default ceiling on a fully reconstructed payload (4 MiB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: NonZeroUsize = match NonZeroUsize::new(4 * 1024 * 1024) {
    Some(limit) => limit,
    None => panic!("default payload ceiling must be non-zero"),
};

/// Default grace interval between the vanish transition and destruction.
pub const DEFAULT_VANISH_GRACE: Duration = Duration::from_millis(600);

/// Settings that bound fragment sizes, payload size, and destruction timing.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Maximum number of logical payload bytes carried by a single fragment.
    /// The encoded optical code additionally includes marker and header
    /// overhead.
    pub fragment_capacity: NonZeroUsize,
    /// Hard cap on the fully reconstructed payload size.
    pub max_payload_bytes: NonZeroUsize,
    /// Grace interval the lifecycle holds in `Vanishing` before destruction.
    pub vanish_grace: Duration,
}

impl TransferConfig {
    /// Derive a configuration from the optical code's byte budget.
    ///
    /// `frame_budget` should reflect the largest payload one optical code
    /// can carry at the chosen error-correction level. The returned
    /// configuration leaves room for the fragment marker and header within
    /// that budget.
    ///
    /// Returns `None` when the budget cannot accommodate the fixed overhead.
    #[must_use]
    pub fn for_frame_budget(
        frame_budget: usize,
        max_payload_bytes: NonZeroUsize,
        vanish_grace: Duration,
    ) -> Option<Self> {
        let overhead = fragment_overhead().get();
        let capacity = NonZeroUsize::new(frame_budget.saturating_sub(overhead))?;
        Some(Self {
            fragment_capacity: capacity,
            max_payload_bytes,
            vanish_grace,
        })
    }

    /// Largest encoded optical code this configuration can produce.
    #[must_use]
    pub fn encoded_fragment_ceiling(&self) -> usize {
        self.fragment_capacity.get() + fragment_overhead().get()
    }

    /// Build the sender-side splitter for this configuration.
    #[must_use]
    pub const fn splitter(&self) -> Splitter { Splitter::new(self.fragment_capacity) }

    /// Build a receiver-side assembler for this configuration.
    #[must_use]
    pub const fn assembler(&self) -> Assembler { Assembler::new(self.max_payload_bytes) }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            fragment_capacity: DEFAULT_FRAGMENT_CAPACITY,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            vanish_grace: DEFAULT_VANISH_GRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_budget_reserves_wire_overhead() {
        let config = TransferConfig::for_frame_budget(
            256,
            DEFAULT_MAX_PAYLOAD_BYTES,
            DEFAULT_VANISH_GRACE,
        )
        .expect("budget fits");
        assert!(config.fragment_capacity.get() < 256);
        assert!(config.encoded_fragment_ceiling() <= 256);
    }

    #[test]
    fn tiny_frame_budget_is_rejected() {
        assert!(
            TransferConfig::for_frame_budget(4, DEFAULT_MAX_PAYLOAD_BYTES, DEFAULT_VANISH_GRACE)
                .is_none()
        );
    }
}
