//! Public API for the `opticast` library.
//!
//! This crate transfers arbitrary payloads between two devices over a
//! visual channel of cycling, camera-scanned optical codes, with no network
//! connection. The sender serialises a [`payload::LogicalPayload`] and
//! splits it into a repeating cycle of tagged fragments; the receiver
//! ingests captures in any order, with duplicates and misses, reassembles
//! the payload, and hands it to the ephemeral message [`lifecycle`].

pub mod config;
pub mod directory;
pub mod fragment;
pub mod intake;
pub mod lifecycle;
pub mod metrics;
pub mod payload;
pub mod store;

pub use config::TransferConfig;
pub use directory::{Contact, ContactDirectory, InMemoryDirectory};
pub use fragment::{
    Assembler,
    FRAGMENT_MAGIC,
    FinalizeError,
    FragmentBatch,
    FragmentCount,
    FragmentCycle,
    FragmentFrame,
    FragmentHeader,
    FragmentIndex,
    IngestOutcome,
    RejectReason,
    SplitError,
    Splitter,
    TransferTag,
    decode_fragment,
    encode_fragment,
    fragment_overhead,
};
pub use intake::{IntakeEvent, SharedAssembler, intake_events, run_intake};
pub use lifecycle::{
    CountdownHandle,
    Lifecycle,
    LifecycleStage,
    OpenError,
    SaveError,
    SharedLifecycle,
    spawn_countdown,
};
pub use payload::{
    Attribution,
    Expiration,
    LogicalPayload,
    PartialPayload,
    PayloadError,
    TransferWindow,
};
pub use store::{DiscardStore, MemoryStore, MessageStore};
