//! Logical payload model and byte codec.
//!
//! This module owns everything about the thing being transferred: the
//! [`LogicalPayload`] data model, its expiry semantics, the versioned byte
//! codec used on the optical channel, and the tolerant prefix decode that
//! backs the assembler's partial reconstruction.

pub mod codec;
pub mod error;
pub mod expiration;
pub mod message;
pub mod partial;

pub use codec::{CODEC_VERSION, decode, encode};
pub use error::PayloadError;
pub use expiration::{Expiration, TransferWindow, unix_now_ms};
pub use message::{Attribution, LogicalPayload};
pub use partial::{PartialPayload, decode_prefix};
