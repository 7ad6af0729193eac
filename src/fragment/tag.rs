//! Payload kind carried by every fragment of a transfer.

use bincode::{Decode, Encode};
use derive_more::Display;

/// Kind of payload a transfer carries.
///
/// The tag is fixed for the life of one transfer; a fragment whose tag
/// disagrees with the in-progress transfer belongs to an unrelated optical
/// source and is rejected at ingestion.
///
/// # Examples
///
/// ```
/// use opticast::fragment::TransferTag;
///
/// assert_eq!(TransferTag::Direct.to_string(), "direct");
/// assert_ne!(TransferTag::Direct, TransferTag::SurveyResponse);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Encode, Decode, Display)]
pub enum TransferTag {
    /// A direct person-to-person message.
    #[display("direct")]
    Direct,
    /// A structured web-style content bundle.
    #[display("bundle")]
    Bundle,
    /// A completed survey response.
    #[display("survey-response")]
    SurveyResponse,
}
