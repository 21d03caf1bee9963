//! Binding kinds and directions
//!
//! A [`BindingKind`] names the category of external resource a value is bound
//! to. Its token is the identifier used on the wire and in function manifests,
//! so the token set is closed and stable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Suffix that marks a binding kind as a trigger
const TRIGGER_SUFFIX: &str = "Trigger";

/// Supported binding kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BindingKind {
    /// Blob input/output
    #[serde(rename = "blob")]
    Blob,
    /// Blob trigger
    #[serde(rename = "blobTrigger")]
    BlobTrigger,
    /// HTTP output
    #[serde(rename = "http")]
    Http,
    /// HTTP trigger
    #[serde(rename = "httpTrigger")]
    HttpTrigger,
    /// Timer trigger
    #[serde(rename = "timerTrigger")]
    TimerTrigger,
    /// Queue input/output
    #[serde(rename = "queue")]
    Queue,
    /// Queue trigger
    #[serde(rename = "queueTrigger")]
    QueueTrigger,
}

impl BindingKind {
    /// Every binding kind, in declaration order
    pub const ALL: [BindingKind; 7] = [
        BindingKind::Blob,
        BindingKind::BlobTrigger,
        BindingKind::Http,
        BindingKind::HttpTrigger,
        BindingKind::TimerTrigger,
        BindingKind::Queue,
        BindingKind::QueueTrigger,
    ];

    /// Stable wire/config token for this kind
    pub const fn as_str(&self) -> &'static str {
        match self {
            BindingKind::Blob => "blob",
            BindingKind::BlobTrigger => "blobTrigger",
            BindingKind::Http => "http",
            BindingKind::HttpTrigger => "httpTrigger",
            BindingKind::TimerTrigger => "timerTrigger",
            BindingKind::Queue => "queue",
            BindingKind::QueueTrigger => "queueTrigger",
        }
    }

    /// Whether this kind initiates an invocation.
    ///
    /// Derived from the token alone: any token ending in `Trigger`.
    pub fn is_trigger(&self) -> bool {
        self.as_str().ends_with(TRIGGER_SUFFIX)
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BindingKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BindingKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownBindingToken(s.to_string()))
    }
}

/// Direction of a declared binding relative to the function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingDirection {
    /// Value flows from the host into the function
    In,
    /// Value flows from the function back to the host
    Out,
    /// Both directions
    InOut,
}

impl BindingDirection {
    /// Whether values in this direction need a decoder
    pub fn is_inbound(&self) -> bool {
        matches!(self, BindingDirection::In | BindingDirection::InOut)
    }

    /// Whether values in this direction need an encoder
    pub fn is_outbound(&self) -> bool {
        matches!(self, BindingDirection::Out | BindingDirection::InOut)
    }
}
