use thiserror::Error;

use crate::coder::{DecodeError, EncodeError};
use crate::frame::FrameError;

/// Whether retrying the failed operation can succeed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Transience {
    /// The same inputs will fail the same way; retrying is pointless.
    Permanent,
    /// A retry has a real chance of succeeding.
    Retryable,
    /// Cannot tell from here whether a retry would help.
    Unknown,
}

impl Transience {
    pub fn is_retryable(self) -> bool {
        matches!(self, Transience::Retryable)
    }
}

/// What is known about side effects at the point an error surfaces.
///
/// Relevant only on the channel paths: a failed write may have put part of a
/// frame on the wire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Effect {
    /// Nothing was emitted or mutated.
    None,
    /// The operation observably took effect before failing.
    Some,
    /// Cannot tell whether anything reached the channel.
    Unknown,
}

impl Effect {
    pub fn as_str(self) -> &'static str {
        match self {
            Effect::None => "none",
            Effect::Some => "some",
            Effect::Unknown => "unknown",
        }
    }
}

/// Crate-level error for callers that work across the codec and channel
/// surfaces. A transparent wrapper over the per-capability errors, which stay
/// the primary API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl Error {
    /// This layer never retries; transience tells the channel owner whether
    /// a retry of its own is worth attempting.
    pub fn transience(&self) -> Transience {
        match self {
            Error::Encode(e) => e.transience(),
            Error::Decode(e) => e.transience(),
            Error::Frame(e) => e.transience(),
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            Error::Encode(e) => e.effect(),
            Error::Decode(e) => e.effect(),
            Error::Frame(e) => e.effect(),
        }
    }
}
