//! Pluggable per-type key codecs.

use thiserror::Error;

use crate::error::{Effect, Transience};
use crate::varint::{self, VarIntError};

/// Converts a typed key value to and from its canonical byte form.
///
/// Contract for every implementation:
/// - `encode` is deterministic: identical values produce identical bytes in
///   one runtime configuration.
/// - `encode` output never depends on surrounding values or position in a
///   batch; keys are compared and hashed out of context.
/// - `decode` is the left inverse of `encode` and consumes the whole input
///   slice. Leftover bytes are a [`DecodeError`], never silently ignored;
///   composite codecs frame their inner fields so each one knows its extent.
pub trait KeyCoder<K> {
    fn encode(&self, value: &K) -> Result<Vec<u8>, EncodeError>;
    fn decode(&self, bytes: &[u8]) -> Result<K, DecodeError>;
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("encoded key of {got_bytes} bytes exceeds max_key_bytes {max_key_bytes}")]
    KeyTooLarge {
        max_key_bytes: usize,
        got_bytes: usize,
    },
    #[error("floating-point values cannot form a grouping key")]
    FloatKey,
    #[error("unsupported key value: {reason}")]
    Unsupported { reason: String },
    #[error("json encode: {0}")]
    Json(#[from] serde_json::Error),
}

impl EncodeError {
    pub fn transience(&self) -> Transience {
        Transience::Permanent
    }

    pub fn effect(&self) -> Effect {
        Effect::None
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("key bytes truncated while reading {0}")]
    Truncated(&'static str),
    #[error("trailing bytes after decoded key value")]
    TrailingBytes,
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("invalid utf-8 in key bytes: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("varint: {0}")]
    VarInt(#[from] VarIntError),
    #[error("json decode: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    pub fn transience(&self) -> Transience {
        Transience::Permanent
    }

    pub fn effect(&self) -> Effect {
        Effect::None
    }
}

pub(crate) fn take<'a>(
    bytes: &'a [u8],
    offset: &mut usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8], DecodeError> {
    let end = offset
        .checked_add(len)
        .ok_or(DecodeError::Truncated(what))?;
    if end > bytes.len() {
        return Err(DecodeError::Truncated(what));
    }
    let slice = &bytes[*offset..end];
    *offset = end;
    Ok(slice)
}

pub(crate) fn read_array<const N: usize>(
    bytes: &[u8],
    offset: &mut usize,
    what: &'static str,
) -> Result<[u8; N], DecodeError> {
    let slice = take(bytes, offset, N, what)?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

pub(crate) fn read_varint(bytes: &[u8], offset: &mut usize) -> Result<u64, DecodeError> {
    let (value, used) = varint::decode(&bytes[*offset..])?;
    *offset += used;
    Ok(value)
}

/// Enforce the exact-consumption half of the coder contract.
pub(crate) fn finish(bytes: &[u8], offset: usize) -> Result<(), DecodeError> {
    if offset != bytes.len() {
        return Err(DecodeError::TrailingBytes);
    }
    Ok(())
}
