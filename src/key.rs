//! Canonical byte-sequence identity for grouping keys.
//!
//! Routing, grouping, and keyed-state lookup all compare keys as opaque
//! bytes. A typed key is encoded once, circulates as a [`CanonicalKey`], and
//! is decoded back only when a consumer needs the original value again.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};

use bytes::Bytes;

use crate::coder::{DecodeError, EncodeError, KeyCoder};
use crate::config::KeyLimits;
use crate::frame::{self, FrameError};
use crate::hash::stable_hash_64;

/// An immutable byte sequence standing in for an arbitrary typed key.
///
/// Equality and hashing are defined over the byte content only, never over
/// buffer identity: two keys built independently from the same bytes are
/// equal and hash equal. The bytes never change after construction, so
/// instances are freely shared across threads.
#[derive(Clone)]
pub struct CanonicalKey {
    bytes: Bytes,
    hash: u64,
}

impl CanonicalKey {
    /// Wrap an existing canonical byte sequence. Empty bytes are a valid key.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let hash = stable_hash_64(&bytes);
        Self { bytes, hash }
    }

    /// Encode `value` with `coder` and wrap the result.
    ///
    /// The encoded size is checked against `limits.max_key_bytes`; nothing
    /// is constructed on failure.
    pub fn from_typed<K, C>(value: &K, coder: &C, limits: &KeyLimits) -> Result<Self, EncodeError>
    where
        C: KeyCoder<K>,
    {
        let encoded = coder.encode(value)?;
        if encoded.len() > limits.max_key_bytes {
            return Err(EncodeError::KeyTooLarge {
                max_key_bytes: limits.max_key_bytes,
                got_bytes: encoded.len(),
            });
        }
        if encoded.len() > limits.warn_key_bytes {
            tracing::warn!(
                key_bytes = encoded.len(),
                warn_key_bytes = limits.warn_key_bytes,
                "grouping key unusually large"
            );
        }
        Ok(Self::from_bytes(encoded))
    }

    /// The canonical byte sequence. Read-only view.
    pub fn raw_bytes(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the stored bytes back to a typed value.
    ///
    /// Idempotent and `&self`; the key is untouched by failure, so a wrong
    /// coder can be retried with the right one. The coder must consume the
    /// whole byte sequence, which catches most wrong-coder mistakes as
    /// [`DecodeError`] instead of silently wrong values.
    pub fn decode<K, C>(&self, coder: &C) -> Result<K, DecodeError>
    where
        C: KeyCoder<K>,
    {
        coder.decode(self.bytes.as_ref())
    }

    /// The 64-bit partition-agreement hash of the byte content.
    ///
    /// Stable across processes, restarts, and versions; see
    /// [`stable_hash_64`] for the definition.
    pub fn stable_hash(&self) -> u64 {
        self.hash
    }

    /// Write the length-framed key to a sequential channel.
    ///
    /// Returns the number of bytes written. Framing is the runtime's
    /// byte-array wire format, documented in [`crate::frame`].
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        limits: &KeyLimits,
    ) -> Result<usize, FrameError> {
        frame::write_key_frame(writer, self.bytes.as_ref(), limits)
    }

    /// Read one length-framed key from a sequential channel.
    ///
    /// A channel with no frame at all is [`FrameError::Eof`]; use
    /// [`frame::KeyReader`] when the end of a key stream is expected.
    pub fn read_from<R: Read>(reader: &mut R, limits: &KeyLimits) -> Result<Self, FrameError> {
        match frame::read_key_frame(reader, limits)? {
            Some(bytes) => Ok(Self::from_bytes(bytes)),
            None => Err(FrameError::Eof),
        }
    }
}

impl PartialEq for CanonicalKey {
    fn eq(&self, other: &Self) -> bool {
        // Content identity; the cached hash only ever short-circuits inequality.
        self.hash == other.hash && self.bytes == other.bytes
    }
}

impl Eq for CanonicalKey {}

impl Hash for CanonicalKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl AsRef<[u8]> for CanonicalKey {
    fn as_ref(&self) -> &[u8] {
        self.bytes.as_ref()
    }
}

impl fmt::Debug for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW_BYTES: usize = 16;
        write!(f, "CanonicalKey(len={}, bytes=", self.bytes.len())?;
        for byte in self.bytes.iter().take(PREVIEW_BYTES) {
            write!(f, "{byte:02x}")?;
        }
        if self.bytes.len() > PREVIEW_BYTES {
            write!(f, "..")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coders::{BigEndianI32Coder, Utf8Coder};
    use crate::hash;

    fn assert_shareable<T: Send + Sync>() {}

    #[test]
    fn keys_are_send_and_sync() {
        assert_shareable::<CanonicalKey>();
    }

    #[test]
    fn equality_is_content_not_buffer_identity() {
        let a = CanonicalKey::from_bytes(Bytes::from_static(b"key"));
        let b = CanonicalKey::from_bytes(b"key".to_vec());
        assert_eq!(a, b);
        assert_eq!(a.stable_hash(), b.stable_hash());

        let c = CanonicalKey::from_bytes(b"other".to_vec());
        assert_ne!(a, c);
    }

    #[test]
    fn cached_hash_matches_recomputation() {
        let key = CanonicalKey::from_bytes(vec![1u8, 2, 3]);
        assert_eq!(key.stable_hash(), hash::stable_hash_64(key.raw_bytes()));
        let empty = CanonicalKey::from_bytes(Vec::new());
        assert_eq!(empty.stable_hash(), hash::stable_hash_64(b""));
    }

    #[test]
    fn from_typed_enforces_max_key_bytes() {
        let limits = KeyLimits {
            max_key_bytes: 4,
            warn_key_bytes: 4,
        };
        let err =
            CanonicalKey::from_typed(&"too long".to_string(), &Utf8Coder, &limits).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::KeyTooLarge {
                max_key_bytes: 4,
                got_bytes: 8
            }
        ));
    }

    #[test]
    fn decode_is_repeatable_and_failure_leaves_key_reusable() {
        let limits = KeyLimits::default();
        let key = CanonicalKey::from_typed(&"hello".to_string(), &Utf8Coder, &limits).unwrap();
        assert_eq!(key.decode(&Utf8Coder).unwrap(), "hello");
        assert_eq!(key.decode(&Utf8Coder).unwrap(), "hello");

        // Wrong coder: five bytes do not form an exact i32 encoding.
        let err = key.decode(&BigEndianI32Coder).unwrap_err();
        assert!(matches!(err, DecodeError::TrailingBytes));
        assert_eq!(key.decode(&Utf8Coder).unwrap(), "hello");
    }

    #[test]
    fn clone_shares_identity() {
        let key = CanonicalKey::from_bytes(vec![9u8; 40]);
        let clone = key.clone();
        assert_eq!(key, clone);
        assert_eq!(key.stable_hash(), clone.stable_hash());
        assert_eq!(key.raw_bytes(), clone.raw_bytes());
    }

    #[test]
    fn debug_previews_long_keys() {
        let short = CanonicalKey::from_bytes(vec![0xabu8, 0xcd]);
        assert_eq!(format!("{short:?}"), "CanonicalKey(len=2, bytes=abcd)");

        let long = CanonicalKey::from_bytes(vec![0x00u8; 20]);
        let rendered = format!("{long:?}");
        assert!(rendered.starts_with("CanonicalKey(len=20, bytes="));
        assert!(rendered.ends_with("..)"));
    }
}
