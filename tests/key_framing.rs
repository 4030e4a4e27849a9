//! Channel serialization: wire framing, stream reading, limits, real files.

mod fixtures;

use std::io::{Cursor, Seek, SeekFrom};

use fixtures::samples::distinct_samples;
use proptest::prelude::*;

use keywire::{CanonicalKey, ConfigHandle, FrameError, KeyLimits, KeyReader, KeyWriter};

#[test]
fn serialization_roundtrip_preserves_bytes() {
    let limits = KeyLimits::default();
    for sample in distinct_samples(400) {
        let key = CanonicalKey::from_bytes(sample.clone());

        let mut channel = Vec::new();
        let written = key.write_to(&mut channel, &limits).unwrap();
        assert_eq!(written, channel.len());

        let mut cursor = Cursor::new(channel);
        let back = CanonicalKey::read_from(&mut cursor, &limits).unwrap();
        assert_eq!(back.raw_bytes(), sample.as_slice());
        assert_eq!(back, key);
        assert_eq!(back.stable_hash(), key.stable_hash());
    }
}

#[test]
fn file_channel_roundtrip() {
    let config = ConfigHandle::fixed(KeyLimits::default());
    let keys = [
        CanonicalKey::from_bytes(b"tenant/acme".to_vec()),
        CanonicalKey::from_bytes(Vec::new()),
        CanonicalKey::from_bytes(vec![0xde, 0xad, 0xbe, 0xef]),
    ];

    let mut file = tempfile::tempfile().unwrap();
    let mut writer = KeyWriter::new(&mut file, config.limits().clone());
    for key in &keys {
        writer.write_key(key).unwrap();
    }
    writer.flush().unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut reader = KeyReader::new(&mut file, config.limits().clone());
    for key in &keys {
        let read = reader.next_key().unwrap().unwrap();
        assert_eq!(&read, key);
    }
    assert!(reader.next_key().unwrap().is_none());
}

#[test]
fn reading_an_exhausted_channel_is_eof() {
    let limits = KeyLimits::default();
    let mut empty = Cursor::new(Vec::new());
    let err = CanonicalKey::read_from(&mut empty, &limits).unwrap_err();
    assert!(matches!(err, FrameError::Eof));
}

#[test]
fn truncated_stream_is_an_error_not_a_clean_end() {
    let limits = KeyLimits::default();
    let first = CanonicalKey::from_bytes(b"complete".to_vec());
    let second = CanonicalKey::from_bytes(b"cut off".to_vec());

    let mut channel = Vec::new();
    first.write_to(&mut channel, &limits).unwrap();
    second.write_to(&mut channel, &limits).unwrap();
    channel.truncate(channel.len() - 3);

    let mut reader = KeyReader::new(Cursor::new(channel), limits);
    assert_eq!(reader.next_key().unwrap().unwrap(), first);
    let err = reader.next_key().unwrap_err();
    assert!(matches!(err, FrameError::Truncated("key payload")));
}

#[test]
fn limits_bound_both_directions() {
    let tight = KeyLimits {
        max_key_bytes: 8,
        warn_key_bytes: 8,
    };
    let big = CanonicalKey::from_bytes(vec![0u8; 32]);

    let mut channel = Vec::new();
    let err = big.write_to(&mut channel, &tight).unwrap_err();
    assert!(matches!(err, FrameError::TooLarge { got_bytes: 32, .. }));
    assert!(channel.is_empty());

    // The same frame written under generous limits is rejected by a tight reader.
    let mut channel = Vec::new();
    big.write_to(&mut channel, &KeyLimits::default()).unwrap();
    let mut cursor = Cursor::new(channel);
    let err = CanonicalKey::read_from(&mut cursor, &tight).unwrap_err();
    assert!(matches!(err, FrameError::TooLarge { got_bytes: 32, .. }));
}

proptest! {
    #[test]
    fn serialization_roundtrip_law(payload in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let limits = KeyLimits::default();
        let key = CanonicalKey::from_bytes(payload.clone());

        let mut channel = Vec::new();
        key.write_to(&mut channel, &limits).unwrap();
        let mut cursor = Cursor::new(channel);
        let back = CanonicalKey::read_from(&mut cursor, &limits).unwrap();

        prop_assert_eq!(back.raw_bytes(), payload.as_slice());
        prop_assert_eq!(back, key);
    }
}
