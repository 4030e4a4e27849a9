//! Channel framing for canonical keys.
//!
//! On the wire a key is an unsigned LEB128 varint length header (see
//! [`crate::varint`]) followed by exactly that many raw key bytes. This is
//! the runtime's general byte-array format, so any reader that speaks it can
//! reconstruct a key written here. The empty key is legal and frames to the
//! single byte `0x00`.

use std::io::{Read, Write};

use bytes::Bytes;
use thiserror::Error;

use crate::config::KeyLimits;
use crate::error::{Effect, Transience};
use crate::key::CanonicalKey;
use crate::varint::{self, VarIntError};

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("key frame truncated while reading {0}")]
    Truncated(&'static str),
    #[error("channel exhausted before a key frame")]
    Eof,
    #[error("key frame too large: max {max_key_bytes} got {got_bytes}")]
    TooLarge { max_key_bytes: usize, got_bytes: u64 },
    #[error("length header: {0}")]
    Length(#[from] VarIntError),
}

impl FrameError {
    pub fn transience(&self) -> Transience {
        match self {
            FrameError::Io(_) => Transience::Unknown,
            _ => Transience::Permanent,
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            // An io failure mid-write may have left a partial frame behind.
            FrameError::Io(_) => Effect::Unknown,
            _ => Effect::None,
        }
    }
}

/// Frame `payload` for the wire: length header plus raw bytes.
pub fn encode_key_frame(payload: &[u8], limits: &KeyLimits) -> Result<Vec<u8>, FrameError> {
    if payload.len() > limits.max_key_bytes {
        return Err(FrameError::TooLarge {
            max_key_bytes: limits.max_key_bytes,
            got_bytes: payload.len() as u64,
        });
    }
    let mut buf = Vec::with_capacity(varint::encoded_len(payload.len() as u64) + payload.len());
    varint::encode_into(&mut buf, payload.len() as u64);
    buf.extend_from_slice(payload);
    Ok(buf)
}

pub(crate) fn write_key_frame<W: Write>(
    writer: &mut W,
    payload: &[u8],
    limits: &KeyLimits,
) -> Result<usize, FrameError> {
    let frame = encode_key_frame(payload, limits)?;
    writer.write_all(&frame)?;
    Ok(frame.len())
}

/// Read one length-framed key payload.
///
/// `Ok(None)` means the channel ended cleanly at a frame boundary; running
/// out of bytes anywhere inside a frame is an error.
pub(crate) fn read_key_frame<R: Read>(
    reader: &mut R,
    limits: &KeyLimits,
) -> Result<Option<Bytes>, FrameError> {
    let mut header = [0u8; varint::MAX_ENCODED_LEN];
    let mut filled = 0usize;
    loop {
        let mut byte = [0u8; 1];
        let n = reader.read(&mut byte)?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(FrameError::Truncated("length header"));
        }
        if filled == header.len() {
            return Err(FrameError::Length(VarIntError::Overflow));
        }
        header[filled] = byte[0];
        filled += 1;
        if byte[0] & 0x80 == 0 {
            break;
        }
    }
    let (length, _) = varint::decode(&header[..filled])?;

    if length > limits.max_key_bytes as u64 {
        tracing::warn!(
            got_bytes = length,
            max_key_bytes = limits.max_key_bytes,
            "rejecting oversized key frame"
        );
        return Err(FrameError::TooLarge {
            max_key_bytes: limits.max_key_bytes,
            got_bytes: length,
        });
    }

    let length = length as usize;
    let mut body = vec![0u8; length];
    let mut read_body = 0usize;
    while read_body < length {
        let n = reader.read(&mut body[read_body..])?;
        if n == 0 {
            return Err(FrameError::Truncated("key payload"));
        }
        read_body += n;
    }
    Ok(Some(Bytes::from(body)))
}

/// Writes a stream of framed keys to a sequential channel.
pub struct KeyWriter<W> {
    writer: W,
    limits: KeyLimits,
}

impl<W: Write> KeyWriter<W> {
    pub fn new(writer: W, limits: KeyLimits) -> Self {
        Self { writer, limits }
    }

    /// Frame and write one key, returning the bytes put on the channel.
    pub fn write_key(&mut self, key: &CanonicalKey) -> Result<usize, FrameError> {
        write_key_frame(&mut self.writer, key.raw_bytes(), &self.limits)
    }

    pub fn flush(&mut self) -> Result<(), FrameError> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Reads a stream of framed keys from a sequential channel.
pub struct KeyReader<R> {
    reader: R,
    limits: KeyLimits,
}

impl<R: Read> KeyReader<R> {
    pub fn new(reader: R, limits: KeyLimits) -> Self {
        Self { reader, limits }
    }

    /// Next key on the channel, or `Ok(None)` on clean end of stream.
    pub fn next_key(&mut self) -> Result<Option<CanonicalKey>, FrameError> {
        Ok(read_key_frame(&mut self.reader, &self.limits)?.map(CanonicalKey::from_bytes))
    }
}
