//! Unsigned LEB128 varint, the length header of the key wire format.
//!
//! Encoding: little-endian base-128. Each byte carries the next 7 low bits
//! of the value; the high bit is set on every byte except the last. Zero
//! encodes as the single byte `0x00`. A `u64` needs at most [`MAX_ENCODED_LEN`]
//! bytes, and the tenth byte may only be `0x00` or `0x01`.

use thiserror::Error;

/// Longest possible encoding of a `u64`.
pub const MAX_ENCODED_LEN: usize = 10;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum VarIntError {
    #[error("varint truncated")]
    Truncated,
    #[error("varint exceeds u64 range")]
    Overflow,
}

/// Number of bytes [`encode_into`] will append for `value`.
pub fn encoded_len(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7)
}

pub fn encode_into(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Decode a varint from the front of `bytes`, returning the value and the
/// number of bytes consumed. Non-minimal encodings are accepted.
pub fn decode(bytes: &[u8]) -> Result<(u64, usize), VarIntError> {
    let mut value = 0u64;
    let mut shift = 0u32;
    for (index, &byte) in bytes.iter().enumerate() {
        if index >= MAX_ENCODED_LEN {
            return Err(VarIntError::Overflow);
        }
        let group = u64::from(byte & 0x7f);
        if shift == 63 && group > 1 {
            return Err(VarIntError::Overflow);
        }
        value |= group << shift;
        if byte & 0x80 == 0 {
            return Ok((value, index + 1));
        }
        shift += 7;
    }
    Err(VarIntError::Truncated)
}
