#![forbid(unsafe_code)]

pub mod coder;
pub mod coders;
pub mod config;
pub mod error;
pub mod frame;
pub mod hash;
pub mod key;
pub mod varint;

pub use error::{Effect, Error, Transience};
pub type Result<T> = std::result::Result<T, Error>;

// Re-export the working surface at crate root for convenience
pub use crate::coder::{DecodeError, EncodeError, KeyCoder};
pub use crate::coders::{
    BigEndianI32Coder, BigEndianI64Coder, CanonJsonCoder, PairCoder, RawBytesCoder, UnitCoder,
    Utf8Coder, VarIntCoder,
};
pub use crate::config::{ConfigHandle, KeyLimits};
pub use crate::frame::{FrameError, KeyReader, KeyWriter};
pub use crate::hash::stable_hash_64;
pub use crate::key::CanonicalKey;
