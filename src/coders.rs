//! Stock key codecs.
//!
//! Every coder here satisfies the [`KeyCoder`] contract: deterministic,
//! context-free, and exact-consumption on decode. Fixed-width integers use
//! big-endian so encoded order matches numeric order for unsigned ranges;
//! composite coders frame their first field with a varint length.

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::ser::{
    SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant, SerializeTuple,
    SerializeTupleStruct, SerializeTupleVariant, Serializer,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::coder::{self, DecodeError, EncodeError, KeyCoder};
use crate::varint;

/// `i32` as four big-endian bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct BigEndianI32Coder;

impl KeyCoder<i32> for BigEndianI32Coder {
    fn encode(&self, value: &i32) -> Result<Vec<u8>, EncodeError> {
        Ok(value.to_be_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<i32, DecodeError> {
        let mut offset = 0usize;
        let raw = coder::read_array::<4>(bytes, &mut offset, "i32 key")?;
        coder::finish(bytes, offset)?;
        Ok(i32::from_be_bytes(raw))
    }
}

/// `i64` as eight big-endian bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct BigEndianI64Coder;

impl KeyCoder<i64> for BigEndianI64Coder {
    fn encode(&self, value: &i64) -> Result<Vec<u8>, EncodeError> {
        Ok(value.to_be_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<i64, DecodeError> {
        let mut offset = 0usize;
        let raw = coder::read_array::<8>(bytes, &mut offset, "i64 key")?;
        coder::finish(bytes, offset)?;
        Ok(i64::from_be_bytes(raw))
    }
}

/// `u64` as a LEB128 varint; compact for small values.
#[derive(Clone, Copy, Debug, Default)]
pub struct VarIntCoder;

impl KeyCoder<u64> for VarIntCoder {
    fn encode(&self, value: &u64) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::with_capacity(varint::encoded_len(*value));
        varint::encode_into(&mut buf, *value);
        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<u64, DecodeError> {
        let (value, used) = varint::decode(bytes)?;
        coder::finish(bytes, used)?;
        Ok(value)
    }
}

/// `String` as its raw UTF-8 bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Utf8Coder;

impl KeyCoder<String> for Utf8Coder {
    fn encode(&self, value: &String) -> Result<Vec<u8>, EncodeError> {
        Ok(value.as_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

/// Identity coder for keys that are already bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawBytesCoder;

impl KeyCoder<Bytes> for RawBytesCoder {
    fn encode(&self, value: &Bytes) -> Result<Vec<u8>, EncodeError> {
        Ok(value.to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Bytes, DecodeError> {
        Ok(Bytes::copy_from_slice(bytes))
    }
}

/// The unit key; encodes to zero bytes. There is exactly one such key.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnitCoder;

impl KeyCoder<()> for UnitCoder {
    fn encode(&self, _value: &()) -> Result<Vec<u8>, EncodeError> {
        Ok(Vec::new())
    }

    fn decode(&self, bytes: &[u8]) -> Result<(), DecodeError> {
        coder::finish(bytes, 0)
    }
}

/// Composite coder for two-part keys.
///
/// The first component is varint-length-framed so the decoder knows where it
/// ends; the second takes the remainder of the slice.
#[derive(Clone, Copy, Debug, Default)]
pub struct PairCoder<CA, CB> {
    first: CA,
    second: CB,
}

impl<CA, CB> PairCoder<CA, CB> {
    pub fn new(first: CA, second: CB) -> Self {
        Self { first, second }
    }
}

impl<A, B, CA, CB> KeyCoder<(A, B)> for PairCoder<CA, CB>
where
    CA: KeyCoder<A>,
    CB: KeyCoder<B>,
{
    fn encode(&self, value: &(A, B)) -> Result<Vec<u8>, EncodeError> {
        let first = self.first.encode(&value.0)?;
        let second = self.second.encode(&value.1)?;
        let mut buf = Vec::with_capacity(
            varint::encoded_len(first.len() as u64) + first.len() + second.len(),
        );
        varint::encode_into(&mut buf, first.len() as u64);
        buf.extend_from_slice(&first);
        buf.extend_from_slice(&second);
        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<(A, B), DecodeError> {
        let mut offset = 0usize;
        let first_len = coder::read_varint(bytes, &mut offset)?;
        let first_len = usize::try_from(first_len).map_err(|_| DecodeError::InvalidField {
            field: "pair first length",
            reason: "exceeds addressable size".to_string(),
        })?;
        let first_bytes = coder::take(bytes, &mut offset, first_len, "pair first component")?;
        let a = self.first.decode(first_bytes)?;
        let b = self.second.decode(&bytes[offset..])?;
        Ok((a, b))
    }
}

/// Structured keys as canonical JSON.
///
/// Canonical rules:
/// - object keys sorted by UTF-8 byte order, recursively
/// - no insignificant whitespace
/// - floating-point values rejected at encode; float comparison semantics
///   make them unusable as grouping keys, and naive JSON would turn NaN
///   into `null` silently
pub struct CanonJsonCoder<K> {
    _marker: PhantomData<fn() -> K>,
}

impl<K> CanonJsonCoder<K> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<K> Default for CanonJsonCoder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for CanonJsonCoder<K> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<K> Copy for CanonJsonCoder<K> {}

impl<K> fmt::Debug for CanonJsonCoder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonJsonCoder").finish()
    }
}

impl<K> KeyCoder<K> for CanonJsonCoder<K>
where
    K: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &K) -> Result<Vec<u8>, EncodeError> {
        reject_floats(value)?;
        let value = serde_json::to_value(value)?;
        let canon = canon_value(value);
        Ok(serde_json::to_vec(&canon)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<K, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn canon_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let canon: Map<String, Value> = entries
                .into_iter()
                .map(|(key, value)| (key, canon_value(value)))
                .collect();
            Value::Object(canon)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canon_value).collect()),
        other => other,
    }
}

fn reject_floats<T: Serialize>(value: &T) -> Result<(), EncodeError> {
    match value.serialize(KeyShapeProbe) {
        Ok(()) => Ok(()),
        Err(ProbeReject::Float) => Err(EncodeError::FloatKey),
        Err(ProbeReject::Custom(reason)) => Err(EncodeError::Unsupported { reason }),
    }
}

/// Walks a value's serde shape without producing output, failing on floats.
#[derive(Debug)]
enum ProbeReject {
    Float,
    Custom(String),
}

impl fmt::Display for ProbeReject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeReject::Float => f.write_str("floating-point value in key"),
            ProbeReject::Custom(reason) => f.write_str(reason),
        }
    }
}

impl std::error::Error for ProbeReject {}

impl serde::ser::Error for ProbeReject {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ProbeReject::Custom(msg.to_string())
    }
}

struct KeyShapeProbe;

struct ProbeParts;

impl Serializer for KeyShapeProbe {
    type Ok = ();
    type Error = ProbeReject;
    type SerializeSeq = ProbeParts;
    type SerializeTuple = ProbeParts;
    type SerializeTupleStruct = ProbeParts;
    type SerializeTupleVariant = ProbeParts;
    type SerializeMap = ProbeParts;
    type SerializeStruct = ProbeParts;
    type SerializeStructVariant = ProbeParts;

    fn serialize_bool(self, _v: bool) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_f32(self, _v: f32) -> Result<Self::Ok, Self::Error> {
        Err(ProbeReject::Float)
    }

    fn serialize_f64(self, _v: f64) -> Result<Self::Ok, Self::Error> {
        Err(ProbeReject::Float)
    }

    fn serialize_char(self, _v: char) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(ProbeParts)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(ProbeParts)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Ok(ProbeParts)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Ok(ProbeParts)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(ProbeParts)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(ProbeParts)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Ok(ProbeParts)
    }
}

impl SerializeSeq for ProbeParts {
    type Ok = ();
    type Error = ProbeReject;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(KeyShapeProbe)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl SerializeTuple for ProbeParts {
    type Ok = ();
    type Error = ProbeReject;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(KeyShapeProbe)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl SerializeTupleStruct for ProbeParts {
    type Ok = ();
    type Error = ProbeReject;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(KeyShapeProbe)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl SerializeTupleVariant for ProbeParts {
    type Ok = ();
    type Error = ProbeReject;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(KeyShapeProbe)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl SerializeMap for ProbeParts {
    type Ok = ();
    type Error = ProbeReject;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Self::Error> {
        key.serialize(KeyShapeProbe)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(KeyShapeProbe)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl SerializeStruct for ProbeParts {
    type Ok = ();
    type Error = ProbeReject;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(KeyShapeProbe)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl SerializeStructVariant for ProbeParts {
    type Ok = ();
    type Error = ProbeReject;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(KeyShapeProbe)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}
