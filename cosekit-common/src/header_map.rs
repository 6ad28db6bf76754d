// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! CBOR codec for COSE header maps and label maps.
//!
//! Header maps are encoded with deterministic key order (RFC 8949 §4.2.1:
//! bytewise order of the encoded keys), so integer labels come out as
//! `1, 4, ..., -1, -2, ...`. COSE_Key uses its own fixed order and writes its
//! entries through [`write_entries`] instead.

use std::collections::BTreeMap;

use cosekit_abstractions::{CoseError, CoseHeaderMap, DecodingError, HeaderKey, HeaderValue};
use minicbor::data::{Tag, Type};
use minicbor::{Decoder, Encoder};

/// Maximum nesting of arrays, maps and tags inside a single header value.
pub const MAX_HEADER_VALUE_DEPTH: usize = 16;

pub(crate) type CborEncoder = Encoder<Vec<u8>>;

/// Protected header: the logical map paired with the exact bytes that are
/// authenticated.
///
/// The bytes are never re-derived from the map after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtectedHeader {
    header: CoseHeaderMap,
    encoded_map_cbor: Vec<u8>,
}

impl ProtectedHeader {
    /// Serialize `header` once. An empty map is carried as a zero-length
    /// byte string.
    pub fn from_map(header: CoseHeaderMap) -> Result<Self, CoseError> {
        let encoded_map_cbor = if header.is_empty() {
            Vec::new()
        } else {
            encode_header_map(&header)?
        };
        Ok(Self {
            header,
            encoded_map_cbor,
        })
    }

    /// Adopt wire bytes as-is; the map is decoded from them.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CoseError> {
        let header = decode_header_map_bytes(&bytes)?;
        Ok(Self {
            header,
            encoded_map_cbor: bytes,
        })
    }

    pub fn header(&self) -> &CoseHeaderMap {
        &self.header
    }

    pub fn encoded_map_cbor(&self) -> &[u8] {
        &self.encoded_map_cbor
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }
}

/// Encode a header map with deterministic key order.
pub fn encode_header_map(header: &CoseHeaderMap) -> Result<Vec<u8>, CoseError> {
    let mut enc = Encoder::new(Vec::new());
    write_header_map(&mut enc, header)?;
    Ok(enc.into_writer())
}

pub(crate) fn write_header_map(enc: &mut CborEncoder, header: &CoseHeaderMap) -> Result<(), CoseError> {
    write_map(enc, header.map())
}

/// Write a map in exactly the given entry order.
pub(crate) fn write_entries(enc: &mut CborEncoder, entries: &[(HeaderKey, HeaderValue)]) -> Result<(), CoseError> {
    enc.map(entries.len() as u64).map_err(CoseError::encoding)?;
    for (key, value) in entries {
        write_key(enc, key)?;
        write_value(enc, value)?;
    }
    Ok(())
}

fn write_map(enc: &mut CborEncoder, map: &BTreeMap<HeaderKey, HeaderValue>) -> Result<(), CoseError> {
    let mut sorted = Vec::with_capacity(map.len());
    for (key, value) in map {
        sorted.push((encoded_key(key)?, key, value));
    }
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    enc.map(sorted.len() as u64).map_err(CoseError::encoding)?;
    for (_, key, value) in sorted {
        write_key(enc, key)?;
        write_value(enc, value)?;
    }
    Ok(())
}

/// Encoded form of a single key, the sort key for deterministic ordering.
pub(crate) fn encoded_key(key: &HeaderKey) -> Result<Vec<u8>, CoseError> {
    let mut enc = Encoder::new(Vec::new());
    write_key(&mut enc, key)?;
    Ok(enc.into_writer())
}

fn write_key(enc: &mut CborEncoder, key: &HeaderKey) -> Result<(), CoseError> {
    let written = match key {
        HeaderKey::Int(i) => enc.i64(*i),
        HeaderKey::Text(s) => enc.str(s),
    };
    written.map_err(CoseError::encoding)?;
    Ok(())
}

fn write_value(enc: &mut CborEncoder, value: &HeaderValue) -> Result<(), CoseError> {
    match value {
        HeaderValue::Int(i) => {
            enc.i64(*i).map_err(CoseError::encoding)?;
        }
        HeaderValue::Bytes(b) => {
            enc.bytes(b).map_err(CoseError::encoding)?;
        }
        HeaderValue::Text(s) => {
            enc.str(s).map_err(CoseError::encoding)?;
        }
        HeaderValue::Array(items) => {
            enc.array(items.len() as u64).map_err(CoseError::encoding)?;
            for item in items {
                write_value(enc, item)?;
            }
        }
        HeaderValue::Map(map) => write_map(enc, map)?,
        HeaderValue::Bool(b) => {
            enc.bool(*b).map_err(CoseError::encoding)?;
        }
        HeaderValue::Null => {
            enc.null().map_err(CoseError::encoding)?;
        }
        HeaderValue::Tagged(tag, inner) => {
            enc.tag(Tag::new(*tag)).map_err(CoseError::encoding)?;
            write_value(enc, inner)?;
        }
    }
    Ok(())
}

/// Decode serialized protected-header bytes. A zero-length input is the empty map.
pub fn decode_header_map_bytes(bytes: &[u8]) -> Result<CoseHeaderMap, DecodingError> {
    if bytes.is_empty() {
        return Ok(CoseHeaderMap::new());
    }

    let mut dec = Decoder::new(bytes);
    let map = decode_label_map(&mut dec, "protected header")?;

    if dec.position() != bytes.len() {
        return Err(DecodingError::TrailingBytes("protected header map"));
    }

    Ok(CoseHeaderMap::from_map(map))
}

/// Decode an inline header map (the unprotected slot of a message).
pub fn decode_header_map(dec: &mut Decoder<'_>) -> Result<CoseHeaderMap, DecodingError> {
    if !matches!(dec.datatype().map_err(DecodingError::cbor)?, Type::Map | Type::MapIndef) {
        return Err(DecodingError::UnexpectedType {
            field: "unprotected header",
            expected: "map",
        });
    }
    decode_label_map(dec, "unprotected header").map(CoseHeaderMap::from_map)
}

/// Decode a definite-length map of labels to values, rejecting duplicate labels.
pub(crate) fn decode_label_map(
    dec: &mut Decoder<'_>,
    field: &'static str,
) -> Result<BTreeMap<HeaderKey, HeaderValue>, DecodingError> {
    decode_map_at_depth(dec, field, 0)
}

fn decode_map_at_depth(
    dec: &mut Decoder<'_>,
    field: &'static str,
    depth: usize,
) -> Result<BTreeMap<HeaderKey, HeaderValue>, DecodingError> {
    let len = match dec.datatype().map_err(DecodingError::cbor)? {
        Type::Map => dec
            .map()
            .map_err(DecodingError::cbor)?
            .ok_or(DecodingError::IndefiniteLength("maps"))?,
        Type::MapIndef => return Err(DecodingError::IndefiniteLength("maps")),
        _ => return Err(DecodingError::UnexpectedType { field, expected: "map" }),
    };

    let mut map = BTreeMap::new();
    for _ in 0..len {
        let key = decode_key(dec, field)?;
        let value = decode_value(dec, field, depth)?;
        if map.contains_key(&key) {
            return Err(DecodingError::DuplicateLabel(label_name(&key)));
        }
        map.insert(key, value);
    }

    Ok(map)
}

fn label_name(key: &HeaderKey) -> String {
    match key {
        HeaderKey::Int(i) => i.to_string(),
        HeaderKey::Text(s) => format!("\"{s}\""),
    }
}

fn decode_key(dec: &mut Decoder<'_>, field: &'static str) -> Result<HeaderKey, DecodingError> {
    match dec.datatype().map_err(DecodingError::cbor)? {
        Type::I8
        | Type::I16
        | Type::I32
        | Type::I64
        | Type::Int
        | Type::U8
        | Type::U16
        | Type::U32
        | Type::U64 => Ok(HeaderKey::Int(dec.i64().map_err(DecodingError::cbor)?)),
        Type::String => Ok(HeaderKey::Text(dec.str().map_err(DecodingError::cbor)?.to_string())),
        _ => Err(DecodingError::UnexpectedType {
            field,
            expected: "int or tstr label",
        }),
    }
}

fn decode_value(dec: &mut Decoder<'_>, field: &'static str, depth: usize) -> Result<HeaderValue, DecodingError> {
    if depth >= MAX_HEADER_VALUE_DEPTH {
        return Err(DecodingError::NestingTooDeep {
            structure: "header value",
            max: MAX_HEADER_VALUE_DEPTH,
        });
    }

    match dec.datatype().map_err(DecodingError::cbor)? {
        Type::Null => {
            dec.null().map_err(DecodingError::cbor)?;
            Ok(HeaderValue::Null)
        }
        Type::Bool => Ok(HeaderValue::Bool(dec.bool().map_err(DecodingError::cbor)?)),
        Type::Bytes => Ok(HeaderValue::Bytes(dec.bytes().map_err(DecodingError::cbor)?.to_vec())),
        Type::String => Ok(HeaderValue::Text(dec.str().map_err(DecodingError::cbor)?.to_string())),
        Type::I8
        | Type::I16
        | Type::I32
        | Type::I64
        | Type::Int
        | Type::U8
        | Type::U16
        | Type::U32
        | Type::U64 => Ok(HeaderValue::Int(dec.i64().map_err(DecodingError::cbor)?)),
        Type::Array => {
            let len = dec
                .array()
                .map_err(DecodingError::cbor)?
                .ok_or(DecodingError::IndefiniteLength("arrays"))?;
            let mut items = Vec::new();
            for _ in 0..len {
                items.push(decode_value(dec, field, depth + 1)?);
            }
            Ok(HeaderValue::Array(items))
        }
        Type::Map => Ok(HeaderValue::Map(decode_map_at_depth(dec, field, depth + 1)?)),
        Type::Tag => {
            let tag = dec.tag().map_err(DecodingError::cbor)?;
            let inner = decode_value(dec, field, depth + 1)?;
            Ok(HeaderValue::Tagged(tag.as_u64(), Box::new(inner)))
        }
        Type::ArrayIndef => Err(DecodingError::IndefiniteLength("arrays")),
        Type::MapIndef => Err(DecodingError::IndefiniteLength("maps")),
        Type::BytesIndef => Err(DecodingError::IndefiniteLength("byte strings")),
        Type::StringIndef => Err(DecodingError::IndefiniteLength("text strings")),
        _ => Err(DecodingError::UnexpectedType {
            field,
            expected: "int, bstr, tstr, array, map, bool, null or tag",
        }),
    }
}
