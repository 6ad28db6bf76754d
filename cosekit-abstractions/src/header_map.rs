// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE header map types.
//!
//! The same label/value model backs protected headers, unprotected headers and
//! COSE_Key parameter maps. Unknown labels are kept so that re-encoding does not
//! drop extension fields.

use std::collections::BTreeMap;

use crate::iana::header;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeaderKey {
    /// Integer label (the most common COSE header key form).
    Int(i64),
    /// Text label.
    Text(String),
}

impl From<i64> for HeaderKey {
    fn from(label: i64) -> Self {
        HeaderKey::Int(label)
    }
}

impl From<&str> for HeaderKey {
    fn from(label: &str) -> Self {
        HeaderKey::Text(label.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Int(i64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<HeaderValue>),
    Map(BTreeMap<HeaderKey, HeaderValue>),
    Bool(bool),
    Null,
    /// Tagged item (tag number, content).
    Tagged(u64, Box<HeaderValue>),
}

impl HeaderValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            HeaderValue::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[HeaderValue]> {
        match self {
            HeaderValue::Array(a) => Some(a.as_slice()),
            _ => None,
        }
    }

    /// Short CBOR type name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            HeaderValue::Int(_) => "int",
            HeaderValue::Bytes(_) => "bstr",
            HeaderValue::Text(_) => "tstr",
            HeaderValue::Array(_) => "array",
            HeaderValue::Map(_) => "map",
            HeaderValue::Bool(_) => "bool",
            HeaderValue::Null => "null",
            HeaderValue::Tagged(..) => "tag",
        }
    }
}

impl From<i64> for HeaderValue {
    fn from(v: i64) -> Self {
        HeaderValue::Int(v)
    }
}

impl From<Vec<u8>> for HeaderValue {
    fn from(v: Vec<u8>) -> Self {
        HeaderValue::Bytes(v)
    }
}

impl From<&[u8]> for HeaderValue {
    fn from(v: &[u8]) -> Self {
        HeaderValue::Bytes(v.to_vec())
    }
}

impl From<&str> for HeaderValue {
    fn from(v: &str) -> Self {
        HeaderValue::Text(v.to_string())
    }
}

impl From<bool> for HeaderValue {
    fn from(v: bool) -> Self {
        HeaderValue::Bool(v)
    }
}

/// Logical COSE header map.
///
/// This type carries no encoding. Protected headers pair it with the exact
/// serialized bytes (see `cosekit_common::ProtectedHeader`).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CoseHeaderMap {
    map: BTreeMap<HeaderKey, HeaderValue>,
}

impl CoseHeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: BTreeMap<HeaderKey, HeaderValue>) -> Self {
        Self { map }
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn get(&self, key: &HeaderKey) -> Option<&HeaderValue> {
        self.map.get(key)
    }

    pub fn insert(&mut self, key: impl Into<HeaderKey>, value: impl Into<HeaderValue>) -> Option<HeaderValue> {
        self.map.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &HeaderKey) -> Option<HeaderValue> {
        self.map.remove(key)
    }

    pub fn contains_label(&self, label: i64) -> bool {
        self.map.contains_key(&HeaderKey::Int(label))
    }

    pub fn get_i64(&self, key: i64) -> Option<i64> {
        self.map.get(&HeaderKey::Int(key)).and_then(HeaderValue::as_i64)
    }

    pub fn get_bytes(&self, key: i64) -> Option<&[u8]> {
        self.map.get(&HeaderKey::Int(key)).and_then(HeaderValue::as_bytes)
    }

    pub fn get_array(&self, key: i64) -> Option<&[HeaderValue]> {
        self.map.get(&HeaderKey::Int(key)).and_then(HeaderValue::as_array)
    }

    pub fn get_text(&self, key: i64) -> Option<&str> {
        self.map.get(&HeaderKey::Int(key)).and_then(HeaderValue::as_text)
    }

    pub fn map(&self) -> &BTreeMap<HeaderKey, HeaderValue> {
        &self.map
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderKey, &HeaderValue)> {
        self.map.iter()
    }

    /// `alg` (label 1), when it is an integer.
    pub fn algorithm(&self) -> Option<i64> {
        self.get_i64(header::ALG)
    }

    /// `kid` (label 4).
    pub fn key_id(&self) -> Option<&[u8]> {
        self.get_bytes(header::KID)
    }

    /// `IV` (label 5).
    pub fn iv(&self) -> Option<&[u8]> {
        self.get_bytes(header::IV)
    }

    /// `Partial IV` (label 6).
    pub fn partial_iv(&self) -> Option<&[u8]> {
        self.get_bytes(header::PARTIAL_IV)
    }

    pub fn with_algorithm(mut self, alg: impl Into<i64>) -> Self {
        self.insert(header::ALG, HeaderValue::Int(alg.into()));
        self
    }

    pub fn with_key_id(mut self, kid: impl Into<Vec<u8>>) -> Self {
        self.insert(header::KID, HeaderValue::Bytes(kid.into()));
        self
    }

    pub fn with_iv(mut self, iv: impl Into<Vec<u8>>) -> Self {
        self.insert(header::IV, HeaderValue::Bytes(iv.into()));
        self
    }

    pub fn with_partial_iv(mut self, partial_iv: impl Into<Vec<u8>>) -> Self {
        self.insert(header::PARTIAL_IV, HeaderValue::Bytes(partial_iv.into()));
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<HeaderValue>) -> Self {
        self.insert(header::CONTENT_TYPE, content_type.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<HeaderKey>, value: impl Into<HeaderValue>) -> Self {
        self.insert(key, value);
        self
    }
}

impl FromIterator<(HeaderKey, HeaderValue)> for CoseHeaderMap {
    fn from_iter<T: IntoIterator<Item = (HeaderKey, HeaderValue)>>(iter: T) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}
