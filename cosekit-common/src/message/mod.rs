// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE message envelopes (RFC 9052 §4-§6).
//!
//! Every envelope is an immutable value produced either by its builder or by
//! [`CoseStructure::from_slice`]. Decoding is strict: exact array arity, an
//! optional leading tag that must match the message type, no indefinite
//! lengths and no trailing bytes.

use cosekit_abstractions::{BuilderError, CoseError, CoseHeaderMap, DecodingError};
use minicbor::data::{Tag, Type};
use minicbor::{Decoder, Encoder};

use crate::header_map::{decode_header_map, write_header_map, ProtectedHeader};

pub mod encrypt;
pub mod encrypt0;
pub mod mac;
pub mod mac0;
pub mod recipient;
pub mod sign;
pub mod sign1;

/// Default bound on nested COSE_recipient structures.
pub const MAX_RECIPIENT_DEPTH: usize = 8;

/// Encode/decode contract shared by all envelopes.
pub trait CoseStructure: Sized {
    /// Name used in diagnostics, e.g. `COSE_Sign1`.
    const NAME: &'static str;

    /// CBOR tag of the message type; `None` for sub-structures.
    const TAG: Option<u64>;

    /// Write the untagged array.
    fn encode_cbor(&self, enc: &mut Encoder<Vec<u8>>) -> Result<(), CoseError>;

    /// Read the untagged array. `max_depth` bounds recipient nesting.
    fn decode_cbor(dec: &mut Decoder<'_>, max_depth: usize) -> Result<Self, CoseError>;

    /// Untagged encoding.
    fn to_vec(&self) -> Result<Vec<u8>, CoseError> {
        let mut enc = Encoder::new(Vec::new());
        self.encode_cbor(&mut enc)?;
        Ok(enc.into_writer())
    }

    /// Encoding prefixed with the message tag, when the type has one.
    fn to_tagged_vec(&self) -> Result<Vec<u8>, CoseError> {
        let mut enc = Encoder::new(Vec::new());
        if let Some(tag) = Self::TAG {
            enc.tag(Tag::new(tag)).map_err(CoseError::encoding)?;
        }
        self.encode_cbor(&mut enc)?;
        Ok(enc.into_writer())
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, CoseError> {
        Self::from_slice_with_max_depth(bytes, MAX_RECIPIENT_DEPTH)
    }

    /// Decode with an explicit recipient nesting bound.
    fn from_slice_with_max_depth(bytes: &[u8], max_depth: usize) -> Result<Self, CoseError> {
        if bytes.is_empty() {
            return Err(DecodingError::Empty.into());
        }

        let mut dec = Decoder::new(bytes);

        if matches!(dec.datatype().map_err(DecodingError::cbor)?, Type::Tag) {
            let tag = dec.tag().map_err(DecodingError::cbor)?.as_u64();
            match Self::TAG {
                Some(expected) if expected == tag => {}
                Some(expected) => {
                    return Err(DecodingError::UnexpectedTag {
                        structure: Self::NAME,
                        expected,
                        actual: tag,
                    }
                    .into())
                }
                None => {
                    return Err(DecodingError::UnexpectedType {
                        field: Self::NAME,
                        expected: "untagged array",
                    }
                    .into())
                }
            }
        }

        let value = Self::decode_cbor(&mut dec, max_depth)?;

        if dec.position() != bytes.len() {
            return Err(DecodingError::TrailingBytes(Self::NAME).into());
        }

        Ok(value)
    }
}

/// Select the content for an AAD structure.
///
/// Exactly one of the embedded and detached content must be non-empty.
pub fn resolve_content<'a>(embedded: Option<&'a [u8]>, detached: Option<&'a [u8]>) -> Result<&'a [u8], CoseError> {
    let embedded = embedded.filter(|c| !c.is_empty());
    let detached = detached.filter(|c| !c.is_empty());
    match (embedded, detached) {
        (Some(content), None) | (None, Some(content)) => Ok(content),
        (Some(_), Some(_)) => Err(CoseError::InvalidPayload("both embedded and detached content were supplied")),
        (None, None) => Err(CoseError::InvalidPayload("no content was supplied")),
    }
}

// --- builder slots ---

/// Protected-header input: either a map (serialized at build) or raw bytes.
#[derive(Debug, Clone, Default)]
pub(crate) enum ProtectedInput {
    #[default]
    Unset,
    Map(CoseHeaderMap),
    Bytes(Vec<u8>),
}

impl ProtectedInput {
    pub(crate) fn set(&mut self, value: ProtectedInput) -> Result<(), BuilderError> {
        let conflict = matches!(
            (&*self, &value),
            (ProtectedInput::Map(_), ProtectedInput::Bytes(_)) | (ProtectedInput::Bytes(_), ProtectedInput::Map(_))
        );
        if conflict {
            return Err(BuilderError::ConflictingFields("protected"));
        }
        *self = value;
        Ok(())
    }

    pub(crate) fn resolve(self) -> Result<ProtectedHeader, CoseError> {
        match self {
            ProtectedInput::Unset => Err(BuilderError::MissingField("protected").into()),
            ProtectedInput::Map(map) => ProtectedHeader::from_map(map),
            ProtectedInput::Bytes(bytes) => ProtectedHeader::from_bytes(bytes),
        }
    }
}

/// Payload or ciphertext input: embedded bytes or explicitly detached.
#[derive(Debug, Clone, Default)]
pub(crate) enum ContentInput {
    #[default]
    Unset,
    Embedded(Vec<u8>),
    Detached,
}

impl ContentInput {
    pub(crate) fn set(&mut self, value: ContentInput, field: &'static str) -> Result<(), BuilderError> {
        let conflict = matches!(
            (&*self, &value),
            (ContentInput::Embedded(_), ContentInput::Detached) | (ContentInput::Detached, ContentInput::Embedded(_))
        );
        if conflict {
            return Err(BuilderError::ConflictingFields(field));
        }
        *self = value;
        Ok(())
    }

    pub(crate) fn resolve(self, field: &'static str) -> Result<Option<Vec<u8>>, BuilderError> {
        match self {
            ContentInput::Unset => Err(BuilderError::MissingField(field)),
            ContentInput::Embedded(bytes) => Ok(Some(bytes)),
            ContentInput::Detached => Ok(None),
        }
    }
}

// --- shared codec helpers ---

pub(crate) fn read_array_len(dec: &mut Decoder<'_>, structure: &'static str) -> Result<u64, DecodingError> {
    match dec.datatype().map_err(DecodingError::cbor)? {
        Type::Array => dec
            .array()
            .map_err(DecodingError::cbor)?
            .ok_or(DecodingError::IndefiniteLength("arrays")),
        Type::ArrayIndef => Err(DecodingError::IndefiniteLength("arrays")),
        _ => Err(DecodingError::UnexpectedType {
            field: structure,
            expected: "array",
        }),
    }
}

pub(crate) fn expect_array_len(
    dec: &mut Decoder<'_>,
    structure: &'static str,
    expected: u64,
    expected_text: &'static str,
) -> Result<(), DecodingError> {
    let actual = read_array_len(dec, structure)?;
    if actual != expected {
        return Err(DecodingError::ArrayLength {
            structure,
            expected: expected_text,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn read_bstr(dec: &mut Decoder<'_>, field: &'static str) -> Result<Vec<u8>, DecodingError> {
    match dec.datatype().map_err(DecodingError::cbor)? {
        Type::Bytes => Ok(dec.bytes().map_err(DecodingError::cbor)?.to_vec()),
        Type::BytesIndef => Err(DecodingError::IndefiniteLength("byte strings")),
        _ => Err(DecodingError::UnexpectedType { field, expected: "bstr" }),
    }
}

/// `bstr / nil`, where nil marks detached content.
pub(crate) fn read_bstr_or_nil(dec: &mut Decoder<'_>, field: &'static str) -> Result<Option<Vec<u8>>, DecodingError> {
    match dec.datatype().map_err(DecodingError::cbor)? {
        Type::Null => {
            dec.null().map_err(DecodingError::cbor)?;
            Ok(None)
        }
        Type::Bytes => Ok(Some(dec.bytes().map_err(DecodingError::cbor)?.to_vec())),
        Type::BytesIndef => Err(DecodingError::IndefiniteLength("byte strings")),
        _ => Err(DecodingError::UnexpectedType {
            field,
            expected: "bstr or nil",
        }),
    }
}

/// Protected header bstr followed by the unprotected header map.
pub(crate) fn read_headers(dec: &mut Decoder<'_>) -> Result<(ProtectedHeader, CoseHeaderMap), CoseError> {
    let protected = ProtectedHeader::from_bytes(read_bstr(dec, "protected header")?)?;
    let unprotected = decode_header_map(dec)?;
    Ok((protected, unprotected))
}

pub(crate) fn write_headers(
    enc: &mut Encoder<Vec<u8>>,
    protected: &ProtectedHeader,
    unprotected: &CoseHeaderMap,
) -> Result<(), CoseError> {
    enc.bytes(protected.encoded_map_cbor()).map_err(CoseError::encoding)?;
    write_header_map(enc, unprotected)
}

pub(crate) fn write_bstr_or_nil(enc: &mut Encoder<Vec<u8>>, value: Option<&[u8]>) -> Result<(), CoseError> {
    let written = match value {
        Some(bytes) => enc.bytes(bytes),
        None => enc.null(),
    };
    written.map_err(CoseError::encoding)?;
    Ok(())
}
