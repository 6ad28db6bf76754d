// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Mac: `[protected, unprotected, payload / nil, tag, [+ COSE_recipient]]`.

use cosekit_abstractions::iana::tag;
use cosekit_abstractions::{BuilderError, CoseError, CoseHeaderMap};
use minicbor::{Decoder, Encoder};

use super::recipient::{check_nesting, decode_recipient_list, encode_recipient_list, CoseRecipient};
use super::{
    expect_array_len, read_bstr, read_bstr_or_nil, read_headers, resolve_content, write_bstr_or_nil, write_headers,
    ContentInput, CoseStructure, ProtectedInput,
};
use crate::header_map::ProtectedHeader;
use crate::structures::{AadContext, AadStructure};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoseMac {
    protected: ProtectedHeader,
    unprotected: CoseHeaderMap,
    payload: Option<Vec<u8>>,
    tag: Vec<u8>,
    recipients: Vec<CoseRecipient>,
}

impl CoseMac {
    pub fn builder() -> CoseMacBuilder {
        CoseMacBuilder::default()
    }

    pub fn protected(&self) -> &ProtectedHeader {
        &self.protected
    }

    pub fn unprotected(&self) -> &CoseHeaderMap {
        &self.unprotected
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    pub fn recipients(&self) -> &[CoseRecipient] {
        &self.recipients
    }

    /// `MAC_structure` for context `MAC`.
    pub fn mac_structure(&self, external_aad: &[u8], detached_payload: Option<&[u8]>) -> Result<Vec<u8>, CoseError> {
        let payload = resolve_content(self.payload.as_deref(), detached_payload)?;
        AadStructure::mac(AadContext::Mac, self.protected.encoded_map_cbor(), external_aad, payload).encode()
    }
}

impl CoseStructure for CoseMac {
    const NAME: &'static str = "COSE_Mac";
    const TAG: Option<u64> = Some(tag::COSE_MAC);

    fn encode_cbor(&self, enc: &mut Encoder<Vec<u8>>) -> Result<(), CoseError> {
        enc.array(5).map_err(CoseError::encoding)?;
        write_headers(enc, &self.protected, &self.unprotected)?;
        write_bstr_or_nil(enc, self.payload.as_deref())?;
        enc.bytes(&self.tag).map_err(CoseError::encoding)?;
        encode_recipient_list(enc, &self.recipients)
    }

    fn decode_cbor(dec: &mut Decoder<'_>, max_depth: usize) -> Result<Self, CoseError> {
        expect_array_len(dec, Self::NAME, 5, "5")?;
        let (protected, unprotected) = read_headers(dec)?;
        let payload = read_bstr_or_nil(dec, "payload")?;
        let tag = read_bstr(dec, "tag")?;
        let recipients = decode_recipient_list(dec, 1, max_depth)?;
        Ok(Self {
            protected,
            unprotected,
            payload,
            tag,
            recipients,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoseMacBuilder {
    protected: ProtectedInput,
    unprotected: CoseHeaderMap,
    payload: ContentInput,
    tag: Option<Vec<u8>>,
    recipients: Vec<CoseRecipient>,
}

impl CoseMacBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protected(mut self, header: CoseHeaderMap) -> Result<Self, BuilderError> {
        self.protected.set(ProtectedInput::Map(header))?;
        Ok(self)
    }

    pub fn protected_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Result<Self, BuilderError> {
        self.protected.set(ProtectedInput::Bytes(bytes.into()))?;
        Ok(self)
    }

    pub fn unprotected(mut self, header: CoseHeaderMap) -> Self {
        self.unprotected = header;
        self
    }

    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Result<Self, BuilderError> {
        self.payload.set(ContentInput::Embedded(payload.into()), "payload")?;
        Ok(self)
    }

    pub fn detached_payload(mut self) -> Result<Self, BuilderError> {
        self.payload.set(ContentInput::Detached, "payload")?;
        Ok(self)
    }

    pub fn tag(mut self, tag: impl Into<Vec<u8>>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn add_recipient(mut self, recipient: CoseRecipient) -> Self {
        self.recipients.push(recipient);
        self
    }

    pub fn recipients(mut self, recipients: Vec<CoseRecipient>) -> Self {
        self.recipients = recipients;
        self
    }

    pub fn build(self) -> Result<CoseMac, CoseError> {
        let payload = self.payload.resolve("payload")?;
        let tag = self.tag.ok_or(BuilderError::MissingField("tag"))?;
        if self.recipients.is_empty() {
            return Err(BuilderError::MissingField("recipients").into());
        }
        check_nesting(&self.recipients, 0)?;
        Ok(CoseMac {
            protected: self.protected.resolve()?,
            unprotected: self.unprotected,
            payload,
            tag,
            recipients: self.recipients,
        })
    }
}
