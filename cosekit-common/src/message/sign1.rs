// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Sign1: `[protected, unprotected, payload / nil, signature]`.

use cosekit_abstractions::iana::tag;
use cosekit_abstractions::{BuilderError, CoseError, CoseHeaderMap};
use minicbor::{Decoder, Encoder};

use super::{
    expect_array_len, read_bstr, read_bstr_or_nil, read_headers, resolve_content, write_bstr_or_nil, write_headers,
    ContentInput, CoseStructure, ProtectedInput,
};
use crate::header_map::ProtectedHeader;
use crate::structures::AadStructure;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoseSign1 {
    protected: ProtectedHeader,
    unprotected: CoseHeaderMap,
    payload: Option<Vec<u8>>,
    signature: Vec<u8>,
}

impl CoseSign1 {
    pub fn builder() -> CoseSign1Builder {
        CoseSign1Builder::default()
    }

    pub fn protected(&self) -> &ProtectedHeader {
        &self.protected
    }

    pub fn unprotected(&self) -> &CoseHeaderMap {
        &self.unprotected
    }

    /// Embedded payload; `None` when detached.
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// `Sig_structure` for context `Signature1`.
    pub fn tbs_data(&self, external_aad: &[u8], detached_payload: Option<&[u8]>) -> Result<Vec<u8>, CoseError> {
        let payload = resolve_content(self.payload.as_deref(), detached_payload)?;
        AadStructure::signature1(self.protected.encoded_map_cbor(), external_aad, payload).encode()
    }
}

impl CoseStructure for CoseSign1 {
    const NAME: &'static str = "COSE_Sign1";
    const TAG: Option<u64> = Some(tag::COSE_SIGN1);

    fn encode_cbor(&self, enc: &mut Encoder<Vec<u8>>) -> Result<(), CoseError> {
        enc.array(4).map_err(CoseError::encoding)?;
        write_headers(enc, &self.protected, &self.unprotected)?;
        write_bstr_or_nil(enc, self.payload.as_deref())?;
        enc.bytes(&self.signature).map_err(CoseError::encoding)?;
        Ok(())
    }

    fn decode_cbor(dec: &mut Decoder<'_>, _max_depth: usize) -> Result<Self, CoseError> {
        expect_array_len(dec, Self::NAME, 4, "4")?;
        let (protected, unprotected) = read_headers(dec)?;
        let payload = read_bstr_or_nil(dec, "payload")?;
        let signature = read_bstr(dec, "signature")?;
        Ok(Self {
            protected,
            unprotected,
            payload,
            signature,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoseSign1Builder {
    protected: ProtectedInput,
    unprotected: CoseHeaderMap,
    payload: ContentInput,
    signature: Option<Vec<u8>>,
}

impl CoseSign1Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Protected header map, serialized once at build.
    pub fn protected(mut self, header: CoseHeaderMap) -> Result<Self, BuilderError> {
        self.protected.set(ProtectedInput::Map(header))?;
        Ok(self)
    }

    /// Already-serialized protected header bytes, kept verbatim.
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

    /// Encode the payload slot as nil.
    pub fn detached_payload(mut self) -> Result<Self, BuilderError> {
        self.payload.set(ContentInput::Detached, "payload")?;
        Ok(self)
    }

    pub fn signature(mut self, signature: impl Into<Vec<u8>>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn build(self) -> Result<CoseSign1, CoseError> {
        let payload = self.payload.resolve("payload")?;
        let signature = self.signature.ok_or(BuilderError::MissingField("signature"))?;
        Ok(CoseSign1 {
            protected: self.protected.resolve()?,
            unprotected: self.unprotected,
            payload,
            signature,
        })
    }
}
