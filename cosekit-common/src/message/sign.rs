// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Sign: `[protected, unprotected, payload / nil, [+ COSE_Signature]]`
//! and COSE_Signature: `[protected, unprotected, signature]`.

use cosekit_abstractions::iana::tag;
use cosekit_abstractions::{BuilderError, CoseError, CoseHeaderMap, DecodingError};
use minicbor::{Decoder, Encoder};

use super::{
    expect_array_len, read_array_len, read_bstr, read_bstr_or_nil, read_headers, resolve_content, write_bstr_or_nil,
    write_headers, ContentInput, CoseStructure, ProtectedInput,
};
use crate::header_map::ProtectedHeader;
use crate::structures::AadStructure;

/// One signer's contribution to a COSE_Sign.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoseSignature {
    protected: ProtectedHeader,
    unprotected: CoseHeaderMap,
    signature: Vec<u8>,
}

impl CoseSignature {
    pub fn builder() -> CoseSignatureBuilder {
        CoseSignatureBuilder::default()
    }

    pub fn protected(&self) -> &ProtectedHeader {
        &self.protected
    }

    pub fn unprotected(&self) -> &CoseHeaderMap {
        &self.unprotected
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

impl CoseStructure for CoseSignature {
    const NAME: &'static str = "COSE_Signature";
    const TAG: Option<u64> = None;

    fn encode_cbor(&self, enc: &mut Encoder<Vec<u8>>) -> Result<(), CoseError> {
        enc.array(3).map_err(CoseError::encoding)?;
        write_headers(enc, &self.protected, &self.unprotected)?;
        enc.bytes(&self.signature).map_err(CoseError::encoding)?;
        Ok(())
    }

    fn decode_cbor(dec: &mut Decoder<'_>, _max_depth: usize) -> Result<Self, CoseError> {
        expect_array_len(dec, Self::NAME, 3, "3")?;
        let (protected, unprotected) = read_headers(dec)?;
        let signature = read_bstr(dec, "signature")?;
        Ok(Self {
            protected,
            unprotected,
            signature,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoseSignatureBuilder {
    protected: ProtectedInput,
    unprotected: CoseHeaderMap,
    signature: Option<Vec<u8>>,
}

impl CoseSignatureBuilder {
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

    pub fn signature(mut self, signature: impl Into<Vec<u8>>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn build(self) -> Result<CoseSignature, CoseError> {
        let signature = self.signature.ok_or(BuilderError::MissingField("signature"))?;
        Ok(CoseSignature {
            protected: self.protected.resolve()?,
            unprotected: self.unprotected,
            signature,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoseSign {
    protected: ProtectedHeader,
    unprotected: CoseHeaderMap,
    payload: Option<Vec<u8>>,
    signatures: Vec<CoseSignature>,
}

impl CoseSign {
    pub fn builder() -> CoseSignBuilder {
        CoseSignBuilder::default()
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

    pub fn signatures(&self) -> &[CoseSignature] {
        &self.signatures
    }

    /// `Sig_structure` for context `Signature`, using the body headers and
    /// `signature`'s protected headers.
    pub fn tbs_data(
        &self,
        signature: &CoseSignature,
        external_aad: &[u8],
        detached_payload: Option<&[u8]>,
    ) -> Result<Vec<u8>, CoseError> {
        let payload = resolve_content(self.payload.as_deref(), detached_payload)?;
        AadStructure::signature(
            self.protected.encoded_map_cbor(),
            signature.protected.encoded_map_cbor(),
            external_aad,
            payload,
        )
        .encode()
    }
}

impl CoseStructure for CoseSign {
    const NAME: &'static str = "COSE_Sign";
    const TAG: Option<u64> = Some(tag::COSE_SIGN);

    fn encode_cbor(&self, enc: &mut Encoder<Vec<u8>>) -> Result<(), CoseError> {
        enc.array(4).map_err(CoseError::encoding)?;
        write_headers(enc, &self.protected, &self.unprotected)?;
        write_bstr_or_nil(enc, self.payload.as_deref())?;
        enc.array(self.signatures.len() as u64).map_err(CoseError::encoding)?;
        for signature in &self.signatures {
            signature.encode_cbor(enc)?;
        }
        Ok(())
    }

    fn decode_cbor(dec: &mut Decoder<'_>, max_depth: usize) -> Result<Self, CoseError> {
        expect_array_len(dec, Self::NAME, 4, "4")?;
        let (protected, unprotected) = read_headers(dec)?;
        let payload = read_bstr_or_nil(dec, "payload")?;

        let count = read_array_len(dec, "signatures")?;
        if count == 0 {
            return Err(DecodingError::ArrayLength {
                structure: "COSE_Sign signatures",
                expected: "at least 1",
                actual: 0,
            }
            .into());
        }
        let mut signatures = Vec::new();
        for _ in 0..count {
            signatures.push(CoseSignature::decode_cbor(dec, max_depth)?);
        }

        Ok(Self {
            protected,
            unprotected,
            payload,
            signatures,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoseSignBuilder {
    protected: ProtectedInput,
    unprotected: CoseHeaderMap,
    payload: ContentInput,
    signatures: Vec<CoseSignature>,
}

impl CoseSignBuilder {
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

    pub fn add_signature(mut self, signature: CoseSignature) -> Self {
        self.signatures.push(signature);
        self
    }

    pub fn build(self) -> Result<CoseSign, CoseError> {
        let payload = self.payload.resolve("payload")?;
        if self.signatures.is_empty() {
            return Err(BuilderError::MissingField("signatures").into());
        }
        Ok(CoseSign {
            protected: self.protected.resolve()?,
            unprotected: self.unprotected,
            payload,
            signatures: self.signatures,
        })
    }
}
