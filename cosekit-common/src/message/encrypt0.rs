// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Encrypt0: `[protected, unprotected, ciphertext / nil]`.

use cosekit_abstractions::iana::tag;
use cosekit_abstractions::{BuilderError, CoseError, CoseHeaderMap};
use minicbor::{Decoder, Encoder};

use super::{
    expect_array_len, read_bstr_or_nil, read_headers, write_bstr_or_nil, write_headers, ContentInput, CoseStructure,
    ProtectedInput,
};
use crate::header_map::ProtectedHeader;
use crate::structures::{AadContext, AadStructure};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoseEncrypt0 {
    protected: ProtectedHeader,
    unprotected: CoseHeaderMap,
    ciphertext: Option<Vec<u8>>,
}

impl CoseEncrypt0 {
    pub fn builder() -> CoseEncrypt0Builder {
        CoseEncrypt0Builder::default()
    }

    pub fn protected(&self) -> &ProtectedHeader {
        &self.protected
    }

    pub fn unprotected(&self) -> &CoseHeaderMap {
        &self.unprotected
    }

    /// Embedded ciphertext (with AEAD tag); `None` when detached.
    pub fn ciphertext(&self) -> Option<&[u8]> {
        self.ciphertext.as_deref()
    }

    /// `Enc_structure` for context `Encrypt0`, the AEAD associated data.
    pub fn enc_structure(&self, external_aad: &[u8]) -> Result<Vec<u8>, CoseError> {
        AadStructure::encryption(AadContext::Encrypt0, self.protected.encoded_map_cbor(), external_aad).encode()
    }
}

impl CoseStructure for CoseEncrypt0 {
    const NAME: &'static str = "COSE_Encrypt0";
    const TAG: Option<u64> = Some(tag::COSE_ENCRYPT0);

    fn encode_cbor(&self, enc: &mut Encoder<Vec<u8>>) -> Result<(), CoseError> {
        enc.array(3).map_err(CoseError::encoding)?;
        write_headers(enc, &self.protected, &self.unprotected)?;
        write_bstr_or_nil(enc, self.ciphertext.as_deref())
    }

    fn decode_cbor(dec: &mut Decoder<'_>, _max_depth: usize) -> Result<Self, CoseError> {
        expect_array_len(dec, Self::NAME, 3, "3")?;
        let (protected, unprotected) = read_headers(dec)?;
        let ciphertext = read_bstr_or_nil(dec, "ciphertext")?;
        Ok(Self {
            protected,
            unprotected,
            ciphertext,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoseEncrypt0Builder {
    protected: ProtectedInput,
    unprotected: CoseHeaderMap,
    ciphertext: ContentInput,
}

impl CoseEncrypt0Builder {
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

    pub fn ciphertext(mut self, ciphertext: impl Into<Vec<u8>>) -> Result<Self, BuilderError> {
        self.ciphertext.set(ContentInput::Embedded(ciphertext.into()), "ciphertext")?;
        Ok(self)
    }

    pub fn detached_ciphertext(mut self) -> Result<Self, BuilderError> {
        self.ciphertext.set(ContentInput::Detached, "ciphertext")?;
        Ok(self)
    }

    pub fn build(self) -> Result<CoseEncrypt0, CoseError> {
        let ciphertext = self.ciphertext.resolve("ciphertext")?;
        Ok(CoseEncrypt0 {
            protected: self.protected.resolve()?,
            unprotected: self.unprotected,
            ciphertext,
        })
    }
}
