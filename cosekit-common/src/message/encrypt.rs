// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Encrypt: `[protected, unprotected, ciphertext / nil, [+ COSE_recipient]]`.

use cosekit_abstractions::iana::tag;
use cosekit_abstractions::{BuilderError, CoseError, CoseHeaderMap};
use minicbor::{Decoder, Encoder};

use super::recipient::{check_nesting, decode_recipient_list, encode_recipient_list, CoseRecipient};
use super::{
    expect_array_len, read_bstr_or_nil, read_headers, write_bstr_or_nil, write_headers, ContentInput, CoseStructure,
    ProtectedInput,
};
use crate::header_map::ProtectedHeader;
use crate::structures::{AadContext, AadStructure};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoseEncrypt {
    protected: ProtectedHeader,
    unprotected: CoseHeaderMap,
    ciphertext: Option<Vec<u8>>,
    recipients: Vec<CoseRecipient>,
}

impl CoseEncrypt {
    pub fn builder() -> CoseEncryptBuilder {
        CoseEncryptBuilder::default()
    }

    pub fn protected(&self) -> &ProtectedHeader {
        &self.protected
    }

    pub fn unprotected(&self) -> &CoseHeaderMap {
        &self.unprotected
    }

    pub fn ciphertext(&self) -> Option<&[u8]> {
        self.ciphertext.as_deref()
    }

    pub fn recipients(&self) -> &[CoseRecipient] {
        &self.recipients
    }

    /// `Enc_structure` for context `Encrypt`.
    pub fn enc_structure(&self, external_aad: &[u8]) -> Result<Vec<u8>, CoseError> {
        AadStructure::encryption(AadContext::Encrypt, self.protected.encoded_map_cbor(), external_aad).encode()
    }
}

impl CoseStructure for CoseEncrypt {
    const NAME: &'static str = "COSE_Encrypt";
    const TAG: Option<u64> = Some(tag::COSE_ENCRYPT);

    fn encode_cbor(&self, enc: &mut Encoder<Vec<u8>>) -> Result<(), CoseError> {
        enc.array(4).map_err(CoseError::encoding)?;
        write_headers(enc, &self.protected, &self.unprotected)?;
        write_bstr_or_nil(enc, self.ciphertext.as_deref())?;
        encode_recipient_list(enc, &self.recipients)
    }

    fn decode_cbor(dec: &mut Decoder<'_>, max_depth: usize) -> Result<Self, CoseError> {
        expect_array_len(dec, Self::NAME, 4, "4")?;
        let (protected, unprotected) = read_headers(dec)?;
        let ciphertext = read_bstr_or_nil(dec, "ciphertext")?;
        let recipients = decode_recipient_list(dec, 1, max_depth)?;
        Ok(Self {
            protected,
            unprotected,
            ciphertext,
            recipients,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoseEncryptBuilder {
    protected: ProtectedInput,
    unprotected: CoseHeaderMap,
    ciphertext: ContentInput,
    recipients: Vec<CoseRecipient>,
}

impl CoseEncryptBuilder {
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

    pub fn add_recipient(mut self, recipient: CoseRecipient) -> Self {
        self.recipients.push(recipient);
        self
    }

    pub fn recipients(mut self, recipients: Vec<CoseRecipient>) -> Self {
        self.recipients = recipients;
        self
    }

    pub fn build(self) -> Result<CoseEncrypt, CoseError> {
        let ciphertext = self.ciphertext.resolve("ciphertext")?;
        if self.recipients.is_empty() {
            return Err(BuilderError::MissingField("recipients").into());
        }
        check_nesting(&self.recipients, 0)?;
        Ok(CoseEncrypt {
            protected: self.protected.resolve()?,
            unprotected: self.unprotected,
            ciphertext,
            recipients: self.recipients,
        })
    }
}
