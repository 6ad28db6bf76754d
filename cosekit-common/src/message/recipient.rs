// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_recipient: `[protected, unprotected, ciphertext, ? [+ COSE_recipient]]`.
//!
//! Recipients nest. Input is attacker-influenced, so decoding bounds the depth
//! (see [`MAX_RECIPIENT_DEPTH`]). Builders apply the same bound so anything
//! they produce decodes again.

use cosekit_abstractions::{BuilderError, CoseAlgorithm, CoseError, CoseHeaderMap, DecodingError};
use minicbor::{Decoder, Encoder};
use tracing::debug;

use super::{
    read_array_len, read_bstr, read_headers, write_headers, CoseStructure, ProtectedInput, MAX_RECIPIENT_DEPTH,
};
use crate::header_map::ProtectedHeader;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoseRecipient {
    protected: ProtectedHeader,
    unprotected: CoseHeaderMap,
    ciphertext: Vec<u8>,
    recipients: Vec<CoseRecipient>,
}

impl CoseRecipient {
    pub fn builder() -> CoseRecipientBuilder {
        CoseRecipientBuilder::default()
    }

    /// Direct use of a shared key: empty protected header and ciphertext,
    /// unprotected `{alg: direct, kid}`.
    pub fn direct(kid: impl Into<Vec<u8>>) -> Self {
        Self {
            protected: ProtectedHeader::default(),
            unprotected: CoseHeaderMap::new()
                .with_algorithm(CoseAlgorithm::Direct)
                .with_key_id(kid),
            ciphertext: Vec::new(),
            recipients: Vec::new(),
        }
    }

    pub fn protected(&self) -> &ProtectedHeader {
        &self.protected
    }

    pub fn unprotected(&self) -> &CoseHeaderMap {
        &self.unprotected
    }

    /// Wrapped key; empty for direct and key-agreement-only recipients.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn recipients(&self) -> &[CoseRecipient] {
        &self.recipients
    }

    /// Levels of nesting, counting this recipient.
    pub fn depth(&self) -> usize {
        1 + list_depth(&self.recipients)
    }

    /// Key id from the protected header, falling back to the unprotected one.
    pub fn key_id(&self) -> Option<&[u8]> {
        self.protected.header().key_id().or_else(|| self.unprotected.key_id())
    }

    /// Algorithm from the protected header, falling back to the unprotected one.
    pub fn algorithm(&self) -> Option<i64> {
        self.protected
            .header()
            .algorithm()
            .or_else(|| self.unprotected.algorithm())
    }

    fn decode_at_depth(dec: &mut Decoder<'_>, depth: usize, max_depth: usize) -> Result<Self, CoseError> {
        if depth > max_depth {
            return Err(DecodingError::NestingTooDeep {
                structure: Self::NAME,
                max: max_depth,
            }
            .into());
        }

        let len = read_array_len(dec, Self::NAME)?;
        if len != 3 && len != 4 {
            return Err(DecodingError::ArrayLength {
                structure: Self::NAME,
                expected: "3 or 4",
                actual: len,
            }
            .into());
        }

        let (protected, unprotected) = read_headers(dec)?;
        let ciphertext = read_bstr(dec, "ciphertext")?;
        let recipients = if len == 4 {
            decode_recipient_list(dec, depth + 1, max_depth)?
        } else {
            Vec::new()
        };

        Ok(Self {
            protected,
            unprotected,
            ciphertext,
            recipients,
        })
    }
}

impl CoseStructure for CoseRecipient {
    const NAME: &'static str = "COSE_recipient";
    const TAG: Option<u64> = None;

    fn encode_cbor(&self, enc: &mut Encoder<Vec<u8>>) -> Result<(), CoseError> {
        let len = if self.recipients.is_empty() { 3 } else { 4 };
        enc.array(len).map_err(CoseError::encoding)?;
        write_headers(enc, &self.protected, &self.unprotected)?;
        enc.bytes(&self.ciphertext).map_err(CoseError::encoding)?;
        if !self.recipients.is_empty() {
            encode_recipient_list(enc, &self.recipients)?;
        }
        Ok(())
    }

    fn decode_cbor(dec: &mut Decoder<'_>, max_depth: usize) -> Result<Self, CoseError> {
        Self::decode_at_depth(dec, 1, max_depth)
    }
}

fn list_depth(recipients: &[CoseRecipient]) -> usize {
    recipients.iter().map(CoseRecipient::depth).max().unwrap_or(0)
}

/// Fails when `recipients`, placed `level` levels down, would exceed
/// [`MAX_RECIPIENT_DEPTH`].
pub(crate) fn check_nesting(recipients: &[CoseRecipient], level: usize) -> Result<(), BuilderError> {
    if level + list_depth(recipients) > MAX_RECIPIENT_DEPTH {
        return Err(BuilderError::RecipientsTooDeep {
            max: MAX_RECIPIENT_DEPTH,
        });
    }
    Ok(())
}

/// `[+ COSE_recipient]` whose elements sit at nesting level `depth`.
pub(crate) fn decode_recipient_list(
    dec: &mut Decoder<'_>,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<CoseRecipient>, CoseError> {
    let count = read_array_len(dec, "recipients")?;
    if count == 0 {
        return Err(DecodingError::ArrayLength {
            structure: "recipients",
            expected: "at least 1",
            actual: 0,
        }
        .into());
    }
    debug!(count, depth, "decoding recipients");

    let mut recipients = Vec::new();
    for _ in 0..count {
        recipients.push(CoseRecipient::decode_at_depth(dec, depth, max_depth)?);
    }
    Ok(recipients)
}

pub(crate) fn encode_recipient_list(enc: &mut Encoder<Vec<u8>>, recipients: &[CoseRecipient]) -> Result<(), CoseError> {
    enc.array(recipients.len() as u64).map_err(CoseError::encoding)?;
    for recipient in recipients {
        recipient.encode_cbor(enc)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct CoseRecipientBuilder {
    protected: ProtectedInput,
    unprotected: CoseHeaderMap,
    ciphertext: Option<Vec<u8>>,
    recipients: Vec<CoseRecipient>,
}

impl CoseRecipientBuilder {
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

    pub fn ciphertext(mut self, ciphertext: impl Into<Vec<u8>>) -> Self {
        self.ciphertext = Some(ciphertext.into());
        self
    }

    pub fn add_recipient(mut self, recipient: CoseRecipient) -> Self {
        self.recipients.push(recipient);
        self
    }

    pub fn build(self) -> Result<CoseRecipient, CoseError> {
        let ciphertext = self.ciphertext.ok_or(BuilderError::MissingField("ciphertext"))?;
        check_nesting(&self.recipients, 1)?;
        Ok(CoseRecipient {
            protected: self.protected.resolve()?,
            unprotected: self.unprotected,
            ciphertext,
            recipients: self.recipients,
        })
    }
}
