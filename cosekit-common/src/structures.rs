// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Authenticated-data structures (RFC 9052 §4.4, §5.3, §6.3).
//!
//! These are the exact byte sequences fed to a signature, MAC or AEAD. Only
//! serialized protected headers go in; unprotected headers are never read.

use std::fmt;

use cosekit_abstractions::{BuilderError, CoseError};
use minicbor::Encoder;

/// Context string of an authenticated-data structure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AadContext {
    Signature,
    Signature1,
    CounterSignature,
    Mac,
    Mac0,
    Encrypt,
    Encrypt0,
    EncRecipient,
    MacRecipient,
    RecRecipient,
}

impl AadContext {
    pub fn as_str(self) -> &'static str {
        match self {
            AadContext::Signature => "Signature",
            AadContext::Signature1 => "Signature1",
            AadContext::CounterSignature => "CounterSignature",
            AadContext::Mac => "MAC",
            AadContext::Mac0 => "MAC0",
            AadContext::Encrypt => "Encrypt",
            AadContext::Encrypt0 => "Encrypt0",
            AadContext::EncRecipient => "Enc_Recipient",
            AadContext::MacRecipient => "Mac_Recipient",
            AadContext::RecRecipient => "Rec_Recipient",
        }
    }

    /// Whether the structure carries a signer-protected slot.
    pub fn has_sign_protected(self) -> bool {
        matches!(self, AadContext::Signature | AadContext::CounterSignature)
    }

    /// Whether the structure ends with the payload.
    pub fn has_payload(self) -> bool {
        !matches!(
            self,
            AadContext::Encrypt
                | AadContext::Encrypt0
                | AadContext::EncRecipient
                | AadContext::MacRecipient
                | AadContext::RecRecipient
        )
    }
}

impl fmt::Display for AadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of an authenticated-data structure.
#[derive(Debug, Clone)]
pub struct AadStructure<'a> {
    pub context: AadContext,
    pub body_protected: &'a [u8],
    pub sign_protected: Option<&'a [u8]>,
    pub external_aad: &'a [u8],
    pub payload: Option<&'a [u8]>,
}

impl<'a> AadStructure<'a> {
    pub fn new(context: AadContext, body_protected: &'a [u8]) -> Self {
        Self {
            context,
            body_protected,
            sign_protected: None,
            external_aad: &[],
            payload: None,
        }
    }

    /// `["Signature1", body_protected, external_aad, payload]`
    pub fn signature1(body_protected: &'a [u8], external_aad: &'a [u8], payload: &'a [u8]) -> Self {
        Self::new(AadContext::Signature1, body_protected)
            .with_external_aad(external_aad)
            .with_payload(payload)
    }

    /// `["Signature", body_protected, sign_protected, external_aad, payload]`
    pub fn signature(
        body_protected: &'a [u8],
        sign_protected: &'a [u8],
        external_aad: &'a [u8],
        payload: &'a [u8],
    ) -> Self {
        Self::new(AadContext::Signature, body_protected)
            .with_sign_protected(sign_protected)
            .with_external_aad(external_aad)
            .with_payload(payload)
    }

    /// `[context, protected, external_aad, payload]` for `MAC` / `MAC0`.
    pub fn mac(context: AadContext, protected: &'a [u8], external_aad: &'a [u8], payload: &'a [u8]) -> Self {
        Self::new(context, protected)
            .with_external_aad(external_aad)
            .with_payload(payload)
    }

    /// `[context, protected, external_aad]` for the `Enc_structure` contexts.
    pub fn encryption(context: AadContext, protected: &'a [u8], external_aad: &'a [u8]) -> Self {
        Self::new(context, protected).with_external_aad(external_aad)
    }

    pub fn with_sign_protected(mut self, sign_protected: &'a [u8]) -> Self {
        self.sign_protected = Some(sign_protected);
        self
    }

    pub fn with_external_aad(mut self, external_aad: &'a [u8]) -> Self {
        self.external_aad = external_aad;
        self
    }

    pub fn with_payload(mut self, payload: &'a [u8]) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Serialize the structure.
    pub fn encode(&self) -> Result<Vec<u8>, CoseError> {
        let sign_protected = match (self.context.has_sign_protected(), self.sign_protected) {
            (true, Some(p)) => Some(p),
            (true, None) => return Err(BuilderError::MissingField("sign_protected").into()),
            (false, Some(_)) => return Err(BuilderError::ConflictingFields("sign_protected").into()),
            (false, None) => None,
        };
        let payload = match (self.context.has_payload(), self.payload) {
            (true, Some(p)) => Some(p),
            (true, None) => return Err(BuilderError::MissingField("payload").into()),
            (false, Some(_)) => return Err(BuilderError::ConflictingFields("payload").into()),
            (false, None) => None,
        };

        let len = 3 + u64::from(sign_protected.is_some()) + u64::from(payload.is_some());
        let capacity = 32
            + self.body_protected.len()
            + sign_protected.map_or(0, <[u8]>::len)
            + self.external_aad.len()
            + payload.map_or(0, <[u8]>::len);

        let mut enc = Encoder::new(Vec::with_capacity(capacity));
        enc.array(len).map_err(CoseError::encoding)?;
        enc.str(self.context.as_str()).map_err(CoseError::encoding)?;
        enc.bytes(self.body_protected).map_err(CoseError::encoding)?;
        if let Some(p) = sign_protected {
            enc.bytes(p).map_err(CoseError::encoding)?;
        }
        enc.bytes(self.external_aad).map_err(CoseError::encoding)?;
        if let Some(p) = payload {
            enc.bytes(p).map_err(CoseError::encoding)?;
        }
        Ok(enc.into_writer())
    }
}
