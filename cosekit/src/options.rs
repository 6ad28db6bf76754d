// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use cosekit_abstractions::CoseAlgorithm;

/// Per-call options shared by every orchestration entry point.
#[derive(Debug, Default, Clone)]
pub struct CoseOptions {
    /// Pin the algorithm. Must agree with any `alg` header present.
    pub algorithm: Option<CoseAlgorithm>,
    /// Externally supplied authenticated data; empty when unset.
    pub external_aad: Vec<u8>,
    /// Explicit AEAD nonce. Must agree with any IV or Partial IV header present.
    pub iv: Option<Vec<u8>>,
    /// Content carried outside the message.
    ///
    /// On generation, supplying this instead of an embedded payload (or
    /// plaintext) produces a message with a nil content slot. On verification
    /// and decryption it supplies the content the message left out.
    pub detached_content: Option<Vec<u8>>,
}

impl CoseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(mut self, algorithm: CoseAlgorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn with_external_aad(mut self, external_aad: impl Into<Vec<u8>>) -> Self {
        self.external_aad = external_aad.into();
        self
    }

    pub fn with_iv(mut self, iv: impl Into<Vec<u8>>) -> Self {
        self.iv = Some(iv.into());
        self
    }

    pub fn with_detached_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.detached_content = Some(content.into());
        self
    }

    pub(crate) fn detached(&self) -> Option<&[u8]> {
        self.detached_content.as_deref()
    }
}
