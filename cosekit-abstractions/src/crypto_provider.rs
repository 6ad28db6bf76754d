// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cryptography provider interface.
//!
//! Message and key code never touches a primitive directly. Every signature,
//! MAC, AEAD, key agreement and random draw goes through a [`CryptoProvider`],
//! so callers can substitute their own backend (HSM, platform crypto, test
//! doubles).
//!
//! Contract:
//! - Inputs are raw key material as carried in a COSE_Key (`d`, `x`, `y`, `k`).
//! - `verify` / `mac_verify` return `Err(CryptoError::VerificationFailed)` for a
//!   well-formed but wrong signature or tag.
//! - `aead_open` returns `Err(CryptoError::DecryptionFailed)` on authentication
//!   failure and never releases unauthenticated plaintext.

use zeroize::Zeroizing;

use crate::algorithms::AlgorithmInfo;
use crate::error::CryptoError;
use crate::iana::Curve;

/// Wire format of ECDSA signatures produced and consumed by a provider.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum EcdsaSignatureFormat {
    /// Fixed-width `r || s`, the COSE wire format.
    #[default]
    Fixed,
    /// ASN.1 DER `SEQUENCE { INTEGER r, INTEGER s }`.
    Der,
}

/// Borrowed public key material.
///
/// `y` is present for EC2 curves and absent for OKP curves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PublicKeyRef<'a> {
    pub curve: Curve,
    pub x: &'a [u8],
    pub y: Option<&'a [u8]>,
}

/// Owned public point returned by derivation and generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicPoint {
    pub x: Vec<u8>,
    pub y: Option<Vec<u8>>,
}

impl PublicPoint {
    pub fn as_key_ref(&self, curve: Curve) -> PublicKeyRef<'_> {
        PublicKeyRef {
            curve,
            x: &self.x,
            y: self.y.as_deref(),
        }
    }
}

/// A freshly generated asymmetric key pair.
pub struct GeneratedKeyPair {
    pub d: Zeroizing<Vec<u8>>,
    pub public: PublicPoint,
}

impl std::fmt::Debug for GeneratedKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedKeyPair")
            .field("d", &"<redacted>")
            .field("public", &self.public)
            .finish()
    }
}

pub trait CryptoProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Format of ECDSA signatures returned by [`CryptoProvider::sign`] and
    /// expected by [`CryptoProvider::verify`].
    fn ecdsa_signature_format(&self) -> EcdsaSignatureFormat {
        EcdsaSignatureFormat::Fixed
    }

    fn sign(&self, alg: &AlgorithmInfo, curve: Curve, d: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError>;

    fn verify(
        &self,
        alg: &AlgorithmInfo,
        public_key: PublicKeyRef<'_>,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError>;

    /// Compute a (possibly truncated) MAC tag.
    fn mac(&self, alg: &AlgorithmInfo, key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Constant-time tag check.
    fn mac_verify(&self, alg: &AlgorithmInfo, key: &[u8], data: &[u8], tag: &[u8]) -> Result<(), CryptoError>;

    /// Returns ciphertext with the authentication tag appended.
    fn aead_seal(
        &self,
        alg: &AlgorithmInfo,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    fn aead_open(
        &self,
        alg: &AlgorithmInfo,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// Raw (EC)DH shared secret between `d` and `peer` on `peer.curve`.
    fn key_agreement(&self, d: &[u8], peer: PublicKeyRef<'_>) -> Result<Zeroizing<Vec<u8>>, CryptoError>;

    fn generate_key_pair(&self, curve: Curve) -> Result<GeneratedKeyPair, CryptoError>;

    fn derive_public_key(&self, curve: Curve, d: &[u8]) -> Result<PublicPoint, CryptoError>;

    fn random_bytes(&self, len: usize) -> Result<Vec<u8>, CryptoError>;
}
