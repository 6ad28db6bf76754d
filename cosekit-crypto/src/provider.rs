// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! [`RustCryptoProvider`]: the default [`CryptoProvider`].

use cosekit_abstractions::{
    AlgorithmFamily, AlgorithmInfo, CryptoError, CryptoProvider, Curve, EcdsaSignatureFormat, GeneratedKeyPair,
    PublicKeyRef, PublicPoint,
};
use rand_core::{OsRng, RngCore};
use tracing::trace;
use zeroize::Zeroizing;

use crate::ecdsa::{p256_ops, p384_ops, p521_ops};
use crate::{aead, mac, okp};

/// Pure-Rust provider over the RustCrypto crates and `x25519-dalek` /
/// `ed25519-dalek`.
///
/// By default ECDSA signatures are exchanged in the COSE fixed-width form.
/// [`RustCryptoProvider::with_der_signatures`] switches to ASN.1 DER, which is
/// how many platform and HSM backends behave.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider {
    der_signatures: bool,
}

impl RustCryptoProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_der_signatures(mut self) -> Self {
        self.der_signatures = true;
        self
    }
}

fn unsupported_curve(curve: Curve) -> CryptoError {
    CryptoError::UnsupportedCurve(curve)
}

impl CryptoProvider for RustCryptoProvider {
    fn name(&self) -> &'static str {
        "rustcrypto"
    }

    fn ecdsa_signature_format(&self) -> EcdsaSignatureFormat {
        if self.der_signatures {
            EcdsaSignatureFormat::Der
        } else {
            EcdsaSignatureFormat::Fixed
        }
    }

    fn sign(&self, alg: &AlgorithmInfo, curve: Curve, d: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        trace!(alg = alg.name, %curve, len = data.len(), "sign");
        match (alg.family, curve) {
            (AlgorithmFamily::Ecdsa, Curve::P256) => p256_ops::sign(d, data, self.der_signatures),
            (AlgorithmFamily::Ecdsa, Curve::P384) => p384_ops::sign(d, data, self.der_signatures),
            (AlgorithmFamily::Ecdsa, Curve::P521) => p521_ops::sign(d, data, self.der_signatures),
            (AlgorithmFamily::EdDsa, Curve::Ed25519) => okp::ed25519_sign(d, data),
            (AlgorithmFamily::Ecdsa | AlgorithmFamily::EdDsa, other) => Err(unsupported_curve(other)),
            _ => Err(CryptoError::UnsupportedAlgorithm(alg.name.to_string())),
        }
    }

    fn verify(
        &self,
        alg: &AlgorithmInfo,
        public_key: PublicKeyRef<'_>,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError> {
        trace!(alg = alg.name, curve = %public_key.curve, len = data.len(), "verify");
        let PublicKeyRef { curve, x, y } = public_key;
        match (alg.family, curve) {
            (AlgorithmFamily::Ecdsa, Curve::P256) => p256_ops::verify(x, y, data, signature, self.der_signatures),
            (AlgorithmFamily::Ecdsa, Curve::P384) => p384_ops::verify(x, y, data, signature, self.der_signatures),
            (AlgorithmFamily::Ecdsa, Curve::P521) => p521_ops::verify(x, y, data, signature, self.der_signatures),
            (AlgorithmFamily::EdDsa, Curve::Ed25519) => okp::ed25519_verify(x, data, signature),
            (AlgorithmFamily::Ecdsa | AlgorithmFamily::EdDsa, other) => Err(unsupported_curve(other)),
            _ => Err(CryptoError::UnsupportedAlgorithm(alg.name.to_string())),
        }
    }

    fn mac(&self, alg: &AlgorithmInfo, key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        trace!(alg = alg.name, len = data.len(), "mac");
        mac::compute(alg, key, data)
    }

    fn mac_verify(&self, alg: &AlgorithmInfo, key: &[u8], data: &[u8], tag: &[u8]) -> Result<(), CryptoError> {
        trace!(alg = alg.name, len = data.len(), "mac_verify");
        mac::verify(alg, key, data, tag)
    }

    fn aead_seal(
        &self,
        alg: &AlgorithmInfo,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        trace!(alg = alg.name, len = plaintext.len(), "aead_seal");
        aead::seal(alg, key, iv, aad, plaintext)
    }

    fn aead_open(
        &self,
        alg: &AlgorithmInfo,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        trace!(alg = alg.name, len = ciphertext.len(), "aead_open");
        aead::open(alg, key, iv, aad, ciphertext)
    }

    fn key_agreement(&self, d: &[u8], peer: PublicKeyRef<'_>) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        trace!(curve = %peer.curve, "key_agreement");
        match peer.curve {
            Curve::P256 => p256_ops::agree(d, peer.x, peer.y),
            Curve::P384 => p384_ops::agree(d, peer.x, peer.y),
            Curve::P521 => p521_ops::agree(d, peer.x, peer.y),
            Curve::X25519 => okp::x25519_agree(d, peer.x),
            other => Err(unsupported_curve(other)),
        }
    }

    fn generate_key_pair(&self, curve: Curve) -> Result<GeneratedKeyPair, CryptoError> {
        trace!(%curve, "generate_key_pair");
        match curve {
            Curve::P256 => p256_ops::generate(),
            Curve::P384 => p384_ops::generate(),
            Curve::P521 => p521_ops::generate(),
            Curve::Ed25519 => Ok(okp::ed25519_generate()),
            Curve::X25519 => Ok(okp::x25519_generate()),
            other => Err(unsupported_curve(other)),
        }
    }

    fn derive_public_key(&self, curve: Curve, d: &[u8]) -> Result<PublicPoint, CryptoError> {
        match curve {
            Curve::P256 => p256_ops::derive_public(d),
            Curve::P384 => p384_ops::derive_public(d),
            Curve::P521 => p521_ops::derive_public(d),
            Curve::Ed25519 => okp::ed25519_derive_public(d),
            Curve::X25519 => okp::x25519_derive_public(d),
            other => Err(unsupported_curve(other)),
        }
    }

    fn random_bytes(&self, len: usize) -> Result<Vec<u8>, CryptoError> {
        let mut bytes = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::Provider(format!("OS random number generator failed: {e}")))?;
        Ok(bytes)
    }
}
