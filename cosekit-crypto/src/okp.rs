// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Octet key pair curves: Ed25519 signatures and X25519 key agreement.
//!
//! Ed448 and X448 have no implementation in this provider and are reported as
//! unsupported.

use cosekit_abstractions::{CryptoError, GeneratedKeyPair, PublicPoint};
use ed25519_dalek::{Signer, Verifier};
use rand_core::OsRng;
use zeroize::Zeroizing;

fn array32(bytes: &[u8], what: &str) -> Result<[u8; 32], CryptoError> {
    bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidKey(format!("{what} must be 32 bytes, got {}", bytes.len())))
}

pub(crate) fn ed25519_sign(d: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let key = ed25519_dalek::SigningKey::from_bytes(&array32(d, "Ed25519 private key")?);
    let signature = key
        .try_sign(data)
        .map_err(|e| CryptoError::Provider(format!("Ed25519 signing failed: {e}")))?;
    Ok(signature.to_bytes().to_vec())
}

pub(crate) fn ed25519_verify(x: &[u8], data: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
    let key = ed25519_dalek::VerifyingKey::from_bytes(&array32(x, "Ed25519 public key")?)
        .map_err(|e| CryptoError::InvalidKey(format!("bad Ed25519 public key: {e}")))?;
    let signature = ed25519_dalek::Signature::from_slice(signature)
        .map_err(|e| CryptoError::InvalidSignature(format!("bad Ed25519 signature: {e}")))?;
    key.verify(data, &signature).map_err(|_| CryptoError::VerificationFailed)
}

pub(crate) fn ed25519_derive_public(d: &[u8]) -> Result<PublicPoint, CryptoError> {
    let key = ed25519_dalek::SigningKey::from_bytes(&array32(d, "Ed25519 private key")?);
    Ok(PublicPoint {
        x: key.verifying_key().to_bytes().to_vec(),
        y: None,
    })
}

pub(crate) fn ed25519_generate() -> GeneratedKeyPair {
    let key = ed25519_dalek::SigningKey::generate(&mut OsRng);
    GeneratedKeyPair {
        d: Zeroizing::new(key.to_bytes().to_vec()),
        public: PublicPoint {
            x: key.verifying_key().to_bytes().to_vec(),
            y: None,
        },
    }
}

pub(crate) fn x25519_derive_public(d: &[u8]) -> Result<PublicPoint, CryptoError> {
    let secret = x25519_dalek::StaticSecret::from(array32(d, "X25519 private key")?);
    Ok(PublicPoint {
        x: x25519_dalek::PublicKey::from(&secret).as_bytes().to_vec(),
        y: None,
    })
}

pub(crate) fn x25519_generate() -> GeneratedKeyPair {
    let secret = x25519_dalek::StaticSecret::random_from_rng(OsRng);
    let public = x25519_dalek::PublicKey::from(&secret);
    GeneratedKeyPair {
        d: Zeroizing::new(secret.to_bytes().to_vec()),
        public: PublicPoint {
            x: public.as_bytes().to_vec(),
            y: None,
        },
    }
}

pub(crate) fn x25519_agree(d: &[u8], x: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let secret = x25519_dalek::StaticSecret::from(array32(d, "X25519 private key")?);
    let peer = x25519_dalek::PublicKey::from(array32(x, "X25519 public key")?);
    let shared = secret.diffie_hellman(&peer);
    if !shared.was_contributory() {
        return Err(CryptoError::InvalidKey("X25519 peer key is a low-order point".to_string()));
    }
    Ok(Zeroizing::new(shared.as_bytes().to_vec()))
}
