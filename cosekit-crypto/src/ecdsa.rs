// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! NIST P-curve operations: ECDSA, ECDH, key derivation and generation.
//!
//! Each curve gets an identical module generated by `nist_curve!`. Public keys
//! come in as raw COSE coordinates and are assembled into an uncompressed SEC1
//! point (`0x04 || x || y`).

use cosekit_abstractions::CryptoError;

pub(crate) fn sec1_uncompressed(x: &[u8], y: Option<&[u8]>) -> Result<Vec<u8>, CryptoError> {
    let y = y.ok_or_else(|| CryptoError::InvalidKey("EC2 public key requires a y-coordinate".to_string()))?;
    let mut point = Vec::with_capacity(1 + x.len() + y.len());
    point.push(0x04);
    point.extend_from_slice(x);
    point.extend_from_slice(y);
    Ok(point)
}

macro_rules! nist_curve {
    ($module:ident, $curve:ident, $name:literal) => {
        pub(crate) mod $module {
            use cosekit_abstractions::{CryptoError, GeneratedKeyPair, PublicPoint};
            use rand_core::OsRng;
            use signature::{Signer, Verifier};
            use zeroize::Zeroizing;
            use $curve::ecdsa::{Signature, SigningKey, VerifyingKey};
            use $curve::elliptic_curve::sec1::ToEncodedPoint;
            use $curve::{PublicKey, SecretKey};

            use super::sec1_uncompressed;

            fn secret_key(d: &[u8]) -> Result<SecretKey, CryptoError> {
                SecretKey::from_slice(d)
                    .map_err(|e| CryptoError::InvalidKey(format!("bad {} private key: {e}", $name)))
            }

            fn public_key(x: &[u8], y: Option<&[u8]>) -> Result<PublicKey, CryptoError> {
                PublicKey::from_sec1_bytes(&sec1_uncompressed(x, y)?)
                    .map_err(|e| CryptoError::InvalidKey(format!("bad {} public key: {e}", $name)))
            }

            fn point(public: &PublicKey) -> Result<PublicPoint, CryptoError> {
                let encoded = public.to_encoded_point(false);
                match (encoded.x(), encoded.y()) {
                    (Some(x), Some(y)) => Ok(PublicPoint {
                        x: x.to_vec(),
                        y: Some(y.to_vec()),
                    }),
                    _ => Err(CryptoError::Provider(format!("{} point at infinity", $name))),
                }
            }

            pub(crate) fn sign(d: &[u8], data: &[u8], der: bool) -> Result<Vec<u8>, CryptoError> {
                let key = SigningKey::from_slice(d)
                    .map_err(|e| CryptoError::InvalidKey(format!("bad {} private key: {e}", $name)))?;
                let signature: Signature = key
                    .try_sign(data)
                    .map_err(|e| CryptoError::Provider(format!("{} signing failed: {e}", $name)))?;
                Ok(if der {
                    signature.to_der().as_bytes().to_vec()
                } else {
                    signature.to_bytes().to_vec()
                })
            }

            pub(crate) fn verify(
                x: &[u8],
                y: Option<&[u8]>,
                data: &[u8],
                signature: &[u8],
                der: bool,
            ) -> Result<(), CryptoError> {
                let key = VerifyingKey::from_sec1_bytes(&sec1_uncompressed(x, y)?)
                    .map_err(|e| CryptoError::InvalidKey(format!("bad {} public key: {e}", $name)))?;
                let signature = if der {
                    Signature::from_der(signature)
                } else {
                    Signature::from_slice(signature)
                }
                .map_err(|e| CryptoError::InvalidSignature(format!("bad {} signature: {e}", $name)))?;
                key.verify(data, &signature)
                    .map_err(|_| CryptoError::VerificationFailed)
            }

            pub(crate) fn derive_public(d: &[u8]) -> Result<PublicPoint, CryptoError> {
                point(&secret_key(d)?.public_key())
            }

            pub(crate) fn generate() -> Result<GeneratedKeyPair, CryptoError> {
                let secret = SecretKey::random(&mut OsRng);
                Ok(GeneratedKeyPair {
                    d: Zeroizing::new(secret.to_bytes().to_vec()),
                    public: point(&secret.public_key())?,
                })
            }

            pub(crate) fn agree(d: &[u8], x: &[u8], y: Option<&[u8]>) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
                let secret = secret_key(d)?;
                let peer = public_key(x, y)?;
                let shared = $curve::ecdh::diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
                Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
            }
        }
    };
}

nist_curve!(p256_ops, p256, "P-256");
nist_curve!(p384_ops, p384, "P-384");
nist_curve!(p521_ops, p521, "P-521");
