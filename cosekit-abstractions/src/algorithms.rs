// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Algorithm registry.
//!
//! Every algorithm-dependent decision (required key type and curve, key and
//! output sizes, primitive family) is answered from [`REGISTRY`]. Adding an
//! algorithm means adding an enum variant and a table row.

use std::fmt;

use crate::error::KeyValidationError;
use crate::iana::{Curve, KeyType};

/// Supported COSE algorithms (IANA COSE Algorithms registry).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum CoseAlgorithm {
    /// ECDSA w/ SHA-256 over P-256.
    ES256 = -7,
    /// ECDSA w/ SHA-384 over P-384.
    ES384 = -35,
    /// ECDSA w/ SHA-512 over P-521.
    ES512 = -36,
    /// EdDSA (Ed25519 / Ed448).
    EdDSA = -8,
    /// HMAC w/ SHA-256 truncated to 64 bits.
    HMAC256_64 = 4,
    /// HMAC w/ SHA-256.
    HMAC256_256 = 5,
    /// HMAC w/ SHA-384.
    HMAC384_384 = 6,
    /// HMAC w/ SHA-512.
    HMAC512_512 = 7,
    A128GCM = 1,
    A192GCM = 2,
    A256GCM = 3,
    /// Direct use of the content key.
    Direct = -6,
    EcdhEsHkdf256 = -25,
    EcdhEsHkdf512 = -26,
    EcdhSsHkdf256 = -27,
    EcdhSsHkdf512 = -28,
}

impl CoseAlgorithm {
    pub fn id(self) -> i64 {
        self as i64
    }

    /// Look up an algorithm by its COSE identifier.
    pub fn from_id(id: i64) -> Option<Self> {
        lookup(id).map(|info| info.algorithm)
    }

    /// Registry row for this algorithm.
    pub fn info(self) -> &'static AlgorithmInfo {
        // Every variant has a row; the fallback is unreachable in practice.
        lookup(self.id()).unwrap_or(&REGISTRY[0])
    }
}

impl From<CoseAlgorithm> for i64 {
    fn from(alg: CoseAlgorithm) -> Self {
        alg.id()
    }
}

impl TryFrom<i64> for CoseAlgorithm {
    type Error = KeyValidationError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        CoseAlgorithm::from_id(id).ok_or(KeyValidationError::UnsupportedAlgorithm(id))
    }
}

impl fmt::Display for CoseAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.info().name, self.id())
    }
}

/// Primitive family an algorithm is executed with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    Ecdsa,
    EdDsa,
    Hmac,
    AesGcm,
    Ecdh,
    Direct,
}

/// Supported hash algorithms.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CoseHashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl CoseHashAlgorithm {
    /// Digest size in bytes.
    pub fn output_len(self) -> usize {
        match self {
            CoseHashAlgorithm::Sha256 => 32,
            CoseHashAlgorithm::Sha384 => 48,
            CoseHashAlgorithm::Sha512 => 64,
        }
    }
}

/// One registry row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmInfo {
    pub algorithm: CoseAlgorithm,
    pub name: &'static str,
    pub family: AlgorithmFamily,
    /// Key types a key must have to be used with this algorithm.
    pub key_types: &'static [KeyType],
    /// Curves a key must be on; empty for symmetric algorithms.
    pub curves: &'static [Curve],
    pub hash: Option<CoseHashAlgorithm>,
    /// Required symmetric key length in bytes, when fixed.
    pub key_len: Option<usize>,
    /// Signature or tag length in bytes, when fixed.
    pub output_len: Option<usize>,
    /// Nonce length in bytes for AEAD algorithms.
    pub iv_len: Option<usize>,
}

impl AlgorithmInfo {
    /// Field size used for fixed-width `r || s` ECDSA signatures.
    pub fn ecdsa_field_size(&self) -> Option<usize> {
        match self.family {
            AlgorithmFamily::Ecdsa => self.output_len.map(|len| len / 2),
            _ => None,
        }
    }
}

const EC2: &[KeyType] = &[KeyType::Ec2];
const OKP: &[KeyType] = &[KeyType::Okp];
const SYMMETRIC: &[KeyType] = &[KeyType::Symmetric];
const ASYMMETRIC: &[KeyType] = &[KeyType::Ec2, KeyType::Okp];
const AGREEMENT_CURVES: &[Curve] = &[Curve::P256, Curve::P384, Curve::P521, Curve::X25519, Curve::X448];

/// The algorithm table.
pub static REGISTRY: [AlgorithmInfo; 16] = [
    AlgorithmInfo {
        algorithm: CoseAlgorithm::ES256,
        name: "ES256",
        family: AlgorithmFamily::Ecdsa,
        key_types: EC2,
        curves: &[Curve::P256],
        hash: Some(CoseHashAlgorithm::Sha256),
        key_len: None,
        output_len: Some(64),
        iv_len: None,
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::ES384,
        name: "ES384",
        family: AlgorithmFamily::Ecdsa,
        key_types: EC2,
        curves: &[Curve::P384],
        hash: Some(CoseHashAlgorithm::Sha384),
        key_len: None,
        output_len: Some(96),
        iv_len: None,
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::ES512,
        name: "ES512",
        family: AlgorithmFamily::Ecdsa,
        key_types: EC2,
        curves: &[Curve::P521],
        hash: Some(CoseHashAlgorithm::Sha512),
        key_len: None,
        output_len: Some(132),
        iv_len: None,
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::EdDSA,
        name: "EdDSA",
        family: AlgorithmFamily::EdDsa,
        key_types: OKP,
        curves: &[Curve::Ed25519, Curve::Ed448],
        hash: None,
        key_len: None,
        output_len: None,
        iv_len: None,
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::HMAC256_64,
        name: "HMAC 256/64",
        family: AlgorithmFamily::Hmac,
        key_types: SYMMETRIC,
        curves: &[],
        hash: Some(CoseHashAlgorithm::Sha256),
        key_len: None,
        output_len: Some(8),
        iv_len: None,
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::HMAC256_256,
        name: "HMAC 256/256",
        family: AlgorithmFamily::Hmac,
        key_types: SYMMETRIC,
        curves: &[],
        hash: Some(CoseHashAlgorithm::Sha256),
        key_len: None,
        output_len: Some(32),
        iv_len: None,
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::HMAC384_384,
        name: "HMAC 384/384",
        family: AlgorithmFamily::Hmac,
        key_types: SYMMETRIC,
        curves: &[],
        hash: Some(CoseHashAlgorithm::Sha384),
        key_len: None,
        output_len: Some(48),
        iv_len: None,
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::HMAC512_512,
        name: "HMAC 512/512",
        family: AlgorithmFamily::Hmac,
        key_types: SYMMETRIC,
        curves: &[],
        hash: Some(CoseHashAlgorithm::Sha512),
        key_len: None,
        output_len: Some(64),
        iv_len: None,
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::A128GCM,
        name: "A128GCM",
        family: AlgorithmFamily::AesGcm,
        key_types: SYMMETRIC,
        curves: &[],
        hash: None,
        key_len: Some(16),
        output_len: Some(16),
        iv_len: Some(12),
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::A192GCM,
        name: "A192GCM",
        family: AlgorithmFamily::AesGcm,
        key_types: SYMMETRIC,
        curves: &[],
        hash: None,
        key_len: Some(24),
        output_len: Some(16),
        iv_len: Some(12),
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::A256GCM,
        name: "A256GCM",
        family: AlgorithmFamily::AesGcm,
        key_types: SYMMETRIC,
        curves: &[],
        hash: None,
        key_len: Some(32),
        output_len: Some(16),
        iv_len: Some(12),
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::Direct,
        name: "direct",
        family: AlgorithmFamily::Direct,
        key_types: SYMMETRIC,
        curves: &[],
        hash: None,
        key_len: None,
        output_len: None,
        iv_len: None,
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::EcdhEsHkdf256,
        name: "ECDH-ES + HKDF-256",
        family: AlgorithmFamily::Ecdh,
        key_types: ASYMMETRIC,
        curves: AGREEMENT_CURVES,
        hash: Some(CoseHashAlgorithm::Sha256),
        key_len: None,
        output_len: None,
        iv_len: None,
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::EcdhEsHkdf512,
        name: "ECDH-ES + HKDF-512",
        family: AlgorithmFamily::Ecdh,
        key_types: ASYMMETRIC,
        curves: AGREEMENT_CURVES,
        hash: Some(CoseHashAlgorithm::Sha512),
        key_len: None,
        output_len: None,
        iv_len: None,
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::EcdhSsHkdf256,
        name: "ECDH-SS + HKDF-256",
        family: AlgorithmFamily::Ecdh,
        key_types: ASYMMETRIC,
        curves: AGREEMENT_CURVES,
        hash: Some(CoseHashAlgorithm::Sha256),
        key_len: None,
        output_len: None,
        iv_len: None,
    },
    AlgorithmInfo {
        algorithm: CoseAlgorithm::EcdhSsHkdf512,
        name: "ECDH-SS + HKDF-512",
        family: AlgorithmFamily::Ecdh,
        key_types: ASYMMETRIC,
        curves: AGREEMENT_CURVES,
        hash: Some(CoseHashAlgorithm::Sha512),
        key_len: None,
        output_len: None,
        iv_len: None,
    },
];

/// Find the registry row for a COSE algorithm identifier.
pub fn lookup(id: i64) -> Option<&'static AlgorithmInfo> {
    REGISTRY.iter().find(|info| info.algorithm as i64 == id)
}

/// All registered algorithms.
pub fn registry() -> &'static [AlgorithmInfo] {
    &REGISTRY
}
