// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! IANA COSE registry values used by this workspace.
//!
//! See <https://www.iana.org/assignments/cose/cose.xhtml>.

use std::fmt;

/// Common header parameter labels.
pub mod header {
    pub const ALG: i64 = 1;
    pub const CRIT: i64 = 2;
    pub const CONTENT_TYPE: i64 = 3;
    pub const KID: i64 = 4;
    pub const IV: i64 = 5;
    pub const PARTIAL_IV: i64 = 6;
    pub const COUNTER_SIGNATURE: i64 = 7;
}

/// COSE_Key common and type-specific parameter labels.
pub mod key_param {
    pub const KTY: i64 = 1;
    pub const KID: i64 = 2;
    pub const ALG: i64 = 3;
    pub const KEY_OPS: i64 = 4;
    pub const BASE_IV: i64 = 5;

    /// EC2 / OKP curve.
    pub const CRV: i64 = -1;
    /// EC2 x-coordinate, OKP public key.
    pub const X: i64 = -2;
    /// EC2 y-coordinate.
    pub const Y: i64 = -3;
    /// EC2 / OKP private key.
    pub const D: i64 = -4;
    /// Symmetric key value.
    pub const K: i64 = -1;

    /// Labels with a fixed position in the canonical COSE_Key encoding, in order.
    pub const CANONICAL_COMMON: [i64; 5] = [KTY, KID, ALG, KEY_OPS, BASE_IV];
}

/// CBOR tags for COSE messages.
pub mod tag {
    pub const COSE_ENCRYPT0: u64 = 16;
    pub const COSE_MAC0: u64 = 17;
    pub const COSE_SIGN1: u64 = 18;
    pub const COSE_ENCRYPT: u64 = 96;
    pub const COSE_MAC: u64 = 97;
    pub const COSE_SIGN: u64 = 98;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KeyType {
    Reserved = 0,
    Okp = 1,
    Ec2 = 2,
    Symmetric = 4,
}

impl KeyType {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(KeyType::Reserved),
            1 => Some(KeyType::Okp),
            2 => Some(KeyType::Ec2),
            4 => Some(KeyType::Symmetric),
            _ => None,
        }
    }

    pub fn id(self) -> i64 {
        self as i64
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyType::Reserved => "Reserved",
            KeyType::Okp => "OKP",
            KeyType::Ec2 => "EC2",
            KeyType::Symmetric => "Symmetric",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Curve {
    P256 = 1,
    P384 = 2,
    P521 = 3,
    X25519 = 4,
    X448 = 5,
    Ed25519 = 6,
    Ed448 = 7,
}

impl Curve {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Curve::P256),
            2 => Some(Curve::P384),
            3 => Some(Curve::P521),
            4 => Some(Curve::X25519),
            5 => Some(Curve::X448),
            6 => Some(Curve::Ed25519),
            7 => Some(Curve::Ed448),
            _ => None,
        }
    }

    pub fn id(self) -> i64 {
        self as i64
    }

    /// The key type whose COSE_Key carries this curve.
    pub fn key_type(self) -> KeyType {
        match self {
            Curve::P256 | Curve::P384 | Curve::P521 => KeyType::Ec2,
            Curve::X25519 | Curve::X448 | Curve::Ed25519 | Curve::Ed448 => KeyType::Okp,
        }
    }

    /// Byte length of a coordinate (EC2) or public key (OKP), which is also the
    /// length of the private key encoding.
    pub fn coordinate_len(self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
            Curve::X25519 => 32,
            Curve::X448 => 56,
            Curve::Ed25519 => 32,
            Curve::Ed448 => 57,
        }
    }

    pub fn supports_signing(self) -> bool {
        matches!(self, Curve::P256 | Curve::P384 | Curve::P521 | Curve::Ed25519 | Curve::Ed448)
    }

    pub fn supports_key_agreement(self) -> bool {
        matches!(self, Curve::P256 | Curve::P384 | Curve::P521 | Curve::X25519 | Curve::X448)
    }

    pub fn name(self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
            Curve::X25519 => "X25519",
            Curve::X448 => "X448",
            Curve::Ed25519 => "Ed25519",
            Curve::Ed448 => "Ed448",
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyOperation {
    Sign = 1,
    Verify = 2,
    Encrypt = 3,
    Decrypt = 4,
    WrapKey = 5,
    UnwrapKey = 6,
    DeriveKey = 7,
    DeriveBits = 8,
    MacCreate = 9,
    MacVerify = 10,
}

impl KeyOperation {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(KeyOperation::Sign),
            2 => Some(KeyOperation::Verify),
            3 => Some(KeyOperation::Encrypt),
            4 => Some(KeyOperation::Decrypt),
            5 => Some(KeyOperation::WrapKey),
            6 => Some(KeyOperation::UnwrapKey),
            7 => Some(KeyOperation::DeriveKey),
            8 => Some(KeyOperation::DeriveBits),
            9 => Some(KeyOperation::MacCreate),
            10 => Some(KeyOperation::MacVerify),
            _ => None,
        }
    }

    pub fn id(self) -> i64 {
        self as i64
    }
}
