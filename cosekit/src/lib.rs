// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE (RFC 9052) signing, MAC and encryption over typed keys and messages.
//!
//! This crate is the primary entry point. It ties algorithm selection,
//! key/algorithm compatibility checks and the authenticated-data structures
//! together and hands the primitive work to a
//! [`CryptoProvider`](cosekit_abstractions::CryptoProvider)
//! ([`RustCryptoProvider`] by default).
//!
//! The wire model (keys, headers, messages) is re-exported from
//! `cosekit-common`, so callers can build, encode and decode messages without
//! naming the lower crates.

// Internal implementation modules.
mod algorithm;
mod signature;

// Public API organization (lib.rs is a publisher).
mod encrypt;
mod keys;
mod mac;
mod options;
mod sign;
mod sign1;

pub use encrypt::{decrypt, decrypt0, encrypt, encrypt0, Sealed};
pub use keys::{generate_ec2_key, generate_okp_key, generate_symmetric_key, key_agreement};
pub use mac::{mac, mac0, verify_mac, verify_mac0};
pub use options::CoseOptions;
pub use sign::{sign, verify_sign, Signer};
pub use sign1::{sign1, verify_sign1};

pub use cosekit_abstractions::{
    AlgorithmFamily, AlgorithmInfo, BuilderError, CoseAlgorithm, CoseError, CoseHeaderMap, CryptoError,
    CryptoProvider, Curve, DecodingError, HeaderKey, HeaderValue, KeyOperation, KeyType, KeyUsage,
    KeyValidationError,
};
pub use cosekit_common::{
    AadContext, AadStructure, CoseEncrypt, CoseEncrypt0, CoseEncrypt0Builder, CoseEncryptBuilder, CoseKey, CoseMac,
    CoseMac0, CoseMac0Builder, CoseMacBuilder, CoseRecipient, CoseRecipientBuilder, CoseSign, CoseSign1,
    CoseSign1Builder, CoseSignBuilder, CoseSignature, CoseSignatureBuilder, CoseStructure, Ec2KeyBuilder,
    EncryptionKey, KeyAgreementKey, KeyRole, MacKey, OkpKeyBuilder, ProtectedHeader, SigningKey,
    SymmetricKeyBuilder, MAX_RECIPIENT_DEPTH,
};
pub use cosekit_crypto::RustCryptoProvider;
