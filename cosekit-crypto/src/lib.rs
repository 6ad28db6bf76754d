// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! RustCrypto-backed implementation of `cosekit_abstractions::CryptoProvider`.
//!
//! Supported:
//! - ECDSA P-256 / P-384 / P-521 (ES256 / ES384 / ES512), fixed-width or DER
//! - Ed25519 (EdDSA)
//! - HMAC-SHA-256/384/512, including the 64-bit truncation
//! - AES-128/192/256-GCM
//! - ECDH on the P-curves and X25519
//! - key generation and public-key derivation for the curves above

mod aead;
mod ecdsa;
mod mac;
mod okp;
pub mod provider;

pub use provider::RustCryptoProvider;
