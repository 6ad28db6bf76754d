// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared interfaces and datatypes for the cosekit crates.
//!
//! This crate exists to prevent circular dependencies across:
//! - wire codecs and the key/message model (`cosekit-common`)
//! - cryptography backends (`cosekit-crypto` and third-party providers)
//! - the high-level facade (`cosekit`)
//!
//! It carries no CBOR or cryptography dependency of its own.

pub mod algorithms;
pub mod crypto_provider;
pub mod error;
pub mod header_map;
pub mod iana;
pub mod key_usage;

pub use algorithms::{lookup, registry, AlgorithmFamily, AlgorithmInfo, CoseAlgorithm, CoseHashAlgorithm};
pub use crypto_provider::{CryptoProvider, EcdsaSignatureFormat, GeneratedKeyPair, PublicKeyRef, PublicPoint};
pub use error::{BuilderError, CoseError, CryptoError, DecodingError, KeyValidationError};
pub use header_map::{CoseHeaderMap, HeaderKey, HeaderValue};
pub use iana::{Curve, KeyOperation, KeyType};
pub use key_usage::KeyUsage;
