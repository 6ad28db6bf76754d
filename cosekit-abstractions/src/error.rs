// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error taxonomy shared by every cosekit crate.

use std::fmt::Display;

use thiserror::Error;

use crate::iana::{Curve, KeyOperation, KeyType};
use crate::key_usage::KeyUsage;

/// Malformed wire input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodingError {
    #[error("empty input")]
    Empty,

    #[error("CBOR decode failed: {0}")]
    Cbor(String),

    #[error("{field}: expected {expected}")]
    UnexpectedType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{structure} array length was not {expected} (got {actual})")]
    ArrayLength {
        structure: &'static str,
        expected: &'static str,
        actual: u64,
    },

    #[error("unexpected CBOR tag {actual} (expected {expected} for {structure} or no tag)")]
    UnexpectedTag {
        structure: &'static str,
        expected: u64,
        actual: u64,
    },

    #[error("trailing bytes after {0}")]
    TrailingBytes(&'static str),

    #[error("indefinite-length {0} are not supported")]
    IndefiniteLength(&'static str),

    #[error("{structure} nesting exceeds maximum depth {max}")]
    NestingTooDeep { structure: &'static str, max: usize },

    #[error("duplicate label {0} in map")]
    DuplicateLabel(String),
}

impl DecodingError {
    /// Normalize an underlying CBOR library error.
    pub fn cbor<E: Display>(e: E) -> Self {
        Self::Cbor(e.to_string())
    }
}

/// Key material or key/algorithm/operation compatibility problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyValidationError {
    #[error("missing key type")]
    MissingKeyType,

    #[error("unsupported key type {0}")]
    UnsupportedKeyType(i64),

    #[error("expected a {expected} key, got {actual}")]
    WrongKeyType { expected: KeyType, actual: KeyType },

    #[error("missing curve")]
    MissingCurve,

    #[error("curve {curve} is not supported for {key_type} keys")]
    UnsupportedCurve { curve: i64, key_type: KeyType },

    #[error("missing key material: {0}")]
    MissingKeyMaterial(&'static str),

    #[error("incomplete key material: {0}")]
    IncompleteKeyMaterial(&'static str),

    #[error("{field} must be {expected} bytes, got {actual}")]
    InvalidKeyLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("key parameter {label} must be a {expected}")]
    InvalidLabelValue { label: i64, expected: &'static str },

    #[error("label {0} is a reserved key parameter")]
    ReservedLabel(i64),

    #[error("unsupported key operation {0}")]
    UnsupportedKeyOperation(i64),

    #[error("operations {operations:?} are not compatible with a {usage} key")]
    IncompatibleOperations {
        usage: KeyUsage,
        operations: Vec<KeyOperation>,
    },

    #[error("a {key_type} key on {curve:?} cannot be used for {usage}")]
    IncompatibleUsage {
        usage: KeyUsage,
        key_type: KeyType,
        curve: Option<Curve>,
    },

    #[error("key is restricted to algorithm {key}, requested {requested}")]
    AlgorithmMismatch { key: i64, requested: i64 },

    #[error("algorithm {algorithm} is not allowed by this key: {reason}")]
    AlgorithmNotAllowed { algorithm: &'static str, reason: String },

    #[error("operation {0:?} is not permitted by the key")]
    OperationNotAllowed(KeyOperation),

    #[error("unsupported algorithm {0}")]
    UnsupportedAlgorithm(i64),

    #[error("{0} keys have no public part")]
    NoPublicKey(KeyType),
}

/// Incomplete or contradictory builder input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("conflicting values supplied for {0}")]
    ConflictingFields(&'static str),

    #[error("recipients nested deeper than {max} levels")]
    RecipientsTooDeep { max: usize },
}

/// Cryptographic failures, including failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("unsupported curve: {0}")]
    UnsupportedCurve(Curve),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("IV must be {expected} bytes, got {actual}")]
    InvalidIv { expected: usize, actual: usize },

    #[error("provider failure: {0}")]
    Provider(String),
}

/// Top-level error returned by encode/decode, builders and orchestration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoseError {
    #[error(transparent)]
    Decoding(#[from] DecodingError),

    #[error(transparent)]
    KeyValidation(#[from] KeyValidationError),

    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("CBOR encode failed: {0}")]
    Encoding(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(&'static str),

    #[error("missing {0} header")]
    MissingHeader(&'static str),

    #[error("algorithm conflict: {first} vs {second}")]
    AlgorithmConflict { first: i64, second: i64 },

    #[error("no signature at index {index} (message has {count})")]
    NoSuchSignature { index: usize, count: usize },
}

impl CoseError {
    /// Normalize an underlying CBOR encoder error.
    pub fn encoding<E: Display>(e: E) -> Self {
        Self::Encoding(e.to_string())
    }
}
