// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Key / algorithm / operation compatibility checks.
//!
//! All algorithm requirements come from the registry row; nothing here
//! branches on a specific algorithm.

use cosekit_abstractions::{AlgorithmInfo, KeyOperation, KeyValidationError};

use super::cose_key::CoseKey;

/// Fails when the key declares an algorithm other than `alg`.
pub fn verify_algorithm_matches_key(key: &CoseKey, alg: &AlgorithmInfo) -> Result<(), KeyValidationError> {
    match key.alg() {
        Some(declared) if declared != alg.algorithm.id() => Err(KeyValidationError::AlgorithmMismatch {
            key: declared,
            requested: alg.algorithm.id(),
        }),
        _ => Ok(()),
    }
}

/// Fails when the key's type, curve or length does not fit `alg`.
pub fn verify_algorithm_allowed_by_key(key: &CoseKey, alg: &AlgorithmInfo) -> Result<(), KeyValidationError> {
    let not_allowed = |reason: String| KeyValidationError::AlgorithmNotAllowed {
        algorithm: alg.name,
        reason,
    };

    if !alg.key_types.contains(&key.key_type()) {
        return Err(not_allowed(format!("{} keys cannot be used", key.key_type())));
    }

    if let Some(curve) = key.curve() {
        if !alg.curves.contains(&curve) {
            return Err(not_allowed(format!("curve {curve} cannot be used")));
        }
    }

    if let (Some(expected), Some(k)) = (alg.key_len, key.k()) {
        if k.len() != expected {
            return Err(not_allowed(format!("key must be {expected} bytes, got {}", k.len())));
        }
    }

    Ok(())
}

/// Fails when the key declares operations and `op` is not among them.
pub fn verify_operation_allowed_by_key(key: &CoseKey, op: KeyOperation) -> Result<(), KeyValidationError> {
    if key.key_ops().is_empty() || key.key_ops().contains(&op) {
        Ok(())
    } else {
        Err(KeyValidationError::OperationNotAllowed(op))
    }
}

/// All three checks, in the order orchestration applies them.
pub fn check_key_for(key: &CoseKey, alg: &AlgorithmInfo, op: KeyOperation) -> Result<(), KeyValidationError> {
    verify_algorithm_matches_key(key, alg)?;
    verify_algorithm_allowed_by_key(key, alg)?;
    verify_operation_allowed_by_key(key, op)
}
