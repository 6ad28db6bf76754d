// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! HMAC-SHA2 with optional left truncation (HMAC 256/64).

use cosekit_abstractions::{AlgorithmInfo, CoseHashAlgorithm, CryptoError};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

fn full_tag<M: Mac + KeyInit>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut mac = <M as Mac>::new_from_slice(key).map_err(|e| CryptoError::InvalidKey(format!("bad HMAC key: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

pub(crate) fn compute(alg: &AlgorithmInfo, key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut tag = match alg.hash {
        Some(CoseHashAlgorithm::Sha256) => full_tag::<Hmac<Sha256>>(key, data)?,
        Some(CoseHashAlgorithm::Sha384) => full_tag::<Hmac<Sha384>>(key, data)?,
        Some(CoseHashAlgorithm::Sha512) => full_tag::<Hmac<Sha512>>(key, data)?,
        None => return Err(CryptoError::UnsupportedAlgorithm(alg.name.to_string())),
    };
    if let Some(len) = alg.output_len {
        tag.truncate(len);
    }
    Ok(tag)
}

pub(crate) fn verify(alg: &AlgorithmInfo, key: &[u8], data: &[u8], tag: &[u8]) -> Result<(), CryptoError> {
    let expected = compute(alg, key, data)?;
    if expected.len() != tag.len() {
        return Err(CryptoError::VerificationFailed);
    }
    if bool::from(expected.ct_eq(tag)) {
        Ok(())
    } else {
        Err(CryptoError::VerificationFailed)
    }
}
