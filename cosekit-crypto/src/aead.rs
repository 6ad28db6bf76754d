// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! AES-GCM with a 96-bit nonce and 128-bit tag.

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce};
use cosekit_abstractions::{AlgorithmInfo, CoseAlgorithm, CryptoError};

type Aes192Gcm = AesGcm<Aes192, U12>;

const NONCE_LEN: usize = 12;

fn cipher<C: KeyInit>(alg: &AlgorithmInfo, key: &[u8]) -> Result<C, CryptoError> {
    C::new_from_slice(key).map_err(|_| {
        CryptoError::InvalidKey(format!(
            "{} requires a {} byte key, got {}",
            alg.name,
            alg.key_len.unwrap_or_default(),
            key.len()
        ))
    })
}

fn nonce(iv: &[u8]) -> Result<Nonce<U12>, CryptoError> {
    let bytes: [u8; NONCE_LEN] = iv.try_into().map_err(|_| CryptoError::InvalidIv {
        expected: NONCE_LEN,
        actual: iv.len(),
    })?;
    Ok(Nonce::<U12>::from(bytes))
}

fn seal_with<C: KeyInit + Aead<NonceSize = U12>>(
    alg: &AlgorithmInfo,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let nonce = nonce(iv)?;
    let cipher: C = cipher(alg, key)?;
    cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|_| CryptoError::Provider(format!("{} encryption failed", alg.name)))
}

fn open_with<C: KeyInit + Aead<NonceSize = U12>>(
    alg: &AlgorithmInfo,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let nonce = nonce(iv)?;
    let cipher: C = cipher(alg, key)?;
    cipher
        .decrypt(&nonce, Payload { msg: ciphertext, aad })
        .map_err(|_| CryptoError::DecryptionFailed)
}

pub(crate) fn seal(
    alg: &AlgorithmInfo,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    match alg.algorithm {
        CoseAlgorithm::A128GCM => seal_with::<Aes128Gcm>(alg, key, iv, aad, plaintext),
        CoseAlgorithm::A192GCM => seal_with::<Aes192Gcm>(alg, key, iv, aad, plaintext),
        CoseAlgorithm::A256GCM => seal_with::<Aes256Gcm>(alg, key, iv, aad, plaintext),
        _ => Err(CryptoError::UnsupportedAlgorithm(alg.name.to_string())),
    }
}

pub(crate) fn open(
    alg: &AlgorithmInfo,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    match alg.algorithm {
        CoseAlgorithm::A128GCM => open_with::<Aes128Gcm>(alg, key, iv, aad, ciphertext),
        CoseAlgorithm::A192GCM => open_with::<Aes192Gcm>(alg, key, iv, aad, ciphertext),
        CoseAlgorithm::A256GCM => open_with::<Aes256Gcm>(alg, key, iv, aad, ciphertext),
        _ => Err(CryptoError::UnsupportedAlgorithm(alg.name.to_string())),
    }
}
