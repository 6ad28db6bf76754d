// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Encrypt0 and COSE_Encrypt generation and decryption.
//!
//! The nonce comes from, in order: [`CoseOptions::iv`], an `IV` header, the
//! key's base IV combined with a `Partial IV` header (RFC 9052 §3.1), or, when
//! encrypting, fresh provider randomness recorded in the unprotected header.
//! An option IV that differs from the one the headers name is rejected.

use cosekit_abstractions::iana::header;
use cosekit_abstractions::{
    AlgorithmFamily, AlgorithmInfo, BuilderError, CoseError, CoseHeaderMap, CryptoError, CryptoProvider, KeyOperation,
    KeyValidationError,
};
use cosekit_common::{
    check_key_for, resolve_content, AadContext, AadStructure, CoseEncrypt, CoseEncrypt0, CoseEncrypt0Builder,
    CoseEncryptBuilder, CoseKey, CoseRecipient, EncryptionKey, KeyRole, ProtectedHeader,
};
use tracing::{debug, instrument, warn};

use crate::algorithm::{record_algorithm, require_family, resolve_algorithm, symmetric_secret, Resolved, Stage};
use crate::options::CoseOptions;

const AEAD_FAMILIES: &[AlgorithmFamily] = &[AlgorithmFamily::AesGcm];
const DEFAULT_IV_LEN: usize = 12;

/// An encrypted message plus its ciphertext when that travels separately.
#[derive(Debug, Clone, PartialEq)]
pub struct Sealed<M> {
    pub message: M,
    /// Set when the plaintext was supplied as detached content; the message
    /// then carries nil in its ciphertext slot.
    pub detached_ciphertext: Option<Vec<u8>>,
}

fn resolve_for(
    key: &CoseKey,
    protected: &CoseHeaderMap,
    unprotected: &CoseHeaderMap,
    options: &CoseOptions,
    op: KeyOperation,
) -> Result<Resolved, CoseError> {
    let resolved = resolve_algorithm(options.algorithm, protected, unprotected, key, Stage::of(op))?;
    require_family(resolved.info, AEAD_FAMILIES)?;
    check_key_for(key, resolved.info, op)?;
    Ok(resolved)
}

/// `base_iv XOR left-pad(partial_iv)`.
fn combine_partial_iv(base_iv: &[u8], partial_iv: &[u8], iv_len: usize) -> Result<Vec<u8>, CryptoError> {
    if base_iv.len() != iv_len {
        return Err(CryptoError::InvalidIv {
            expected: iv_len,
            actual: base_iv.len(),
        });
    }
    if partial_iv.len() > iv_len {
        return Err(CryptoError::InvalidIv {
            expected: iv_len,
            actual: partial_iv.len(),
        });
    }
    let mut iv = base_iv.to_vec();
    let offset = iv_len - partial_iv.len();
    for (slot, byte) in iv[offset..].iter_mut().zip(partial_iv) {
        *slot ^= byte;
    }
    Ok(iv)
}

/// IV named by the headers, directly or through a Partial IV.
fn header_iv(
    key: &CoseKey,
    info: &AlgorithmInfo,
    protected: &CoseHeaderMap,
    unprotected: &CoseHeaderMap,
) -> Result<Option<Vec<u8>>, CoseError> {
    if let Some(iv) = protected.iv().or_else(|| unprotected.iv()) {
        return Ok(Some(iv.to_vec()));
    }
    match protected.partial_iv().or_else(|| unprotected.partial_iv()) {
        Some(partial_iv) => {
            let base_iv = key
                .base_iv()
                .ok_or(KeyValidationError::MissingKeyMaterial("base_iv"))?;
            let iv_len = info.iv_len.unwrap_or(DEFAULT_IV_LEN);
            Ok(Some(combine_partial_iv(base_iv, partial_iv, iv_len)?))
        }
        None => Ok(None),
    }
}

fn has_iv_header(protected: &CoseHeaderMap, unprotected: &CoseHeaderMap) -> bool {
    [header::IV, header::PARTIAL_IV]
        .iter()
        .any(|label| protected.contains_label(*label) || unprotected.contains_label(*label))
}

/// The option IV wins only when the headers name no other nonce.
fn agreed_iv(options: &CoseOptions, from_headers: Option<Vec<u8>>) -> Result<Option<Vec<u8>>, CoseError> {
    match (&options.iv, from_headers) {
        (Some(iv), Some(named)) if *iv != named => {
            warn!("IV option disagrees with the message headers");
            Err(BuilderError::ConflictingFields("IV").into())
        }
        (Some(iv), _) => Ok(Some(iv.clone())),
        (None, named) => Ok(named),
    }
}

/// Pick the nonce for encryption, recording it in `unprotected` when no header
/// names one.
fn sealing_iv(
    provider: &dyn CryptoProvider,
    key: &CoseKey,
    info: &AlgorithmInfo,
    protected: &CoseHeaderMap,
    unprotected: &mut CoseHeaderMap,
    options: &CoseOptions,
) -> Result<Vec<u8>, CoseError> {
    let from_headers = header_iv(key, info, protected, unprotected)?;
    let iv = match agreed_iv(options, from_headers)? {
        Some(iv) => iv,
        None => {
            let iv = provider.random_bytes(info.iv_len.unwrap_or(DEFAULT_IV_LEN))?;
            debug!(len = iv.len(), "generated random IV");
            iv
        }
    };
    if !has_iv_header(protected, unprotected) {
        unprotected.insert(header::IV, iv.clone());
    }
    Ok(iv)
}

fn opening_iv(
    key: &CoseKey,
    info: &AlgorithmInfo,
    protected: &CoseHeaderMap,
    unprotected: &CoseHeaderMap,
    options: &CoseOptions,
) -> Result<Vec<u8>, CoseError> {
    let from_headers = header_iv(key, info, protected, unprotected)?;
    agreed_iv(options, from_headers)?.ok_or(CoseError::MissingHeader("IV"))
}

struct SealOutput {
    protected: ProtectedHeader,
    unprotected: CoseHeaderMap,
    ciphertext: Vec<u8>,
}

fn seal(
    provider: &dyn CryptoProvider,
    key: &CoseKey,
    context: AadContext,
    mut protected: CoseHeaderMap,
    mut unprotected: CoseHeaderMap,
    plaintext: &[u8],
    options: &CoseOptions,
) -> Result<SealOutput, CoseError> {
    let resolved = resolve_for(key, &protected, &unprotected, options, KeyOperation::Encrypt)?;
    record_algorithm(&resolved, &mut protected, &unprotected);

    let content = resolve_content(Some(plaintext), options.detached())?;
    let iv = sealing_iv(provider, key, resolved.info, &protected, &mut unprotected, options)?;
    let protected = ProtectedHeader::from_map(protected)?;
    let aad = AadStructure::encryption(context, protected.encoded_map_cbor(), &options.external_aad).encode()?;
    let ciphertext = provider.aead_seal(resolved.info, symmetric_secret(key)?, &iv, &aad, content)?;
    debug!(alg = resolved.info.name, pt_len = content.len(), ct_len = ciphertext.len(), "sealed");

    Ok(SealOutput {
        protected,
        unprotected,
        ciphertext,
    })
}

fn open(
    provider: &dyn CryptoProvider,
    key: &CoseKey,
    protected: &ProtectedHeader,
    unprotected: &CoseHeaderMap,
    embedded: Option<&[u8]>,
    aad: impl FnOnce() -> Result<Vec<u8>, CoseError>,
    options: &CoseOptions,
) -> Result<Vec<u8>, CoseError> {
    let resolved = resolve_for(key, protected.header(), unprotected, options, KeyOperation::Decrypt)?;
    let ciphertext = resolve_content(embedded, options.detached())?;
    let iv = opening_iv(key, resolved.info, protected.header(), unprotected, options)?;
    let aad = aad()?;

    provider
        .aead_open(resolved.info, symmetric_secret(key)?, &iv, &aad, ciphertext)
        .map_err(|e| {
            warn!(alg = resolved.info.name, error = %e, "decryption failed");
            e.into()
        })
}

/// Encrypt `plaintext` into a COSE_Encrypt0.
///
/// An empty `plaintext` with [`CoseOptions::detached_content`] set encrypts
/// the detached content and returns the ciphertext in
/// [`Sealed::detached_ciphertext`].
#[instrument(level = "debug", skip_all)]
pub fn encrypt0(
    provider: &dyn CryptoProvider,
    key: &EncryptionKey,
    protected: CoseHeaderMap,
    unprotected: CoseHeaderMap,
    plaintext: &[u8],
    options: &CoseOptions,
) -> Result<Sealed<CoseEncrypt0>, CoseError> {
    let output = seal(provider, key.key(), AadContext::Encrypt0, protected, unprotected, plaintext, options)?;

    let builder = CoseEncrypt0Builder::new()
        .protected_bytes(output.protected.encoded_map_cbor())?
        .unprotected(output.unprotected);
    if plaintext.is_empty() {
        Ok(Sealed {
            message: builder.detached_ciphertext()?.build()?,
            detached_ciphertext: Some(output.ciphertext),
        })
    } else {
        Ok(Sealed {
            message: builder.ciphertext(output.ciphertext)?.build()?,
            detached_ciphertext: None,
        })
    }
}

/// Decrypt a COSE_Encrypt0. Detached ciphertext is taken from
/// [`CoseOptions::detached_content`].
#[instrument(level = "debug", skip_all)]
pub fn decrypt0(
    provider: &dyn CryptoProvider,
    key: &EncryptionKey,
    message: &CoseEncrypt0,
    options: &CoseOptions,
) -> Result<Vec<u8>, CoseError> {
    open(
        provider,
        key.key(),
        message.protected(),
        message.unprotected(),
        message.ciphertext(),
        || message.enc_structure(&options.external_aad),
        options,
    )
}

/// Encrypt `plaintext` into a COSE_Encrypt carrying `recipients`.
#[instrument(level = "debug", skip_all, fields(recipients = recipients.len()))]
pub fn encrypt(
    provider: &dyn CryptoProvider,
    key: &EncryptionKey,
    protected: CoseHeaderMap,
    unprotected: CoseHeaderMap,
    plaintext: &[u8],
    recipients: Vec<CoseRecipient>,
    options: &CoseOptions,
) -> Result<Sealed<CoseEncrypt>, CoseError> {
    if recipients.is_empty() {
        return Err(BuilderError::MissingField("recipients").into());
    }
    let output = seal(provider, key.key(), AadContext::Encrypt, protected, unprotected, plaintext, options)?;

    let builder = CoseEncryptBuilder::new()
        .protected_bytes(output.protected.encoded_map_cbor())?
        .unprotected(output.unprotected)
        .recipients(recipients);
    if plaintext.is_empty() {
        Ok(Sealed {
            message: builder.detached_ciphertext()?.build()?,
            detached_ciphertext: Some(output.ciphertext),
        })
    } else {
        Ok(Sealed {
            message: builder.ciphertext(output.ciphertext)?.build()?,
            detached_ciphertext: None,
        })
    }
}

#[instrument(level = "debug", skip_all)]
pub fn decrypt(
    provider: &dyn CryptoProvider,
    key: &EncryptionKey,
    message: &CoseEncrypt,
    options: &CoseOptions,
) -> Result<Vec<u8>, CoseError> {
    open(
        provider,
        key.key(),
        message.protected(),
        message.unprotected(),
        message.ciphertext(),
        || message.enc_structure(&options.external_aad),
        options,
    )
}

