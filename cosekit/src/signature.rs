// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Provider calls for signature creation and checking.
//!
//! COSE carries ECDSA signatures as fixed-width `r || s`. When the provider
//! reports DER output the signature is converted on the way out and back on
//! the way in; other providers see the wire bytes unchanged.

use cosekit_abstractions::{
    AlgorithmFamily, AlgorithmInfo, CoseError, CryptoProvider, EcdsaSignatureFormat, KeyValidationError, PublicPoint,
};
use cosekit_common::{ecdsa_der_to_fixed, ecdsa_fixed_to_der, CoseKey};
use tracing::{debug, warn};

use crate::algorithm::private_scalar;

pub(crate) const SIGNATURE_FAMILIES: &[AlgorithmFamily] = &[AlgorithmFamily::Ecdsa, AlgorithmFamily::EdDsa];

fn der_field_size(provider: &dyn CryptoProvider, info: &AlgorithmInfo) -> Option<usize> {
    match provider.ecdsa_signature_format() {
        EcdsaSignatureFormat::Der => info.ecdsa_field_size(),
        EcdsaSignatureFormat::Fixed => None,
    }
}

pub(crate) fn create_signature(
    provider: &dyn CryptoProvider,
    key: &CoseKey,
    info: &AlgorithmInfo,
    tbs: &[u8],
) -> Result<Vec<u8>, CoseError> {
    let curve = key.curve().ok_or(KeyValidationError::MissingCurve)?;
    let signature = provider.sign(info, curve, private_scalar(key)?, tbs)?;
    let signature = match der_field_size(provider, info) {
        Some(field_size) => ecdsa_der_to_fixed(&signature, field_size)?,
        None => signature,
    };
    debug!(alg = info.name, tbs_len = tbs.len(), sig_len = signature.len(), "signed");
    Ok(signature)
}

/// Public point of `key`, derived from `d` when the key carries no `x`.
fn public_point(provider: &dyn CryptoProvider, key: &CoseKey) -> Result<PublicPoint, CoseError> {
    let curve = key.curve().ok_or(KeyValidationError::MissingCurve)?;
    match key.x() {
        Some(x) => Ok(PublicPoint {
            x: x.to_vec(),
            y: key.y().map(<[u8]>::to_vec),
        }),
        None => Ok(provider.derive_public_key(curve, private_scalar(key)?)?),
    }
}

pub(crate) fn check_signature(
    provider: &dyn CryptoProvider,
    key: &CoseKey,
    info: &AlgorithmInfo,
    tbs: &[u8],
    signature: &[u8],
) -> Result<(), CoseError> {
    let curve = key.curve().ok_or(KeyValidationError::MissingCurve)?;
    let public = public_point(provider, key)?;
    let converted;
    let signature = match der_field_size(provider, info) {
        Some(field_size) => {
            converted = ecdsa_fixed_to_der(signature, field_size)?;
            converted.as_slice()
        }
        None => signature,
    };

    provider
        .verify(info, public.as_key_ref(curve), tbs, signature)
        .map_err(|e| {
            warn!(alg = info.name, error = %e, "signature verification failed");
            e.into()
        })
}
