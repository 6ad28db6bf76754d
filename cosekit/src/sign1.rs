// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Sign1 generation and verification.

use cosekit_abstractions::{CoseError, CoseHeaderMap, CryptoProvider, KeyOperation};
use cosekit_common::{
    check_key_for, resolve_content, AadStructure, CoseSign1, CoseSign1Builder, KeyRole, ProtectedHeader, SigningKey,
};
use tracing::instrument;

use crate::algorithm::{record_algorithm, require_family, resolve_algorithm, Stage};
use crate::options::CoseOptions;
use crate::signature::{check_signature, create_signature, SIGNATURE_FAMILIES};

/// Sign `payload` into a COSE_Sign1.
///
/// To produce a detached signature pass an empty `payload` and supply the
/// content through [`CoseOptions::detached_content`]; the message then
/// carries nil.
#[instrument(level = "debug", skip_all)]
pub fn sign1(
    provider: &dyn CryptoProvider,
    key: &SigningKey,
    mut protected: CoseHeaderMap,
    unprotected: CoseHeaderMap,
    payload: &[u8],
    options: &CoseOptions,
) -> Result<CoseSign1, CoseError> {
    let key = key.key();
    let resolved = resolve_algorithm(options.algorithm, &protected, &unprotected, key, Stage::Generate)?;
    require_family(resolved.info, SIGNATURE_FAMILIES)?;
    check_key_for(key, resolved.info, KeyOperation::Sign)?;
    record_algorithm(&resolved, &mut protected, &unprotected);

    let content = resolve_content(Some(payload), options.detached())?;
    let protected = ProtectedHeader::from_map(protected)?;
    let tbs = AadStructure::signature1(protected.encoded_map_cbor(), &options.external_aad, content).encode()?;
    let signature = create_signature(provider, key, resolved.info, &tbs)?;

    let builder = CoseSign1Builder::new()
        .protected_bytes(protected.encoded_map_cbor())?
        .unprotected(unprotected)
        .signature(signature);
    let builder = if payload.is_empty() {
        builder.detached_payload()?
    } else {
        builder.payload(payload)?
    };
    builder.build()
}

/// Verify a COSE_Sign1 signature with `key`.
///
/// A key carrying only `d` is accepted; its public point is derived through
/// `provider`.
#[instrument(level = "debug", skip_all)]
pub fn verify_sign1(
    provider: &dyn CryptoProvider,
    key: &SigningKey,
    message: &CoseSign1,
    options: &CoseOptions,
) -> Result<(), CoseError> {
    let key = key.key();
    let resolved = resolve_algorithm(
        options.algorithm,
        message.protected().header(),
        message.unprotected(),
        key,
        Stage::Check,
    )?;
    require_family(resolved.info, SIGNATURE_FAMILIES)?;
    check_key_for(key, resolved.info, KeyOperation::Verify)?;

    let tbs = message.tbs_data(&options.external_aad, options.detached())?;
    check_signature(provider, key, resolved.info, &tbs, message.signature())
}
