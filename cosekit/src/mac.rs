// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Mac0 and COSE_Mac generation and verification.
//!
//! Recipients of a COSE_Mac are carried as given; the caller supplies the MAC
//! key directly (for example through a `direct` recipient).

use cosekit_abstractions::{
    AlgorithmFamily, AlgorithmInfo, BuilderError, CoseError, CoseHeaderMap, CryptoProvider, KeyOperation,
};
use cosekit_common::{
    check_key_for, resolve_content, AadContext, AadStructure, CoseKey, CoseMac, CoseMac0, CoseMac0Builder,
    CoseMacBuilder, CoseRecipient, KeyRole, MacKey, ProtectedHeader,
};
use tracing::{debug, instrument, warn};

use crate::algorithm::{record_algorithm, require_family, resolve_algorithm, symmetric_secret, Resolved, Stage};
use crate::options::CoseOptions;

const MAC_FAMILIES: &[AlgorithmFamily] = &[AlgorithmFamily::Hmac];

fn resolve_for(
    key: &CoseKey,
    protected: &CoseHeaderMap,
    unprotected: &CoseHeaderMap,
    options: &CoseOptions,
    op: KeyOperation,
) -> Result<Resolved, CoseError> {
    let resolved = resolve_algorithm(options.algorithm, protected, unprotected, key, Stage::of(op))?;
    require_family(resolved.info, MAC_FAMILIES)?;
    check_key_for(key, resolved.info, op)?;
    Ok(resolved)
}

/// Authenticated fields shared by both MAC message kinds.
struct MacOutput {
    protected: ProtectedHeader,
    tag: Vec<u8>,
}

fn create_tag(
    provider: &dyn CryptoProvider,
    key: &CoseKey,
    context: AadContext,
    mut protected: CoseHeaderMap,
    unprotected: &CoseHeaderMap,
    payload: &[u8],
    options: &CoseOptions,
) -> Result<MacOutput, CoseError> {
    let resolved = resolve_for(key, &protected, unprotected, options, KeyOperation::MacCreate)?;
    record_algorithm(&resolved, &mut protected, unprotected);

    let content = resolve_content(Some(payload), options.detached())?;
    let protected = ProtectedHeader::from_map(protected)?;
    let aad = AadStructure::mac(context, protected.encoded_map_cbor(), &options.external_aad, content).encode()?;
    let tag = provider.mac(resolved.info, symmetric_secret(key)?, &aad)?;
    debug!(alg = resolved.info.name, aad_len = aad.len(), tag_len = tag.len(), "computed tag");
    Ok(MacOutput { protected, tag })
}

fn check_tag(
    provider: &dyn CryptoProvider,
    key: &CoseKey,
    info: &AlgorithmInfo,
    aad: &[u8],
    tag: &[u8],
) -> Result<(), CoseError> {
    provider
        .mac_verify(info, symmetric_secret(key)?, aad, tag)
        .map_err(|e| {
            warn!(alg = info.name, error = %e, "MAC verification failed");
            e.into()
        })
}

/// MAC `payload` into a COSE_Mac0.
///
/// An empty `payload` with [`CoseOptions::detached_content`] set produces a
/// detached message.
#[instrument(level = "debug", skip_all)]
pub fn mac0(
    provider: &dyn CryptoProvider,
    key: &MacKey,
    protected: CoseHeaderMap,
    unprotected: CoseHeaderMap,
    payload: &[u8],
    options: &CoseOptions,
) -> Result<CoseMac0, CoseError> {
    let output = create_tag(provider, key.key(), AadContext::Mac0, protected, &unprotected, payload, options)?;

    let builder = CoseMac0Builder::new()
        .protected_bytes(output.protected.encoded_map_cbor())?
        .unprotected(unprotected)
        .tag(output.tag);
    let builder = if payload.is_empty() {
        builder.detached_payload()?
    } else {
        builder.payload(payload)?
    };
    builder.build()
}

#[instrument(level = "debug", skip_all)]
pub fn verify_mac0(
    provider: &dyn CryptoProvider,
    key: &MacKey,
    message: &CoseMac0,
    options: &CoseOptions,
) -> Result<(), CoseError> {
    let key = key.key();
    let resolved = resolve_for(
        key,
        message.protected().header(),
        message.unprotected(),
        options,
        KeyOperation::MacVerify,
    )?;
    let aad = message.mac_structure(&options.external_aad, options.detached())?;
    check_tag(provider, key, resolved.info, &aad, message.tag())
}

/// MAC `payload` into a COSE_Mac carrying `recipients`.
#[instrument(level = "debug", skip_all, fields(recipients = recipients.len()))]
pub fn mac(
    provider: &dyn CryptoProvider,
    key: &MacKey,
    protected: CoseHeaderMap,
    unprotected: CoseHeaderMap,
    payload: &[u8],
    recipients: Vec<CoseRecipient>,
    options: &CoseOptions,
) -> Result<CoseMac, CoseError> {
    if recipients.is_empty() {
        return Err(BuilderError::MissingField("recipients").into());
    }
    let output = create_tag(provider, key.key(), AadContext::Mac, protected, &unprotected, payload, options)?;

    let builder = CoseMacBuilder::new()
        .protected_bytes(output.protected.encoded_map_cbor())?
        .unprotected(unprotected)
        .tag(output.tag)
        .recipients(recipients);
    let builder = if payload.is_empty() {
        builder.detached_payload()?
    } else {
        builder.payload(payload)?
    };
    builder.build()
}

#[instrument(level = "debug", skip_all)]
pub fn verify_mac(
    provider: &dyn CryptoProvider,
    key: &MacKey,
    message: &CoseMac,
    options: &CoseOptions,
) -> Result<(), CoseError> {
    let key = key.key();
    let resolved = resolve_for(
        key,
        message.protected().header(),
        message.unprotected(),
        options,
        KeyOperation::MacVerify,
    )?;
    let aad = message.mac_structure(&options.external_aad, options.detached())?;
    check_tag(provider, key, resolved.info, &aad, message.tag())
}
