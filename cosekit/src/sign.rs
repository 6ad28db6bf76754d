// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Sign (one or more signers) generation and verification.

use cosekit_abstractions::{BuilderError, CoseAlgorithm, CoseError, CoseHeaderMap, CryptoProvider, KeyOperation};
use cosekit_common::{
    check_key_for, resolve_content, AadStructure, CoseSign, CoseSignBuilder, CoseSignature, KeyRole, ProtectedHeader,
    SigningKey,
};
use tracing::{debug, instrument};

use crate::algorithm::{record_algorithm, require_family, resolve_algorithm, Stage};
use crate::options::CoseOptions;
use crate::signature::{check_signature, create_signature, SIGNATURE_FAMILIES};

/// One signer of a COSE_Sign: its key and its own header buckets.
#[derive(Debug, Clone)]
pub struct Signer<'a> {
    key: &'a SigningKey,
    algorithm: Option<CoseAlgorithm>,
    protected: CoseHeaderMap,
    unprotected: CoseHeaderMap,
}

impl<'a> Signer<'a> {
    pub fn new(key: &'a SigningKey) -> Self {
        Self {
            key,
            algorithm: None,
            protected: CoseHeaderMap::new(),
            unprotected: CoseHeaderMap::new(),
        }
    }

    /// Pin this signer's algorithm; overrides [`CoseOptions::algorithm`].
    pub fn with_algorithm(mut self, algorithm: CoseAlgorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn with_protected(mut self, protected: CoseHeaderMap) -> Self {
        self.protected = protected;
        self
    }

    pub fn with_unprotected(mut self, unprotected: CoseHeaderMap) -> Self {
        self.unprotected = unprotected;
        self
    }

    fn sign(
        self,
        provider: &dyn CryptoProvider,
        body_protected: &[u8],
        content: &[u8],
        options: &CoseOptions,
    ) -> Result<CoseSignature, CoseError> {
        let key = self.key.key();
        let explicit = self.algorithm.or(options.algorithm);
        let resolved = resolve_algorithm(explicit, &self.protected, &self.unprotected, key, Stage::Generate)?;
        require_family(resolved.info, SIGNATURE_FAMILIES)?;
        check_key_for(key, resolved.info, KeyOperation::Sign)?;

        let mut protected = self.protected;
        record_algorithm(&resolved, &mut protected, &self.unprotected);
        let protected = ProtectedHeader::from_map(protected)?;

        let tbs = AadStructure::signature(
            body_protected,
            protected.encoded_map_cbor(),
            &options.external_aad,
            content,
        )
        .encode()?;
        let signature = create_signature(provider, key, resolved.info, &tbs)?;

        CoseSignature::builder()
            .protected_bytes(protected.encoded_map_cbor())?
            .unprotected(self.unprotected)
            .signature(signature)
            .build()
    }
}

/// Sign `payload` once per signer into a COSE_Sign.
///
/// Body headers are shared by every signer. Detached content follows the
/// same rule as [`crate::sign1`].
#[instrument(level = "debug", skip_all, fields(signers = signers.len()))]
pub fn sign(
    provider: &dyn CryptoProvider,
    protected: CoseHeaderMap,
    unprotected: CoseHeaderMap,
    payload: &[u8],
    signers: Vec<Signer<'_>>,
    options: &CoseOptions,
) -> Result<CoseSign, CoseError> {
    if signers.is_empty() {
        return Err(BuilderError::MissingField("signatures").into());
    }
    let content = resolve_content(Some(payload), options.detached())?;
    let protected = ProtectedHeader::from_map(protected)?;

    let mut builder = CoseSignBuilder::new()
        .protected_bytes(protected.encoded_map_cbor())?
        .unprotected(unprotected);
    for signer in signers {
        let signature = signer.sign(provider, protected.encoded_map_cbor(), content, options)?;
        builder = builder.add_signature(signature);
    }
    builder = if payload.is_empty() {
        builder.detached_payload()?
    } else {
        builder.payload(payload)?
    };
    builder.build()
}

/// Verify the signature at `index` of a COSE_Sign with `key`.
#[instrument(level = "debug", skip_all, fields(index = index))]
pub fn verify_sign(
    provider: &dyn CryptoProvider,
    key: &SigningKey,
    message: &CoseSign,
    index: usize,
    options: &CoseOptions,
) -> Result<(), CoseError> {
    let signatures = message.signatures();
    let signature = signatures.get(index).ok_or(CoseError::NoSuchSignature {
        index,
        count: signatures.len(),
    })?;

    let key = key.key();
    let resolved = resolve_algorithm(
        options.algorithm,
        signature.protected().header(),
        signature.unprotected(),
        key,
        Stage::Check,
    )?;
    require_family(resolved.info, SIGNATURE_FAMILIES)?;
    check_key_for(key, resolved.info, KeyOperation::Verify)?;
    debug!(alg = resolved.info.name, "verifying signature");

    let tbs = message.tbs_data(signature, &options.external_aad, options.detached())?;
    check_signature(provider, key, resolved.info, &tbs, signature.signature())
}
