// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Key generation and key agreement.

use cosekit_abstractions::{
    AlgorithmFamily, CoseAlgorithm, CoseError, CryptoError, CryptoProvider, Curve, KeyType, KeyValidationError,
    PublicKeyRef,
};
use cosekit_common::{CoseKey, Ec2KeyBuilder, KeyAgreementKey, KeyRole, OkpKeyBuilder, SymmetricKeyBuilder};
use tracing::{debug, instrument};
use zeroize::Zeroizing;

use crate::algorithm::private_scalar;

fn require_key_type(curve: Curve, key_type: KeyType) -> Result<(), KeyValidationError> {
    if curve.key_type() == key_type {
        Ok(())
    } else {
        Err(KeyValidationError::UnsupportedCurve {
            curve: curve.id(),
            key_type,
        })
    }
}

/// Fresh EC2 key pair on a P-curve, carrying `x`, `y` and `d`.
#[instrument(level = "debug", skip(provider))]
pub fn generate_ec2_key(provider: &dyn CryptoProvider, curve: Curve) -> Result<CoseKey, CoseError> {
    require_key_type(curve, KeyType::Ec2)?;
    let pair = provider.generate_key_pair(curve)?;
    let y = pair
        .public
        .y
        .ok_or_else(|| CryptoError::Provider(format!("{curve} key pair without a y-coordinate")))?;
    Ok(Ec2KeyBuilder::new()
        .curve(curve)
        .x(pair.public.x)
        .y(y)
        .d(pair.d.as_slice())
        .build()?)
}

/// Fresh OKP key pair (Ed25519, X25519, ...), carrying `x` and `d`.
#[instrument(level = "debug", skip(provider))]
pub fn generate_okp_key(provider: &dyn CryptoProvider, curve: Curve) -> Result<CoseKey, CoseError> {
    require_key_type(curve, KeyType::Okp)?;
    let pair = provider.generate_key_pair(curve)?;
    Ok(OkpKeyBuilder::new()
        .curve(curve)
        .x(pair.public.x)
        .d(pair.d.as_slice())
        .build()?)
}

/// Fresh symmetric key sized for `algorithm`, which is recorded in the key.
///
/// AES-GCM keys take the registry length; HMAC keys take the digest length.
#[instrument(level = "debug", skip(provider))]
pub fn generate_symmetric_key(provider: &dyn CryptoProvider, algorithm: CoseAlgorithm) -> Result<CoseKey, CoseError> {
    let info = algorithm.info();
    let len = match (info.key_len, info.family, info.hash) {
        (Some(len), _, _) => len,
        (None, AlgorithmFamily::Hmac, Some(hash)) => hash.output_len(),
        _ => {
            return Err(KeyValidationError::AlgorithmNotAllowed {
                algorithm: info.name,
                reason: "no symmetric key length is defined".to_string(),
            }
            .into())
        }
    };
    let k = Zeroizing::new(provider.random_bytes(len)?);
    debug!(alg = info.name, len, "generated symmetric key");
    Ok(SymmetricKeyBuilder::new().alg(algorithm).k(k.as_slice()).build()?)
}

/// Raw ECDH / X25519 shared secret between `private` and `peer`.
///
/// Both keys must be on the same curve. `peer` may carry only `d`, in which
/// case its public point is derived.
#[instrument(level = "debug", skip_all)]
pub fn key_agreement(
    provider: &dyn CryptoProvider,
    private: &KeyAgreementKey,
    peer: &KeyAgreementKey,
) -> Result<Zeroizing<Vec<u8>>, CoseError> {
    let (private, peer) = (private.key(), peer.key());
    let curve = private.curve().ok_or(KeyValidationError::MissingCurve)?;
    let peer_curve = peer.curve().ok_or(KeyValidationError::MissingCurve)?;
    if curve != peer_curve {
        return Err(CryptoError::InvalidKey(format!("curve mismatch: {curve} vs {peer_curve}")).into());
    }

    let d = private_scalar(private)?;
    let shared = match peer.x() {
        Some(x) => provider.key_agreement(d, PublicKeyRef { curve, x, y: peer.y() })?,
        None => {
            let point = provider.derive_public_key(curve, private_scalar(peer)?)?;
            provider.key_agreement(d, point.as_key_ref(curve))?
        }
    };
    debug!(%curve, len = shared.len(), "derived shared secret");
    Ok(shared)
}
