// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Algorithm selection and key checks shared by the entry points.

use cosekit_abstractions::iana::header;
use cosekit_abstractions::{
    AlgorithmFamily, AlgorithmInfo, CoseAlgorithm, CoseError, CoseHeaderMap, KeyOperation, KeyValidationError,
};
use cosekit_common::CoseKey;
use tracing::debug;

/// Where the resolved algorithm came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum AlgorithmSource {
    Option,
    Protected,
    Unprotected,
    Key,
}

/// Whether a message is being produced or checked.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Stage {
    Generate,
    Check,
}

impl Stage {
    pub(crate) fn of(op: KeyOperation) -> Self {
        match op {
            KeyOperation::Sign | KeyOperation::MacCreate | KeyOperation::Encrypt => Stage::Generate,
            _ => Stage::Check,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Resolved {
    pub(crate) info: &'static AlgorithmInfo,
    pub(crate) source: AlgorithmSource,
}

impl Resolved {
    /// Whether generation must record the algorithm in the protected header.
    pub(crate) fn needs_header(&self) -> bool {
        matches!(self.source, AlgorithmSource::Option | AlgorithmSource::Key)
    }
}

/// Resolve the algorithm for one operation.
///
/// Precedence: `explicit`, protected `alg`, unprotected `alg`, the key's
/// declared algorithm. Explicit and header values must agree with each other;
/// agreement with the key is checked by `check_key_for`.
///
/// When checking a received message the unprotected `alg` is not
/// authenticated, so it only has to agree with the key's declared algorithm
/// and never selects one by itself.
pub(crate) fn resolve_algorithm(
    explicit: Option<CoseAlgorithm>,
    protected: &CoseHeaderMap,
    unprotected: &CoseHeaderMap,
    key: &CoseKey,
    stage: Stage,
) -> Result<Resolved, CoseError> {
    let candidates = [
        (explicit.map(CoseAlgorithm::id), AlgorithmSource::Option),
        (protected.algorithm(), AlgorithmSource::Protected),
        (unprotected.algorithm(), AlgorithmSource::Unprotected),
    ];

    let mut chosen: Option<(i64, AlgorithmSource)> = None;
    for (id, source) in candidates {
        let Some(id) = id else { continue };
        match chosen {
            None => chosen = Some((id, source)),
            Some((first, _)) if first != id => {
                return Err(CoseError::AlgorithmConflict { first, second: id });
            }
            Some(_) => {}
        }
    }

    if let (Stage::Check, Some((unprotected_id, AlgorithmSource::Unprotected))) = (stage, chosen) {
        let declared = key.alg().ok_or(CoseError::MissingHeader("alg"))?;
        if declared != unprotected_id {
            return Err(CoseError::AlgorithmConflict {
                first: declared,
                second: unprotected_id,
            });
        }
        chosen = Some((declared, AlgorithmSource::Key));
    }

    let (id, source) = match (chosen, key.alg()) {
        (Some(found), _) => found,
        (None, Some(declared)) => (declared, AlgorithmSource::Key),
        (None, None) => return Err(CoseError::MissingHeader("alg")),
    };
    let algorithm = CoseAlgorithm::try_from(id)?;
    debug!(alg = algorithm.info().name, ?source, "resolved algorithm");
    Ok(Resolved {
        info: algorithm.info(),
        source,
    })
}

/// Reject algorithms outside the families an operation can run.
pub(crate) fn require_family(info: &AlgorithmInfo, families: &[AlgorithmFamily]) -> Result<(), CoseError> {
    if families.contains(&info.family) {
        return Ok(());
    }
    Err(KeyValidationError::AlgorithmNotAllowed {
        algorithm: info.name,
        reason: format!("{:?} algorithms cannot be used here", info.family),
    }
    .into())
}

/// Record an algorithm taken from options or the key in the protected header,
/// unless either header bucket already names one.
pub(crate) fn record_algorithm(resolved: &Resolved, protected: &mut CoseHeaderMap, unprotected: &CoseHeaderMap) {
    if resolved.needs_header() && protected.algorithm().is_none() && unprotected.algorithm().is_none() {
        protected.insert(header::ALG, resolved.info.algorithm.id());
    }
}

pub(crate) fn private_scalar(key: &CoseKey) -> Result<&[u8], CoseError> {
    key.d().ok_or_else(|| KeyValidationError::MissingKeyMaterial("d").into())
}

pub(crate) fn symmetric_secret(key: &CoseKey) -> Result<&[u8], CoseError> {
    key.k().ok_or_else(|| KeyValidationError::MissingKeyMaterial("k").into())
}
