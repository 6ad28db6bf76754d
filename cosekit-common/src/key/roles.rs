// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Usage-restricted key wrappers.
//!
//! A [`CoseKey`] carries no usage of its own. Wrapping it in one of the role
//! types checks, once, that its type, curve and declared operations fit that
//! usage; orchestration entry points take the role type.

use cosekit_abstractions::{KeyOperation, KeyUsage, KeyValidationError};

use super::cose_key::CoseKey;

/// Check that `key` can serve `usage`.
///
/// Declared operations must be drawn from the usage's whitelist, and for
/// Encryption / Mac a non-empty list must contain both operations.
pub fn validate_usage(key: &CoseKey, usage: KeyUsage) -> Result<(), KeyValidationError> {
    if !usage.supports(key.key_type(), key.curve()) {
        return Err(KeyValidationError::IncompatibleUsage {
            usage,
            key_type: key.key_type(),
            curve: key.curve(),
        });
    }
    check_operations(usage, key.key_ops(), true)
}

/// `complete` additionally enforces the joint-operations rule, which only
/// applies once the list is final.
pub(crate) fn check_operations(
    usage: KeyUsage,
    operations: &[KeyOperation],
    complete: bool,
) -> Result<(), KeyValidationError> {
    let incompatible = || KeyValidationError::IncompatibleOperations {
        usage,
        operations: operations.to_vec(),
    };

    if operations.iter().any(|op| !usage.permits(*op)) {
        return Err(incompatible());
    }
    if complete
        && usage.requires_joint_operations()
        && !operations.is_empty()
        && !usage.permitted_operations().iter().all(|op| operations.contains(op))
    {
        return Err(incompatible());
    }
    Ok(())
}

/// Capability shared by the usage-restricted wrappers.
pub trait KeyRole: Sized {
    const USAGE: KeyUsage;

    /// Wrap `key` after checking it fits [`KeyRole::USAGE`].
    fn from_key(key: CoseKey) -> Result<Self, KeyValidationError>;

    fn key(&self) -> &CoseKey;

    fn into_key(self) -> CoseKey;
}

macro_rules! key_role {
    ($(#[$meta:meta])* $name:ident, $usage:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(CoseKey);

        impl KeyRole for $name {
            const USAGE: KeyUsage = $usage;

            fn from_key(key: CoseKey) -> Result<Self, KeyValidationError> {
                validate_usage(&key, Self::USAGE)?;
                Ok(Self(key))
            }

            fn key(&self) -> &CoseKey {
                &self.0
            }

            fn into_key(self) -> CoseKey {
                self.0
            }
        }

        impl TryFrom<CoseKey> for $name {
            type Error = KeyValidationError;

            fn try_from(key: CoseKey) -> Result<Self, Self::Error> {
                <Self as KeyRole>::from_key(key)
            }
        }

        impl AsRef<CoseKey> for $name {
            fn as_ref(&self) -> &CoseKey {
                &self.0
            }
        }
    };
}

key_role!(
    /// EC2 (P-256/384/521) or OKP (Ed25519/Ed448) key for signatures.
    SigningKey,
    KeyUsage::Signing
);
key_role!(
    /// EC2 (P-curve) or OKP (X25519/X448) key for key agreement.
    KeyAgreementKey,
    KeyUsage::KeyAgreement
);
key_role!(
    /// Symmetric content-encryption key.
    EncryptionKey,
    KeyUsage::Encryption
);
key_role!(
    /// Symmetric MAC key.
    MacKey,
    KeyUsage::Mac
);
