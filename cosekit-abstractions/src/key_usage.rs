// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Key usage capabilities.

use std::fmt;

use crate::iana::{Curve, KeyOperation, KeyType};

/// What a key may be used for.
///
/// This is a behavioral restriction layered over the key variants, not a
/// separate storage type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KeyUsage {
    Signing,
    KeyAgreement,
    Encryption,
    Mac,
}

impl KeyUsage {
    /// Operations a key with this usage may declare in `key_ops`.
    pub fn permitted_operations(self) -> &'static [KeyOperation] {
        match self {
            KeyUsage::Signing => &[KeyOperation::Sign, KeyOperation::Verify],
            KeyUsage::KeyAgreement => &[KeyOperation::WrapKey, KeyOperation::UnwrapKey],
            KeyUsage::Encryption => &[KeyOperation::Encrypt, KeyOperation::Decrypt],
            KeyUsage::Mac => &[KeyOperation::MacCreate, KeyOperation::MacVerify],
        }
    }

    /// Whether a non-empty `key_ops` must contain every permitted operation.
    pub fn requires_joint_operations(self) -> bool {
        matches!(self, KeyUsage::Encryption | KeyUsage::Mac)
    }

    pub fn permits(self, op: KeyOperation) -> bool {
        self.permitted_operations().contains(&op)
    }

    /// Whether a key of `key_type` on `curve` can serve this usage.
    pub fn supports(self, key_type: KeyType, curve: Option<Curve>) -> bool {
        match (self, key_type, curve) {
            (KeyUsage::Signing, KeyType::Ec2 | KeyType::Okp, Some(c)) => {
                c.supports_signing() && c.key_type() == key_type
            }
            (KeyUsage::KeyAgreement, KeyType::Ec2 | KeyType::Okp, Some(c)) => {
                c.supports_key_agreement() && c.key_type() == key_type
            }
            (KeyUsage::Encryption | KeyUsage::Mac, KeyType::Symmetric, _) => true,
            _ => false,
        }
    }
}

impl fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyUsage::Signing => "signing",
            KeyUsage::KeyAgreement => "key agreement",
            KeyUsage::Encryption => "encryption",
            KeyUsage::Mac => "MAC",
        };
        f.write_str(name)
    }
}
