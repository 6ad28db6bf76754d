// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-variant COSE_Key builders.
//!
//! Each builder can be seeded from an existing key ([`Ec2KeyBuilder::from_key`]
//! and friends), which yields a new value with explicit overrides; the source
//! key is never touched. The field order of calls has no effect on the
//! encoding, see [`CoseKey::compile`].

use std::collections::BTreeMap;

use cosekit_abstractions::iana::key_param;
use cosekit_abstractions::{
    CoseError, Curve, HeaderKey, HeaderValue, KeyOperation, KeyType, KeyUsage, KeyValidationError,
};
use zeroize::Zeroizing;

use super::cose_key::{CoseKey, KeyParams, SecretBytes};
use super::roles::{check_operations, validate_usage};

#[derive(Debug, Clone, Default)]
struct CommonFields {
    kid: Option<Vec<u8>>,
    alg: Option<i64>,
    key_ops: Vec<KeyOperation>,
    base_iv: Option<Vec<u8>>,
    extra: BTreeMap<HeaderKey, HeaderValue>,
    usage: Option<KeyUsage>,
}

impl CommonFields {
    fn from_key(key: &CoseKey) -> Self {
        Self {
            kid: key.kid.clone(),
            alg: key.alg,
            key_ops: key.key_ops.clone(),
            base_iv: key.base_iv.clone(),
            extra: key.extra.clone(),
            usage: None,
        }
    }

    fn add_operation(&mut self, op: KeyOperation) -> Result<(), KeyValidationError> {
        if self.key_ops.contains(&op) {
            return Ok(());
        }
        let mut ops = self.key_ops.clone();
        ops.push(op);
        if let Some(usage) = self.usage {
            check_operations(usage, &ops, false)?;
        }
        self.key_ops = ops;
        Ok(())
    }

    fn set_label(&mut self, key: HeaderKey, value: HeaderValue, reserved: &[i64]) -> Result<(), KeyValidationError> {
        if let HeaderKey::Int(label) = key {
            if key_param::CANONICAL_COMMON.contains(&label) || reserved.contains(&label) {
                return Err(KeyValidationError::ReservedLabel(label));
            }
        }
        self.extra.insert(key, value);
        Ok(())
    }

    fn finish(self, params: KeyParams) -> Result<CoseKey, KeyValidationError> {
        let usage = self.usage;
        let key = CoseKey {
            kid: self.kid,
            alg: self.alg,
            key_ops: self.key_ops,
            base_iv: self.base_iv,
            params,
            extra: self.extra,
        };
        key.validate()?;
        if let Some(usage) = usage {
            validate_usage(&key, usage)?;
        }
        Ok(key)
    }
}

fn wrong_type(expected: KeyType, key: &CoseKey) -> KeyValidationError {
    KeyValidationError::WrongKeyType {
        expected,
        actual: key.key_type(),
    }
}

macro_rules! common_setters {
    ($reserved:expr) => {
        /// Restrict the key to `usage`: its operation whitelist is checked as
        /// operations are added, and its type/curve when built.
        pub fn usage(mut self, usage: KeyUsage) -> Result<Self, KeyValidationError> {
            check_operations(usage, &self.common.key_ops, false)?;
            self.common.usage = Some(usage);
            Ok(self)
        }

        pub fn kid(mut self, kid: impl Into<Vec<u8>>) -> Self {
            self.common.kid = Some(kid.into());
            self
        }

        pub fn alg(mut self, alg: impl Into<i64>) -> Self {
            self.common.alg = Some(alg.into());
            self
        }

        /// Fails immediately when `op` is outside the usage whitelist.
        pub fn add_operation(mut self, op: KeyOperation) -> Result<Self, KeyValidationError> {
            self.common.add_operation(op)?;
            Ok(self)
        }

        pub fn clear_operations(mut self) -> Self {
            self.common.key_ops.clear();
            self
        }

        pub fn base_iv(mut self, base_iv: impl Into<Vec<u8>>) -> Self {
            self.common.base_iv = Some(base_iv.into());
            self
        }

        /// Extension parameter. Labels with a defined meaning are rejected.
        pub fn label(mut self, key: impl Into<HeaderKey>, value: impl Into<HeaderValue>) -> Result<Self, KeyValidationError> {
            self.common.set_label(key.into(), value.into(), $reserved)?;
            Ok(self)
        }

        /// Build, then emit the label map in canonical order.
        pub fn compile(self) -> Result<Vec<(HeaderKey, HeaderValue)>, CoseError> {
            self.build()?.compile()
        }
    };
}

/// Builder for EC2 keys.
#[derive(Clone, Default)]
pub struct Ec2KeyBuilder {
    common: CommonFields,
    curve: Option<Curve>,
    x: Option<Vec<u8>>,
    y: Option<Vec<u8>>,
    d: Option<SecretBytes>,
}

impl Ec2KeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed every field from an existing EC2 key.
    pub fn from_key(key: &CoseKey) -> Result<Self, KeyValidationError> {
        match key.params() {
            KeyParams::Ec2 { curve, x, y, d } => Ok(Self {
                common: CommonFields::from_key(key),
                curve: Some(*curve),
                x: x.clone(),
                y: y.clone(),
                d: d.clone(),
            }),
            _ => Err(wrong_type(KeyType::Ec2, key)),
        }
    }

    common_setters!(&[key_param::CRV, key_param::X, key_param::Y, key_param::D]);

    pub fn curve(mut self, curve: Curve) -> Self {
        self.curve = Some(curve);
        self
    }

    pub fn x(mut self, x: impl Into<Vec<u8>>) -> Self {
        self.x = Some(x.into());
        self
    }

    pub fn y(mut self, y: impl Into<Vec<u8>>) -> Self {
        self.y = Some(y.into());
        self
    }

    pub fn d(mut self, d: impl Into<Vec<u8>>) -> Self {
        self.d = Some(Zeroizing::new(d.into()));
        self
    }

    /// Drop the private scalar, leaving a public-only key.
    pub fn clear_private(mut self) -> Self {
        self.d = None;
        self
    }

    pub fn build(self) -> Result<CoseKey, KeyValidationError> {
        let curve = self.curve.ok_or(KeyValidationError::MissingCurve)?;
        self.common.finish(KeyParams::Ec2 {
            curve,
            x: self.x,
            y: self.y,
            d: self.d,
        })
    }
}

/// Builder for OKP keys.
#[derive(Clone, Default)]
pub struct OkpKeyBuilder {
    common: CommonFields,
    curve: Option<Curve>,
    x: Option<Vec<u8>>,
    d: Option<SecretBytes>,
}

impl OkpKeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_key(key: &CoseKey) -> Result<Self, KeyValidationError> {
        match key.params() {
            KeyParams::Okp { curve, x, d } => Ok(Self {
                common: CommonFields::from_key(key),
                curve: Some(*curve),
                x: x.clone(),
                d: d.clone(),
            }),
            _ => Err(wrong_type(KeyType::Okp, key)),
        }
    }

    common_setters!(&[key_param::CRV, key_param::X, key_param::D]);

    pub fn curve(mut self, curve: Curve) -> Self {
        self.curve = Some(curve);
        self
    }

    pub fn x(mut self, x: impl Into<Vec<u8>>) -> Self {
        self.x = Some(x.into());
        self
    }

    pub fn d(mut self, d: impl Into<Vec<u8>>) -> Self {
        self.d = Some(Zeroizing::new(d.into()));
        self
    }

    pub fn clear_private(mut self) -> Self {
        self.d = None;
        self
    }

    pub fn build(self) -> Result<CoseKey, KeyValidationError> {
        let curve = self.curve.ok_or(KeyValidationError::MissingCurve)?;
        // Empty byte strings claim material without carrying any.
        let x = self.x.filter(|x| !x.is_empty());
        let d = self.d.filter(|d| !d.is_empty());
        self.common.finish(KeyParams::Okp { curve, x, d })
    }
}

/// Builder for symmetric keys.
#[derive(Clone, Default)]
pub struct SymmetricKeyBuilder {
    common: CommonFields,
    k: Option<SecretBytes>,
}

impl SymmetricKeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_key(key: &CoseKey) -> Result<Self, KeyValidationError> {
        match key.params() {
            KeyParams::Symmetric { k } => Ok(Self {
                common: CommonFields::from_key(key),
                k: Some(k.clone()),
            }),
            _ => Err(wrong_type(KeyType::Symmetric, key)),
        }
    }

    common_setters!(&[key_param::K]);

    pub fn k(mut self, k: impl Into<Vec<u8>>) -> Self {
        self.k = Some(Zeroizing::new(k.into()));
        self
    }

    pub fn build(self) -> Result<CoseKey, KeyValidationError> {
        let k = self.k.ok_or(KeyValidationError::MissingKeyMaterial("k"))?;
        self.common.finish(KeyParams::Symmetric { k })
    }
}
