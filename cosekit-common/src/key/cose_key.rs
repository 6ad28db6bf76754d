// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Key (RFC 9052 §7, RFC 9053 §7).

use std::collections::BTreeMap;
use std::fmt;

use cosekit_abstractions::iana::key_param;
use cosekit_abstractions::{
    CoseError, CryptoProvider, Curve, DecodingError, HeaderKey, HeaderValue, KeyOperation, KeyType,
    KeyValidationError,
};
use minicbor::{Decoder, Encoder};
use zeroize::Zeroizing;

use crate::header_map::{decode_label_map, encoded_key, write_entries};

/// Secret byte string, wiped on drop.
pub type SecretBytes = Zeroizing<Vec<u8>>;

/// Type-specific key parameters.
#[derive(Clone, PartialEq, Eq)]
pub enum KeyParams {
    Ec2 {
        curve: Curve,
        x: Option<Vec<u8>>,
        y: Option<Vec<u8>>,
        d: Option<SecretBytes>,
    },
    Okp {
        curve: Curve,
        x: Option<Vec<u8>>,
        d: Option<SecretBytes>,
    },
    Symmetric {
        k: SecretBytes,
    },
}

impl KeyParams {
    pub fn key_type(&self) -> KeyType {
        match self {
            KeyParams::Ec2 { .. } => KeyType::Ec2,
            KeyParams::Okp { .. } => KeyType::Okp,
            KeyParams::Symmetric { .. } => KeyType::Symmetric,
        }
    }
}

impl fmt::Debug for KeyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |d: &Option<SecretBytes>| d.as_ref().map(|_| "<redacted>");
        match self {
            KeyParams::Ec2 { curve, x, y, d } => f
                .debug_struct("Ec2")
                .field("curve", curve)
                .field("x", x)
                .field("y", y)
                .field("d", &redacted(d))
                .finish(),
            KeyParams::Okp { curve, x, d } => f
                .debug_struct("Okp")
                .field("curve", curve)
                .field("x", x)
                .field("d", &redacted(d))
                .finish(),
            KeyParams::Symmetric { .. } => f.debug_struct("Symmetric").field("k", &"<redacted>").finish(),
        }
    }
}

/// A validated COSE_Key.
///
/// Immutable once constructed; use the per-variant builders to derive a
/// modified copy. Labels this model does not interpret are kept in
/// [`CoseKey::extra`] and written back on encode.
#[derive(Debug, Clone, PartialEq)]
pub struct CoseKey {
    pub(crate) kid: Option<Vec<u8>>,
    pub(crate) alg: Option<i64>,
    pub(crate) key_ops: Vec<KeyOperation>,
    pub(crate) base_iv: Option<Vec<u8>>,
    pub(crate) params: KeyParams,
    pub(crate) extra: BTreeMap<HeaderKey, HeaderValue>,
}

impl CoseKey {
    pub fn key_type(&self) -> KeyType {
        self.params.key_type()
    }

    pub fn params(&self) -> &KeyParams {
        &self.params
    }

    pub fn curve(&self) -> Option<Curve> {
        match &self.params {
            KeyParams::Ec2 { curve, .. } | KeyParams::Okp { curve, .. } => Some(*curve),
            KeyParams::Symmetric { .. } => None,
        }
    }

    pub fn kid(&self) -> Option<&[u8]> {
        self.kid.as_deref()
    }

    /// Algorithm the key is restricted to, if declared.
    pub fn alg(&self) -> Option<i64> {
        self.alg
    }

    /// Declared operations. Empty means unrestricted.
    pub fn key_ops(&self) -> &[KeyOperation] {
        &self.key_ops
    }

    pub fn base_iv(&self) -> Option<&[u8]> {
        self.base_iv.as_deref()
    }

    pub fn extra(&self) -> &BTreeMap<HeaderKey, HeaderValue> {
        &self.extra
    }

    /// Public x-coordinate (EC2) or public key (OKP).
    pub fn x(&self) -> Option<&[u8]> {
        match &self.params {
            KeyParams::Ec2 { x, .. } | KeyParams::Okp { x, .. } => x.as_deref(),
            KeyParams::Symmetric { .. } => None,
        }
    }

    pub fn y(&self) -> Option<&[u8]> {
        match &self.params {
            KeyParams::Ec2 { y, .. } => y.as_deref(),
            _ => None,
        }
    }

    /// Private scalar (EC2) or private key (OKP).
    pub fn d(&self) -> Option<&[u8]> {
        match &self.params {
            KeyParams::Ec2 { d, .. } | KeyParams::Okp { d, .. } => d.as_ref().map(|d| d.as_slice()),
            KeyParams::Symmetric { .. } => None,
        }
    }

    /// Symmetric key value.
    pub fn k(&self) -> Option<&[u8]> {
        match &self.params {
            KeyParams::Symmetric { k } => Some(k.as_slice()),
            _ => None,
        }
    }

    pub fn has_private_material(&self) -> bool {
        match &self.params {
            KeyParams::Ec2 { d, .. } | KeyParams::Okp { d, .. } => d.is_some(),
            KeyParams::Symmetric { .. } => true,
        }
    }

    pub fn has_public_material(&self) -> bool {
        self.x().is_some()
    }

    /// Public-only copy of this key.
    ///
    /// Missing public coordinates are derived from the private key through
    /// `provider`. Symmetric keys have no public part.
    pub fn to_public_key(&self, provider: &dyn CryptoProvider) -> Result<CoseKey, CoseError> {
        let params = match &self.params {
            KeyParams::Ec2 { curve, x: Some(x), y, .. } => KeyParams::Ec2 {
                curve: *curve,
                x: Some(x.clone()),
                y: y.clone(),
                d: None,
            },
            KeyParams::Okp { curve, x: Some(x), .. } => KeyParams::Okp {
                curve: *curve,
                x: Some(x.clone()),
                d: None,
            },
            KeyParams::Ec2 { curve, x: None, d, .. } | KeyParams::Okp { curve, x: None, d } => {
                let d = d
                    .as_ref()
                    .ok_or(KeyValidationError::MissingKeyMaterial("x or d"))?;
                let point = provider.derive_public_key(*curve, d)?;
                match curve.key_type() {
                    KeyType::Ec2 => KeyParams::Ec2 {
                        curve: *curve,
                        x: Some(point.x),
                        y: point.y,
                        d: None,
                    },
                    _ => KeyParams::Okp {
                        curve: *curve,
                        x: Some(point.x),
                        d: None,
                    },
                }
            }
            KeyParams::Symmetric { .. } => {
                return Err(KeyValidationError::NoPublicKey(KeyType::Symmetric).into());
            }
        };

        let key = CoseKey {
            params,
            ..self.clone()
        };
        key.validate()?;
        Ok(key)
    }

    /// Label map in canonical order: kty, kid, alg, key_ops, base_iv, then the
    /// type-specific parameters, then extension labels in deterministic CBOR order.
    pub fn compile(&self) -> Result<Vec<(HeaderKey, HeaderValue)>, CoseError> {
        let mut entries = Vec::with_capacity(9 + self.extra.len());

        entries.push((HeaderKey::Int(key_param::KTY), HeaderValue::Int(self.key_type().id())));
        if let Some(kid) = &self.kid {
            entries.push((HeaderKey::Int(key_param::KID), HeaderValue::Bytes(kid.clone())));
        }
        if let Some(alg) = self.alg {
            entries.push((HeaderKey::Int(key_param::ALG), HeaderValue::Int(alg)));
        }
        if !self.key_ops.is_empty() {
            let ops = self.key_ops.iter().map(|op| HeaderValue::Int(op.id())).collect();
            entries.push((HeaderKey::Int(key_param::KEY_OPS), HeaderValue::Array(ops)));
        }
        if let Some(base_iv) = &self.base_iv {
            entries.push((HeaderKey::Int(key_param::BASE_IV), HeaderValue::Bytes(base_iv.clone())));
        }

        match &self.params {
            KeyParams::Ec2 { curve, x, y, d } => {
                entries.push((HeaderKey::Int(key_param::CRV), HeaderValue::Int(curve.id())));
                push_bytes(&mut entries, key_param::X, x.as_deref());
                push_bytes(&mut entries, key_param::Y, y.as_deref());
                push_bytes(&mut entries, key_param::D, d.as_ref().map(|d| d.as_slice()));
            }
            KeyParams::Okp { curve, x, d } => {
                entries.push((HeaderKey::Int(key_param::CRV), HeaderValue::Int(curve.id())));
                push_bytes(&mut entries, key_param::X, x.as_deref());
                push_bytes(&mut entries, key_param::D, d.as_ref().map(|d| d.as_slice()));
            }
            KeyParams::Symmetric { k } => {
                push_bytes(&mut entries, key_param::K, Some(k.as_slice()));
            }
        }

        let mut extra = Vec::with_capacity(self.extra.len());
        for (key, value) in &self.extra {
            extra.push((encoded_key(key)?, key, value));
        }
        extra.sort_by(|a, b| a.0.cmp(&b.0));
        entries.extend(extra.into_iter().map(|(_, k, v)| (k.clone(), v.clone())));

        Ok(entries)
    }

    /// Encode as a CBOR map in canonical order.
    pub fn to_vec(&self) -> Result<Vec<u8>, CoseError> {
        let entries = self.compile()?;
        let mut enc = Encoder::new(Vec::new());
        write_entries(&mut enc, &entries)?;
        Ok(enc.into_writer())
    }

    /// Decode and validate a CBOR-encoded COSE_Key.
    pub fn from_slice(bytes: &[u8]) -> Result<CoseKey, CoseError> {
        if bytes.is_empty() {
            return Err(DecodingError::Empty.into());
        }
        let mut dec = Decoder::new(bytes);
        let map = decode_label_map(&mut dec, "COSE_Key")?;
        if dec.position() != bytes.len() {
            return Err(DecodingError::TrailingBytes("COSE_Key").into());
        }
        Ok(Self::from_label_map(map)?)
    }

    /// Interpret a decoded label map.
    pub fn from_label_map(mut map: BTreeMap<HeaderKey, HeaderValue>) -> Result<CoseKey, KeyValidationError> {
        let kty = match take(&mut map, key_param::KTY) {
            None => return Err(KeyValidationError::MissingKeyType),
            Some(HeaderValue::Int(v)) => v,
            Some(_) => {
                return Err(KeyValidationError::InvalidLabelValue {
                    label: key_param::KTY,
                    expected: "int",
                })
            }
        };
        let key_type = match KeyType::from_i64(kty) {
            Some(KeyType::Reserved) | None => return Err(KeyValidationError::UnsupportedKeyType(kty)),
            Some(t) => t,
        };

        let kid = take_bytes(&mut map, key_param::KID)?;
        let alg = take_int(&mut map, key_param::ALG)?;
        let key_ops = match take(&mut map, key_param::KEY_OPS) {
            None => Vec::new(),
            Some(HeaderValue::Array(items)) => items
                .iter()
                .map(|item| {
                    let id = item.as_i64().ok_or(KeyValidationError::InvalidLabelValue {
                        label: key_param::KEY_OPS,
                        expected: "array of int",
                    })?;
                    KeyOperation::from_i64(id).ok_or(KeyValidationError::UnsupportedKeyOperation(id))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(KeyValidationError::InvalidLabelValue {
                    label: key_param::KEY_OPS,
                    expected: "array of int",
                })
            }
        };
        let base_iv = take_bytes(&mut map, key_param::BASE_IV)?;

        let params = match key_type {
            KeyType::Ec2 => {
                let curve = take_curve(&mut map, KeyType::Ec2)?;
                KeyParams::Ec2 {
                    curve,
                    x: non_empty(take_bytes(&mut map, key_param::X)?),
                    y: non_empty(take_bytes(&mut map, key_param::Y)?),
                    d: non_empty(take_bytes(&mut map, key_param::D)?).map(Zeroizing::new),
                }
            }
            KeyType::Okp => {
                let curve = take_curve(&mut map, KeyType::Okp)?;
                KeyParams::Okp {
                    curve,
                    x: non_empty(take_bytes(&mut map, key_param::X)?),
                    d: non_empty(take_bytes(&mut map, key_param::D)?).map(Zeroizing::new),
                }
            }
            KeyType::Symmetric => {
                let k = take_bytes(&mut map, key_param::K)?.ok_or(KeyValidationError::MissingKeyMaterial("k"))?;
                KeyParams::Symmetric { k: Zeroizing::new(k) }
            }
            KeyType::Reserved => return Err(KeyValidationError::UnsupportedKeyType(kty)),
        };

        let key = CoseKey {
            kid,
            alg,
            key_ops,
            base_iv,
            params,
            extra: map,
        };
        key.validate()?;
        Ok(key)
    }

    /// Structural checks shared by decoding and the builders.
    pub(crate) fn validate(&self) -> Result<(), KeyValidationError> {
        match &self.params {
            KeyParams::Ec2 { curve, x, y, d } => {
                check_curve(*curve, KeyType::Ec2)?;
                match (x, y) {
                    (Some(_), None) | (None, Some(_)) => {
                        return Err(KeyValidationError::IncompleteKeyMaterial("x and y must both be present"))
                    }
                    (None, None) if d.is_none() => return Err(KeyValidationError::MissingKeyMaterial("x or d")),
                    _ => {}
                }
                check_len("x", x.as_deref(), *curve)?;
                check_len("y", y.as_deref(), *curve)?;
                check_len("d", d.as_ref().map(|d| d.as_slice()), *curve)?;
            }
            KeyParams::Okp { curve, x, d } => {
                check_curve(*curve, KeyType::Okp)?;
                if x.is_none() && d.is_none() {
                    return Err(KeyValidationError::MissingKeyMaterial("x or d"));
                }
                check_len("x", x.as_deref(), *curve)?;
                check_len("d", d.as_ref().map(|d| d.as_slice()), *curve)?;
            }
            KeyParams::Symmetric { k } => {
                if k.is_empty() {
                    return Err(KeyValidationError::MissingKeyMaterial("k"));
                }
            }
        }
        Ok(())
    }
}

fn push_bytes(entries: &mut Vec<(HeaderKey, HeaderValue)>, label: i64, value: Option<&[u8]>) {
    if let Some(v) = value {
        entries.push((HeaderKey::Int(label), HeaderValue::Bytes(v.to_vec())));
    }
}

fn take(map: &mut BTreeMap<HeaderKey, HeaderValue>, label: i64) -> Option<HeaderValue> {
    map.remove(&HeaderKey::Int(label))
}

fn take_bytes(map: &mut BTreeMap<HeaderKey, HeaderValue>, label: i64) -> Result<Option<Vec<u8>>, KeyValidationError> {
    match take(map, label) {
        None => Ok(None),
        Some(HeaderValue::Bytes(b)) => Ok(Some(b)),
        Some(_) => Err(KeyValidationError::InvalidLabelValue { label, expected: "bstr" }),
    }
}

fn take_int(map: &mut BTreeMap<HeaderKey, HeaderValue>, label: i64) -> Result<Option<i64>, KeyValidationError> {
    match take(map, label) {
        None => Ok(None),
        Some(HeaderValue::Int(i)) => Ok(Some(i)),
        Some(_) => Err(KeyValidationError::InvalidLabelValue { label, expected: "int" }),
    }
}

fn take_curve(map: &mut BTreeMap<HeaderKey, HeaderValue>, key_type: KeyType) -> Result<Curve, KeyValidationError> {
    let id = take_int(map, key_param::CRV)?.ok_or(KeyValidationError::MissingCurve)?;
    let curve = Curve::from_i64(id).ok_or(KeyValidationError::UnsupportedCurve { curve: id, key_type })?;
    check_curve(curve, key_type)?;
    Ok(curve)
}

fn check_curve(curve: Curve, key_type: KeyType) -> Result<(), KeyValidationError> {
    if curve.key_type() != key_type {
        return Err(KeyValidationError::UnsupportedCurve {
            curve: curve.id(),
            key_type,
        });
    }
    Ok(())
}

fn check_len(field: &'static str, value: Option<&[u8]>, curve: Curve) -> Result<(), KeyValidationError> {
    match value {
        Some(v) if v.len() != curve.coordinate_len() => Err(KeyValidationError::InvalidKeyLength {
            field,
            expected: curve.coordinate_len(),
            actual: v.len(),
        }),
        _ => Ok(()),
    }
}

// A zero-length bstr claims material without carrying any.
fn non_empty(value: Option<Vec<u8>>) -> Option<Vec<u8>> {
    value.filter(|v| !v.is_empty())
}
