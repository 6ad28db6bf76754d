// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! ECDSA signature format conversion (DER <-> fixed-size `r || s`).
//!
//! Many crypto backends produce and consume DER-encoded ECDSA signatures:
//!
//! ```text
//! SEQUENCE { INTEGER r, INTEGER s }
//! ```
//!
//! COSE (RFC 9053 §2.1) carries the fixed-size concatenation of `r` and `s`,
//! each left-padded to the curve field size. Both directions go through the
//! curve crates' `ecdsa::Signature`, so only canonical DER with in-range
//! scalars is accepted.

use std::fmt::Display;

use cosekit_abstractions::CryptoError;

fn bad_signature(e: impl Display) -> CryptoError {
    CryptoError::InvalidSignature(format!("bad ECDSA signature: {e}"))
}

macro_rules! ecdsa_codec {
    ($module:ident, $curve:ident) => {
        mod $module {
            use cosekit_abstractions::CryptoError;
            use $curve::ecdsa::Signature;

            use super::bad_signature;

            pub(super) fn der_to_fixed(der: &[u8]) -> Result<Vec<u8>, CryptoError> {
                let signature = Signature::from_der(der).map_err(bad_signature)?;
                Ok(signature.to_bytes().to_vec())
            }

            pub(super) fn fixed_to_der(fixed: &[u8]) -> Result<Vec<u8>, CryptoError> {
                let signature = Signature::from_slice(fixed).map_err(bad_signature)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
        }
    };
}

ecdsa_codec!(p256_codec, p256);
ecdsa_codec!(p384_codec, p384);
ecdsa_codec!(p521_codec, p521);

fn unsupported_field(field_size: usize) -> CryptoError {
    CryptoError::InvalidSignature(format!("no ECDSA curve with a {field_size} byte field"))
}

/// Convert a DER-encoded ECDSA signature to fixed-size `r || s`.
pub fn ecdsa_der_to_fixed(der: &[u8], field_size: usize) -> Result<Vec<u8>, CryptoError> {
    match field_size {
        32 => p256_codec::der_to_fixed(der),
        48 => p384_codec::der_to_fixed(der),
        66 => p521_codec::der_to_fixed(der),
        other => Err(unsupported_field(other)),
    }
}

/// Convert a fixed-size `r || s` ECDSA signature to DER.
pub fn ecdsa_fixed_to_der(fixed: &[u8], field_size: usize) -> Result<Vec<u8>, CryptoError> {
    if fixed.len() != field_size * 2 {
        return Err(CryptoError::InvalidSignature(format!(
            "expected {} byte ECDSA signature, got {}",
            field_size * 2,
            fixed.len()
        )));
    }
    match field_size {
        32 => p256_codec::fixed_to_der(fixed),
        48 => p384_codec::fixed_to_der(fixed),
        66 => p521_codec::fixed_to_der(fixed),
        other => Err(unsupported_field(other)),
    }
}
