// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE wire model over `minicbor`.
//!
//! - header map codec and [`ProtectedHeader`]
//! - COSE_Key model, builders and usage roles ([`key`])
//! - authenticated-data structures ([`structures`])
//! - message envelopes ([`message`])
//! - ECDSA signature normalization ([`ecdsa_signature`])
//!
//! Nothing here performs cryptography; see `cosekit-crypto` and the `cosekit` facade.

pub mod ecdsa_signature;
pub mod header_map;
pub mod key;
pub mod message;
pub mod structures;

pub use ecdsa_signature::{ecdsa_der_to_fixed, ecdsa_fixed_to_der};
pub use header_map::{decode_header_map_bytes, encode_header_map, ProtectedHeader, MAX_HEADER_VALUE_DEPTH};
pub use key::compat::{
    check_key_for, verify_algorithm_allowed_by_key, verify_algorithm_matches_key, verify_operation_allowed_by_key,
};
pub use key::{
    validate_usage, CoseKey, Ec2KeyBuilder, EncryptionKey, KeyAgreementKey, KeyParams, KeyRole, MacKey,
    OkpKeyBuilder, SecretBytes, SigningKey, SymmetricKeyBuilder,
};
pub use message::encrypt::{CoseEncrypt, CoseEncryptBuilder};
pub use message::encrypt0::{CoseEncrypt0, CoseEncrypt0Builder};
pub use message::mac::{CoseMac, CoseMacBuilder};
pub use message::mac0::{CoseMac0, CoseMac0Builder};
pub use message::recipient::{CoseRecipient, CoseRecipientBuilder};
pub use message::sign::{CoseSign, CoseSignBuilder, CoseSignature, CoseSignatureBuilder};
pub use message::sign1::{CoseSign1, CoseSign1Builder};
pub use message::{resolve_content, CoseStructure, MAX_RECIPIENT_DEPTH};
pub use structures::{AadContext, AadStructure};
