// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Key model, builders, usage roles and compatibility checks.

pub mod builder;
pub mod compat;
pub mod cose_key;
pub mod roles;

pub use builder::{Ec2KeyBuilder, OkpKeyBuilder, SymmetricKeyBuilder};
pub use cose_key::{CoseKey, KeyParams, SecretBytes};
pub use roles::{validate_usage, EncryptionKey, KeyAgreementKey, KeyRole, MacKey, SigningKey};
