// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared helpers for `cosekit` integration tests.
//!
//! Key fixtures, a once-only tracing subscriber (enable output with
//! `RUST_LOG=cosekit=debug`), and small header constructors.

#![allow(dead_code)]

use std::sync::Once;

use cosekit::{
    CoseAlgorithm, CoseHeaderMap, CoseKey, Curve, Ec2KeyBuilder, EncryptionKey, KeyAgreementKey, KeyRole, MacKey,
    RustCryptoProvider, SigningKey, SymmetricKeyBuilder,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

static INIT: Once = Once::new();

/// HMAC key `our-secret` used by the RFC 9052 MAC examples.
pub(crate) const OUR_SECRET: &str = "849B57219DAE48DE646D07DBB533566E976686457C1491BE3A76DCEA6C427188";

pub(crate) fn init_tracer() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).expect("subscriber set");
    });
}

pub(crate) fn provider() -> RustCryptoProvider {
    init_tracer();
    RustCryptoProvider::new()
}

pub(crate) fn signing_key(curve: Curve) -> SigningKey {
    let key = match curve {
        Curve::P256 | Curve::P384 | Curve::P521 => cosekit::generate_ec2_key(&provider(), curve),
        _ => cosekit::generate_okp_key(&provider(), curve),
    }
    .expect("generate key");
    SigningKey::from_key(key).expect("signing key")
}

/// Public-only copy of a signing key.
pub(crate) fn public_signing_key(key: &SigningKey) -> SigningKey {
    let public = key.key().to_public_key(&provider()).expect("public key");
    SigningKey::from_key(public).expect("signing key")
}

pub(crate) fn agreement_key(curve: Curve) -> KeyAgreementKey {
    let key = match curve {
        Curve::P256 | Curve::P384 | Curve::P521 => cosekit::generate_ec2_key(&provider(), curve),
        _ => cosekit::generate_okp_key(&provider(), curve),
    }
    .expect("generate key");
    KeyAgreementKey::from_key(key).expect("agreement key")
}

pub(crate) fn mac_key(k: &[u8]) -> MacKey {
    let key = SymmetricKeyBuilder::new().k(k).build().expect("symmetric key");
    MacKey::from_key(key).expect("mac key")
}

pub(crate) fn our_secret() -> MacKey {
    mac_key(&hex::decode(OUR_SECRET).unwrap())
}

pub(crate) fn encryption_key(alg: CoseAlgorithm) -> EncryptionKey {
    let key = cosekit::generate_symmetric_key(&provider(), alg).expect("generate key");
    EncryptionKey::from_key(key).expect("encryption key")
}

pub(crate) fn encryption_key_from(k: &[u8], base_iv: Option<&[u8]>) -> EncryptionKey {
    let mut builder = SymmetricKeyBuilder::new().k(k);
    if let Some(base_iv) = base_iv {
        builder = builder.base_iv(base_iv);
    }
    EncryptionKey::from_key(builder.build().expect("symmetric key")).expect("encryption key")
}

/// P-256 key carrying only the private scalar.
pub(crate) fn p256_private_only() -> (SigningKey, CoseKey) {
    let full = cosekit::generate_ec2_key(&provider(), Curve::P256).expect("generate key");
    let d_only = Ec2KeyBuilder::new()
        .curve(Curve::P256)
        .d(full.d().expect("d"))
        .build()
        .expect("d-only key");
    (SigningKey::from_key(d_only).expect("signing key"), full)
}

pub(crate) fn alg_header(alg: CoseAlgorithm) -> CoseHeaderMap {
    CoseHeaderMap::new().with_algorithm(alg)
}
