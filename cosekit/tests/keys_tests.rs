// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Key generation and key agreement through the facade.

mod common;

use common::*;
use cosekit::{
    generate_ec2_key, generate_okp_key, generate_symmetric_key, key_agreement, CoseAlgorithm, CoseError, CoseKey,
    CryptoError, Curve, Ec2KeyBuilder, KeyAgreementKey, KeyRole, KeyType, KeyValidationError,
};

#[test]
fn generated_ec2_keys_are_complete_and_encodable() {
    let provider = provider();
    for curve in [Curve::P256, Curve::P384, Curve::P521] {
        let key = generate_ec2_key(&provider, curve).unwrap();
        assert_eq!(key.key_type(), KeyType::Ec2);
        assert_eq!(key.curve(), Some(curve));
        assert!(key.has_private_material());
        assert_eq!(key.y().map(<[u8]>::len), Some(curve.coordinate_len()));

        let decoded = CoseKey::from_slice(&key.to_vec().unwrap()).unwrap();
        assert_eq!(decoded, key);
    }
}

#[test]
fn generated_okp_keys_have_no_y() {
    let provider = provider();
    for curve in [Curve::Ed25519, Curve::X25519] {
        let key = generate_okp_key(&provider, curve).unwrap();
        assert_eq!(key.key_type(), KeyType::Okp);
        assert_eq!(key.y(), None);
        assert_eq!(key.x().map(<[u8]>::len), Some(32));
    }
}

#[test]
fn curve_must_match_generator() {
    let provider = provider();
    let err = generate_ec2_key(&provider, Curve::Ed25519).unwrap_err();
    assert_eq!(
        err,
        CoseError::KeyValidation(KeyValidationError::UnsupportedCurve {
            curve: Curve::Ed25519.id(),
            key_type: KeyType::Ec2,
        })
    );
    assert!(generate_okp_key(&provider, Curve::P256).is_err());
}

#[test]
fn symmetric_keys_are_sized_for_their_algorithm() {
    let provider = provider();
    for (alg, len) in [
        (CoseAlgorithm::A128GCM, 16),
        (CoseAlgorithm::A192GCM, 24),
        (CoseAlgorithm::A256GCM, 32),
        (CoseAlgorithm::HMAC256_256, 32),
        (CoseAlgorithm::HMAC512_512, 64),
    ] {
        let key = generate_symmetric_key(&provider, alg).unwrap();
        assert_eq!(key.k().map(<[u8]>::len), Some(len), "{alg}");
        assert_eq!(key.alg(), Some(alg.id()));
    }
    assert!(generate_symmetric_key(&provider, CoseAlgorithm::ES256).is_err());
}

#[test]
fn key_agreement_is_symmetric() {
    let provider = provider();
    for curve in [Curve::P256, Curve::P384, Curve::P521, Curve::X25519] {
        let alice = agreement_key(curve);
        let bob = agreement_key(curve);
        let bob_public = KeyAgreementKey::from_key(bob.key().to_public_key(&provider).unwrap()).unwrap();
        let alice_public = KeyAgreementKey::from_key(alice.key().to_public_key(&provider).unwrap()).unwrap();

        let ab = key_agreement(&provider, &alice, &bob_public).unwrap();
        let ba = key_agreement(&provider, &bob, &alice_public).unwrap();
        assert_eq!(ab.as_slice(), ba.as_slice(), "{curve}");
    }
}

#[test]
fn key_agreement_with_private_only_peer_derives_its_public_point() {
    let provider = provider();
    let alice = agreement_key(Curve::P256);
    let bob_full = agreement_key(Curve::P256);
    let bob_d_only = Ec2KeyBuilder::new()
        .curve(Curve::P256)
        .d(bob_full.key().d().unwrap())
        .build()
        .unwrap();
    let bob_d_only = KeyAgreementKey::from_key(bob_d_only).unwrap();

    let expected = key_agreement(&provider, &alice, &bob_full).unwrap();
    let derived = key_agreement(&provider, &alice, &bob_d_only).unwrap();
    assert_eq!(expected.as_slice(), derived.as_slice());
}

#[test]
fn key_agreement_requires_same_curve() {
    let provider = provider();
    let err = key_agreement(&provider, &agreement_key(Curve::P256), &agreement_key(Curve::P384)).unwrap_err();
    assert!(matches!(err, CoseError::Crypto(CryptoError::InvalidKey(_))), "{err:?}");
}

#[test]
fn signing_curve_is_not_an_agreement_key() {
    let provider = provider();
    let ed = generate_okp_key(&provider, Curve::Ed25519).unwrap();
    let err = KeyAgreementKey::from_key(ed).unwrap_err();
    assert!(matches!(err, KeyValidationError::IncompatibleUsage { .. }));
}
