// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! ECDH and X25519 shared secret derivation.

use cosekit_abstractions::{CryptoError, CryptoProvider, Curve, PublicKeyRef};
use cosekit_crypto::RustCryptoProvider;

#[test]
fn x25519_matches_rfc7748() {
    let provider = RustCryptoProvider::new();
    let alice = hex::decode("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a").unwrap();
    let bob_public = hex::decode("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f").unwrap();

    let alice_public = provider.derive_public_key(Curve::X25519, &alice).unwrap();
    assert_eq!(
        hex::encode(&alice_public.x),
        "8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a"
    );

    let shared = provider
        .key_agreement(
            &alice,
            PublicKeyRef {
                curve: Curve::X25519,
                x: &bob_public,
                y: None,
            },
        )
        .unwrap();
    assert_eq!(
        hex::encode(shared.as_slice()),
        "4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742"
    );
}

#[test]
fn x25519_rejects_low_order_peer() {
    let provider = RustCryptoProvider::new();
    let pair = provider.generate_key_pair(Curve::X25519).unwrap();
    let zero = [0u8; 32];
    let err = provider
        .key_agreement(
            &pair.d,
            PublicKeyRef {
                curve: Curve::X25519,
                x: &zero,
                y: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, CryptoError::InvalidKey(_)));
}

#[test]
fn ecdh_is_symmetric_on_every_nist_curve() {
    let provider = RustCryptoProvider::new();
    for curve in [Curve::P256, Curve::P384, Curve::P521] {
        let a = provider.generate_key_pair(curve).unwrap();
        let b = provider.generate_key_pair(curve).unwrap();
        let ab = provider.key_agreement(&a.d, b.public.as_key_ref(curve)).unwrap();
        let ba = provider.key_agreement(&b.d, a.public.as_key_ref(curve)).unwrap();
        assert_eq!(ab.as_slice(), ba.as_slice(), "{curve}");
        assert_eq!(ab.len(), curve.coordinate_len(), "{curve}");
    }
}

#[test]
fn ecdh_requires_y_coordinate() {
    let provider = RustCryptoProvider::new();
    let a = provider.generate_key_pair(Curve::P256).unwrap();
    let b = provider.generate_key_pair(Curve::P256).unwrap();
    let err = provider
        .key_agreement(
            &a.d,
            PublicKeyRef {
                curve: Curve::P256,
                x: &b.public.x,
                y: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, CryptoError::InvalidKey(_)));
}

#[test]
fn signing_only_curve_cannot_agree() {
    let provider = RustCryptoProvider::new();
    let pair = provider.generate_key_pair(Curve::Ed25519).unwrap();
    let err = provider
        .key_agreement(&pair.d, pair.public.as_key_ref(Curve::Ed25519))
        .unwrap_err();
    assert_eq!(err, CryptoError::UnsupportedCurve(Curve::Ed25519));
}
