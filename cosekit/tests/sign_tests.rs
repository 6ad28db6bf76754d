// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Multi-signer COSE_Sign generation and per-index verification.

mod common;

use common::*;
use cosekit::{
    sign, verify_sign, BuilderError, CoseAlgorithm, CoseError, CoseHeaderMap, CoseOptions, CoseSign, CoseStructure,
    CryptoError, Curve, Signer,
};

#[test]
fn two_signers_verify_by_index() {
    let provider = provider();
    let p256 = signing_key(Curve::P256);
    let ed = signing_key(Curve::Ed25519);

    let msg = sign(
        &provider,
        CoseHeaderMap::new().with_content_type("text/plain"),
        CoseHeaderMap::new(),
        b"shared payload",
        vec![
            Signer::new(&p256)
                .with_algorithm(CoseAlgorithm::ES256)
                .with_unprotected(CoseHeaderMap::new().with_key_id(b"p256".to_vec())),
            Signer::new(&ed).with_protected(alg_header(CoseAlgorithm::EdDSA)),
        ],
        &CoseOptions::new(),
    )
    .expect("sign");

    assert_eq!(msg.signatures().len(), 2);
    assert_eq!(msg.signatures()[0].unprotected().key_id(), Some(&b"p256"[..]));
    assert_eq!(
        msg.signatures()[1].protected().header().algorithm(),
        Some(CoseAlgorithm::EdDSA.id())
    );
    // The body carries no algorithm; each signer records its own.
    assert_eq!(msg.protected().header().algorithm(), None);

    let decoded = CoseSign::from_slice(&msg.to_tagged_vec().unwrap()).expect("decode");
    assert_eq!(decoded, msg);

    verify_sign(&provider, &p256, &decoded, 0, &CoseOptions::new()).expect("signer 0");
    verify_sign(&provider, &ed, &decoded, 1, &CoseOptions::new()).expect("signer 1");

    let err = verify_sign(&provider, &ed, &decoded, 0, &CoseOptions::new()).unwrap_err();
    assert!(matches!(err, CoseError::KeyValidation(_)), "{err:?}");
}

#[test]
fn wrong_key_at_index_fails() {
    let provider = provider();
    let signer_key = signing_key(Curve::P384);
    let msg = sign(
        &provider,
        CoseHeaderMap::new(),
        CoseHeaderMap::new(),
        b"payload",
        vec![Signer::new(&signer_key).with_algorithm(CoseAlgorithm::ES384)],
        &CoseOptions::new(),
    )
    .unwrap();

    let err = verify_sign(&provider, &signing_key(Curve::P384), &msg, 0, &CoseOptions::new()).unwrap_err();
    assert_eq!(err, CoseError::Crypto(CryptoError::VerificationFailed));
}

#[test]
fn out_of_range_index_is_reported() {
    let provider = provider();
    let key = signing_key(Curve::P256);
    let msg = sign(
        &provider,
        CoseHeaderMap::new(),
        CoseHeaderMap::new(),
        b"payload",
        vec![Signer::new(&key)],
        &CoseOptions::new().with_algorithm(CoseAlgorithm::ES256),
    )
    .unwrap();
    let err = verify_sign(&provider, &key, &msg, 3, &CoseOptions::new()).unwrap_err();
    assert_eq!(err, CoseError::NoSuchSignature { index: 3, count: 1 });
}

#[test]
fn no_signers_is_a_missing_field() {
    let provider = provider();
    let err = sign(
        &provider,
        CoseHeaderMap::new(),
        CoseHeaderMap::new(),
        b"payload",
        Vec::new(),
        &CoseOptions::new(),
    )
    .unwrap_err();
    assert_eq!(err, CoseError::Builder(BuilderError::MissingField("signatures")));
}

#[test]
fn body_protected_header_is_authenticated() {
    let provider = provider();
    let key = signing_key(Curve::P256);
    let msg = sign(
        &provider,
        CoseHeaderMap::new().with_content_type(0i64),
        CoseHeaderMap::new(),
        b"payload",
        vec![Signer::new(&key).with_algorithm(CoseAlgorithm::ES256)],
        &CoseOptions::new(),
    )
    .unwrap();

    let tampered = CoseSign::builder()
        .protected(CoseHeaderMap::new().with_content_type(1i64))
        .unwrap()
        .payload(msg.payload().unwrap())
        .unwrap()
        .add_signature(msg.signatures()[0].clone())
        .build()
        .unwrap();
    let err = verify_sign(&provider, &key, &tampered, 0, &CoseOptions::new()).unwrap_err();
    assert_eq!(err, CoseError::Crypto(CryptoError::VerificationFailed));
}

#[test]
fn detached_multi_signer_message() {
    let provider = provider();
    let key = signing_key(Curve::Ed25519);
    let options = CoseOptions::new()
        .with_algorithm(CoseAlgorithm::EdDSA)
        .with_detached_content(b"outside".to_vec());
    let msg = sign(
        &provider,
        CoseHeaderMap::new(),
        CoseHeaderMap::new(),
        b"",
        vec![Signer::new(&key)],
        &options,
    )
    .unwrap();
    assert_eq!(msg.payload(), None);

    verify_sign(&provider, &key, &msg, 0, &CoseOptions::new().with_detached_content(b"outside".to_vec()))
        .expect("verify");
}
