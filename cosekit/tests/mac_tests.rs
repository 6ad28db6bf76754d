// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Mac0 and COSE_Mac through the facade.

mod common;

use common::*;
use cosekit::{
    mac, mac0, verify_mac, verify_mac0, BuilderError, CoseAlgorithm, CoseError, CoseHeaderMap, CoseMac, CoseMac0,
    CoseOptions, CoseRecipient, CoseStructure, CryptoError, KeyOperation, KeyRole, KeyValidationError, MacKey,
    SymmetricKeyBuilder,
};

const SCENARIO_A: &str = "8443A10105A054546869732069732074686520636F6E74656E742E5820A1A848D3471F9D61EE49018D244C824772F223AD4F935293F1789FC3A08D8C58";

#[test]
fn hmac_256_mac0_matches_known_bytes() {
    let provider = provider();
    let msg = mac0(
        &provider,
        &our_secret(),
        alg_header(CoseAlgorithm::HMAC256_256),
        CoseHeaderMap::new(),
        b"This is the content.",
        &CoseOptions::new(),
    )
    .expect("mac0");

    assert_eq!(hex::encode_upper(msg.to_vec().unwrap()), SCENARIO_A);
    assert_eq!(
        hex::encode_upper(msg.tag()),
        "A1A848D3471F9D61EE49018D244C824772F223AD4F935293F1789FC3A08D8C58"
    );
}

#[test]
fn known_mac0_verifies_and_rejects_other_keys() {
    let provider = provider();
    let msg = CoseMac0::from_slice(&hex::decode(SCENARIO_A).unwrap()).expect("decode");
    assert_eq!(msg.payload(), Some(&b"This is the content."[..]));

    verify_mac0(&provider, &our_secret(), &msg, &CoseOptions::new()).expect("verify");

    let err = verify_mac0(&provider, &mac_key(&[0x42; 32]), &msg, &CoseOptions::new()).unwrap_err();
    assert_eq!(err, CoseError::Crypto(CryptoError::VerificationFailed));

    let err = verify_mac0(&provider, &our_secret(), &msg, &CoseOptions::new().with_external_aad(b"x".to_vec()))
        .unwrap_err();
    assert_eq!(err, CoseError::Crypto(CryptoError::VerificationFailed));
}

#[test]
fn truncated_hmac_produces_eight_byte_tag() {
    let provider = provider();
    let key = our_secret();
    let msg = mac0(
        &provider,
        &key,
        CoseHeaderMap::new(),
        CoseHeaderMap::new(),
        b"content",
        &CoseOptions::new().with_algorithm(CoseAlgorithm::HMAC256_64),
    )
    .unwrap();
    assert_eq!(msg.tag().len(), 8);
    assert_eq!(msg.protected().header().algorithm(), Some(CoseAlgorithm::HMAC256_64.id()));
    verify_mac0(&provider, &key, &msg, &CoseOptions::new()).expect("verify");
}

#[test]
fn detached_mac0_law() {
    let provider = provider();
    let key = our_secret();
    let options = CoseOptions::new().with_algorithm(CoseAlgorithm::HMAC384_384);

    let err = mac0(
        &provider,
        &key,
        CoseHeaderMap::new(),
        CoseHeaderMap::new(),
        b"in",
        &options.clone().with_detached_content(b"out".to_vec()),
    )
    .unwrap_err();
    assert!(matches!(err, CoseError::InvalidPayload(_)));

    let err = mac0(&provider, &key, CoseHeaderMap::new(), CoseHeaderMap::new(), b"", &options).unwrap_err();
    assert!(matches!(err, CoseError::InvalidPayload(_)));

    let msg = mac0(
        &provider,
        &key,
        CoseHeaderMap::new(),
        CoseHeaderMap::new(),
        b"",
        &options.clone().with_detached_content(b"out".to_vec()),
    )
    .unwrap();
    assert_eq!(msg.payload(), None);
    assert_eq!(msg.tag().len(), 48);
    verify_mac0(&provider, &key, &msg, &CoseOptions::new().with_detached_content(b"out".to_vec())).expect("verify");
}

#[test]
fn signature_algorithm_cannot_mac() {
    let provider = provider();
    let err = mac0(
        &provider,
        &our_secret(),
        alg_header(CoseAlgorithm::ES256),
        CoseHeaderMap::new(),
        b"x",
        &CoseOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, CoseError::KeyValidation(KeyValidationError::AlgorithmNotAllowed { .. })));
}

#[test]
fn key_with_joint_mac_operations_verifies() {
    let provider = provider();
    let key = SymmetricKeyBuilder::new()
        .k(hex::decode(OUR_SECRET).unwrap())
        .add_operation(KeyOperation::MacCreate)
        .unwrap()
        .add_operation(KeyOperation::MacVerify)
        .unwrap()
        .build()
        .unwrap();
    let key = MacKey::from_key(key).expect("joint MAC operations");
    let msg = CoseMac0::from_slice(&hex::decode(SCENARIO_A).unwrap()).unwrap();
    verify_mac0(&provider, &key, &msg, &CoseOptions::new()).expect("verify");
}

#[test]
fn mac_with_direct_recipient_round_trips() {
    let provider = provider();
    let key = our_secret();
    let msg = mac(
        &provider,
        &key,
        alg_header(CoseAlgorithm::HMAC256_256),
        CoseHeaderMap::new(),
        b"This is the content.",
        vec![CoseRecipient::direct(b"our-secret".to_vec())],
        &CoseOptions::new(),
    )
    .expect("mac");

    let decoded = CoseMac::from_slice(&msg.to_tagged_vec().unwrap()).expect("decode");
    assert_eq!(decoded, msg);
    assert_eq!(decoded.recipients().len(), 1);

    let recipient = &decoded.recipients()[0];
    assert!(recipient.protected().encoded_map_cbor().is_empty());
    assert!(recipient.ciphertext().is_empty());
    assert_eq!(recipient.algorithm(), Some(CoseAlgorithm::Direct.id()));
    assert_eq!(recipient.key_id(), Some(&b"our-secret"[..]));

    verify_mac(&provider, &key, &decoded, &CoseOptions::new()).expect("verify");
    let err = verify_mac(&provider, &mac_key(&[1u8; 32]), &decoded, &CoseOptions::new()).unwrap_err();
    assert_eq!(err, CoseError::Crypto(CryptoError::VerificationFailed));
}

#[test]
fn mac_and_mac0_use_distinct_contexts() {
    let provider = provider();
    let key = our_secret();
    let single = mac0(
        &provider,
        &key,
        alg_header(CoseAlgorithm::HMAC256_256),
        CoseHeaderMap::new(),
        b"content",
        &CoseOptions::new(),
    )
    .unwrap();
    let multi = mac(
        &provider,
        &key,
        alg_header(CoseAlgorithm::HMAC256_256),
        CoseHeaderMap::new(),
        b"content",
        vec![CoseRecipient::direct(b"k".to_vec())],
        &CoseOptions::new(),
    )
    .unwrap();
    assert_ne!(single.tag(), multi.tag());
}

#[test]
fn mac_without_recipients_fails() {
    let provider = provider();
    let err = mac(
        &provider,
        &our_secret(),
        alg_header(CoseAlgorithm::HMAC256_256),
        CoseHeaderMap::new(),
        b"x",
        Vec::new(),
        &CoseOptions::new(),
    )
    .unwrap_err();
    assert_eq!(err, CoseError::Builder(BuilderError::MissingField("recipients")));
}
