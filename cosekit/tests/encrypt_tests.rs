// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Encrypt0 and COSE_Encrypt through the facade.

mod common;

use common::*;
use cosekit::{
    decrypt, decrypt0, encrypt, encrypt0, BuilderError, CoseAlgorithm, CoseEncrypt, CoseEncrypt0, CoseError, CoseHeaderMap,
    CoseOptions, CoseRecipient, CoseStructure, CryptoError, KeyValidationError,
};

const KEY_256: [u8; 32] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10, 0x11, 0x12,
    0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f,
];
const FIXED_IV: [u8; 12] = [0x02, 0xd1, 0xf7, 0xe6, 0xf2, 0x6c, 0x43, 0xd4, 0x86, 0x8d, 0x87, 0xce];

#[test]
fn aes256_gcm_round_trip_with_fixed_iv_and_aad() {
    let provider = provider();
    let key = encryption_key_from(&KEY_256, None);
    let options = CoseOptions::new()
        .with_algorithm(CoseAlgorithm::A256GCM)
        .with_iv(FIXED_IV.to_vec())
        .with_external_aad(b"fixed aad".to_vec());

    let sealed = encrypt0(&provider, &key, CoseHeaderMap::new(), CoseHeaderMap::new(), b"attack at dawn", &options)
        .expect("encrypt");
    assert!(sealed.detached_ciphertext.is_none());
    let msg = sealed.message;
    assert_eq!(msg.unprotected().iv(), Some(&FIXED_IV[..]));
    assert_eq!(msg.ciphertext().unwrap().len(), b"attack at dawn".len() + 16);

    let decoded = CoseEncrypt0::from_slice(&msg.to_vec().unwrap()).expect("decode");
    let aad = CoseOptions::new().with_external_aad(b"fixed aad".to_vec());
    assert_eq!(decrypt0(&provider, &key, &decoded, &aad).expect("decrypt"), b"attack at dawn");

    let err = decrypt0(&provider, &key, &decoded, &CoseOptions::new().with_external_aad(b"other".to_vec())).unwrap_err();
    assert_eq!(err, CoseError::Crypto(CryptoError::DecryptionFailed));

    let mut wrong = KEY_256;
    wrong[0] ^= 0xff;
    let err = decrypt0(&provider, &encryption_key_from(&wrong, None), &decoded, &aad).unwrap_err();
    assert_eq!(err, CoseError::Crypto(CryptoError::DecryptionFailed));
}

#[test]
fn random_iv_is_recorded_in_unprotected_header() {
    let provider = provider();
    let key = encryption_key(CoseAlgorithm::A128GCM);
    let first = encrypt0(&provider, &key, CoseHeaderMap::new(), CoseHeaderMap::new(), b"data", &CoseOptions::new())
        .unwrap()
        .message;
    let second = encrypt0(&provider, &key, CoseHeaderMap::new(), CoseHeaderMap::new(), b"data", &CoseOptions::new())
        .unwrap()
        .message;

    assert_eq!(first.protected().header().algorithm(), Some(CoseAlgorithm::A128GCM.id()));
    assert_eq!(first.unprotected().iv().map(<[u8]>::len), Some(12));
    assert_ne!(first.unprotected().iv(), second.unprotected().iv());
    assert_eq!(decrypt0(&provider, &key, &first, &CoseOptions::new()).unwrap(), b"data");
}

#[test]
fn partial_iv_combines_with_base_iv() {
    let provider = provider();
    let base_iv = [0x10u8; 12];
    let key = encryption_key_from(&KEY_256, Some(&base_iv));
    let unprotected = CoseHeaderMap::new().with_partial_iv(vec![0x01, 0x02]);
    let options = CoseOptions::new().with_algorithm(CoseAlgorithm::A256GCM);

    let with_partial = encrypt0(&provider, &key, CoseHeaderMap::new(), unprotected, b"data", &options)
        .unwrap()
        .message;
    assert_eq!(with_partial.unprotected().iv(), None);

    let mut full_iv = base_iv;
    full_iv[10] ^= 0x01;
    full_iv[11] ^= 0x02;
    let with_iv = encrypt0(
        &provider,
        &key,
        CoseHeaderMap::new(),
        CoseHeaderMap::new(),
        b"data",
        &options.clone().with_iv(full_iv.to_vec()),
    )
    .unwrap()
    .message;
    assert_eq!(with_partial.ciphertext(), with_iv.ciphertext());

    assert_eq!(decrypt0(&provider, &key, &with_partial, &CoseOptions::new()).unwrap(), b"data");
}

#[test]
fn partial_iv_without_base_iv_fails() {
    let provider = provider();
    let key = encryption_key_from(&KEY_256, None);
    let err = encrypt0(
        &provider,
        &key,
        alg_header(CoseAlgorithm::A256GCM),
        CoseHeaderMap::new().with_partial_iv(vec![0x01]),
        b"data",
        &CoseOptions::new(),
    )
    .unwrap_err();
    assert_eq!(err, CoseError::KeyValidation(KeyValidationError::MissingKeyMaterial("base_iv")));
}

#[test]
fn decrypt_without_iv_is_reported() {
    let provider = provider();
    let key = encryption_key_from(&KEY_256, None);
    let msg = CoseEncrypt0::builder()
        .protected(alg_header(CoseAlgorithm::A256GCM))
        .unwrap()
        .ciphertext(vec![0u8; 20])
        .unwrap()
        .build()
        .unwrap();
    let err = decrypt0(&provider, &key, &msg, &CoseOptions::new()).unwrap_err();
    assert_eq!(err, CoseError::MissingHeader("IV"));
}

#[test]
fn iv_option_must_agree_with_header_iv() {
    let provider = provider();
    let key = encryption_key_from(&KEY_256, None);
    let unprotected = CoseHeaderMap::new().with_iv(vec![0x01; 12]);
    let options = CoseOptions::new()
        .with_algorithm(CoseAlgorithm::A256GCM)
        .with_iv(vec![0x02; 12]);

    let err = encrypt0(&provider, &key, CoseHeaderMap::new(), unprotected.clone(), b"data", &options).unwrap_err();
    assert_eq!(err, CoseError::Builder(BuilderError::ConflictingFields("IV")));

    // the same nonce in both places is fine
    let agreeing = options.clone().with_iv(vec![0x01; 12]);
    let msg = encrypt0(&provider, &key, CoseHeaderMap::new(), unprotected, b"data", &agreeing)
        .unwrap()
        .message;
    assert_eq!(msg.unprotected().iv(), Some(&[0x01u8; 12][..]));
    assert_eq!(decrypt0(&provider, &key, &msg, &CoseOptions::new()).unwrap(), b"data");

    let err = decrypt0(&provider, &key, &msg, &CoseOptions::new().with_iv(vec![0x02; 12])).unwrap_err();
    assert_eq!(err, CoseError::Builder(BuilderError::ConflictingFields("IV")));
}

#[test]
fn iv_option_must_agree_with_partial_iv() {
    let provider = provider();
    let base_iv = [0x10u8; 12];
    let key = encryption_key_from(&KEY_256, Some(&base_iv));
    let unprotected = CoseHeaderMap::new().with_partial_iv(vec![0x01]);
    let options = CoseOptions::new()
        .with_algorithm(CoseAlgorithm::A256GCM)
        .with_iv(base_iv.to_vec());

    let err = encrypt0(&provider, &key, CoseHeaderMap::new(), unprotected, b"data", &options).unwrap_err();
    assert_eq!(err, CoseError::Builder(BuilderError::ConflictingFields("IV")));
}

#[test]
fn tampered_ciphertext_fails() {
    let provider = provider();
    let key = encryption_key(CoseAlgorithm::A192GCM);
    let msg = encrypt0(&provider, &key, CoseHeaderMap::new(), CoseHeaderMap::new(), b"data", &CoseOptions::new())
        .unwrap()
        .message;

    let mut ciphertext = msg.ciphertext().unwrap().to_vec();
    ciphertext[0] ^= 1;
    let tampered = CoseEncrypt0::builder()
        .protected_bytes(msg.protected().encoded_map_cbor())
        .unwrap()
        .unprotected(msg.unprotected().clone())
        .ciphertext(ciphertext)
        .unwrap()
        .build()
        .unwrap();
    let err = decrypt0(&provider, &key, &tampered, &CoseOptions::new()).unwrap_err();
    assert_eq!(err, CoseError::Crypto(CryptoError::DecryptionFailed));
}

#[test]
fn detached_ciphertext_is_returned_separately() {
    let provider = provider();
    let key = encryption_key(CoseAlgorithm::A256GCM);
    let sealed = encrypt0(
        &provider,
        &key,
        CoseHeaderMap::new(),
        CoseHeaderMap::new(),
        b"",
        &CoseOptions::new().with_detached_content(b"secret".to_vec()),
    )
    .unwrap();
    assert_eq!(sealed.message.ciphertext(), None);
    let ciphertext = sealed.detached_ciphertext.expect("detached ciphertext");

    let plaintext = decrypt0(
        &provider,
        &key,
        &sealed.message,
        &CoseOptions::new().with_detached_content(ciphertext),
    )
    .unwrap();
    assert_eq!(plaintext, b"secret");

    let err = decrypt0(&provider, &key, &sealed.message, &CoseOptions::new()).unwrap_err();
    assert!(matches!(err, CoseError::InvalidPayload(_)));
}

#[test]
fn encrypt0_detached_law() {
    let provider = provider();
    let key = encryption_key(CoseAlgorithm::A256GCM);
    let err = encrypt0(
        &provider,
        &key,
        CoseHeaderMap::new(),
        CoseHeaderMap::new(),
        b"inside",
        &CoseOptions::new().with_detached_content(b"outside".to_vec()),
    )
    .unwrap_err();
    assert!(matches!(err, CoseError::InvalidPayload(_)));

    let err = encrypt0(&provider, &key, CoseHeaderMap::new(), CoseHeaderMap::new(), b"", &CoseOptions::new())
        .unwrap_err();
    assert!(matches!(err, CoseError::InvalidPayload(_)));
}

#[test]
fn key_length_must_fit_algorithm() {
    let provider = provider();
    let key = encryption_key_from(&KEY_256, None);
    let err = encrypt0(
        &provider,
        &key,
        alg_header(CoseAlgorithm::A128GCM),
        CoseHeaderMap::new(),
        b"data",
        &CoseOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, CoseError::KeyValidation(KeyValidationError::AlgorithmNotAllowed { .. })));
}

#[test]
fn mac_algorithm_cannot_encrypt() {
    let provider = provider();
    let key = encryption_key_from(&KEY_256, None);
    let err = encrypt0(
        &provider,
        &key,
        alg_header(CoseAlgorithm::HMAC256_256),
        CoseHeaderMap::new(),
        b"data",
        &CoseOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, CoseError::KeyValidation(KeyValidationError::AlgorithmNotAllowed { .. })));
}

#[test]
fn encrypt_with_recipients_round_trips() {
    let provider = provider();
    let key = encryption_key(CoseAlgorithm::A256GCM);
    let recipients = vec![
        CoseRecipient::direct(b"alice".to_vec()),
        CoseRecipient::direct(b"bob".to_vec()),
    ];
    let sealed = encrypt(
        &provider,
        &key,
        CoseHeaderMap::new(),
        CoseHeaderMap::new(),
        b"for both",
        recipients,
        &CoseOptions::new(),
    )
    .unwrap();

    let decoded = CoseEncrypt::from_slice(&sealed.message.to_tagged_vec().unwrap()).unwrap();
    assert_eq!(decoded, sealed.message);
    assert_eq!(decoded.recipients().len(), 2);
    assert_eq!(decoded.recipients()[1].key_id(), Some(&b"bob"[..]));
    assert_eq!(decrypt(&provider, &key, &decoded, &CoseOptions::new()).unwrap(), b"for both");

    // The Encrypt context differs from Encrypt0, so the same bytes do not open
    // as a single-recipient message.
    let as_encrypt0 = CoseEncrypt0::builder()
        .protected_bytes(decoded.protected().encoded_map_cbor())
        .unwrap()
        .unprotected(decoded.unprotected().clone())
        .ciphertext(decoded.ciphertext().unwrap())
        .unwrap()
        .build()
        .unwrap();
    let err = decrypt0(&provider, &key, &as_encrypt0, &CoseOptions::new()).unwrap_err();
    assert_eq!(err, CoseError::Crypto(CryptoError::DecryptionFailed));
}

#[test]
fn encrypt_without_recipients_fails() {
    let provider = provider();
    let key = encryption_key(CoseAlgorithm::A256GCM);
    let err = encrypt(
        &provider,
        &key,
        CoseHeaderMap::new(),
        CoseHeaderMap::new(),
        b"x",
        Vec::new(),
        &CoseOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, CoseError::Builder(_)));
}
