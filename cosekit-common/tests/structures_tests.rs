// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Authenticated-data structures: exact bytes and shape checks.

use cosekit_abstractions::{BuilderError, CoseError, CoseHeaderMap};
use cosekit_common::{AadContext, AadStructure, CoseSign, CoseSignature, ProtectedHeader};

#[test]
fn mac0_structure_matches_known_bytes() {
    let protected = hex::decode("a10105").unwrap();
    let encoded = AadStructure::mac(AadContext::Mac0, &protected, b"", b"This is the content.")
        .encode()
        .unwrap();
    assert_eq!(
        hex::encode(encoded),
        "84644d41433043a101054054546869732069732074686520636f6e74656e742e"
    );
}

#[test]
fn enc_structure_has_no_payload() {
    let protected = hex::decode("a10103").unwrap();
    let encoded = AadStructure::encryption(AadContext::Encrypt0, &protected, b"").encode().unwrap();
    assert_eq!(hex::encode(encoded), "8368456e63727970743043a1010340");
}

#[test]
fn signature1_structure_carries_external_aad() {
    let protected = hex::decode("a10126").unwrap();
    let encoded = AadStructure::signature1(&protected, b"aad", b"hi").encode().unwrap();
    assert_eq!(hex::encode(encoded), "846a5369676e61747572653143a1012643616164426869");
}

#[test]
fn signature_structure_includes_signer_protected() {
    let sign_protected = hex::decode("a10126").unwrap();
    let encoded = AadStructure::signature(&[], &sign_protected, b"", &[0xab]).encode().unwrap();
    assert_eq!(hex::encode(&encoded), "85695369676e61747572654043a101264041ab");

    // Same bytes through the message model.
    let signature = CoseSignature::builder()
        .protected_bytes(sign_protected)
        .unwrap()
        .signature(vec![0; 64])
        .build()
        .unwrap();
    let message = CoseSign::builder()
        .protected(CoseHeaderMap::new())
        .unwrap()
        .payload(vec![0xab])
        .unwrap()
        .add_signature(signature.clone())
        .build()
        .unwrap();
    assert_eq!(message.tbs_data(&signature, b"", None).unwrap(), encoded);
}

#[test]
fn shape_is_enforced_per_context() {
    let err = AadStructure::new(AadContext::Signature, &[]).with_payload(b"p").encode().unwrap_err();
    assert_eq!(err, CoseError::Builder(BuilderError::MissingField("sign_protected")));

    let err = AadStructure::signature1(&[], &[], b"p").with_sign_protected(&[]).encode().unwrap_err();
    assert_eq!(err, CoseError::Builder(BuilderError::ConflictingFields("sign_protected")));

    let err = AadStructure::new(AadContext::Mac, &[]).encode().unwrap_err();
    assert_eq!(err, CoseError::Builder(BuilderError::MissingField("payload")));

    let err = AadStructure::encryption(AadContext::Encrypt, &[], &[]).with_payload(b"p").encode().unwrap_err();
    assert_eq!(err, CoseError::Builder(BuilderError::ConflictingFields("payload")));
}

#[test]
fn context_strings() {
    let names: Vec<&str> = [
        AadContext::Signature,
        AadContext::Signature1,
        AadContext::CounterSignature,
        AadContext::Mac,
        AadContext::Mac0,
        AadContext::Encrypt,
        AadContext::Encrypt0,
        AadContext::EncRecipient,
        AadContext::MacRecipient,
        AadContext::RecRecipient,
    ]
    .into_iter()
    .map(AadContext::as_str)
    .collect();
    assert_eq!(
        names,
        [
            "Signature",
            "Signature1",
            "CounterSignature",
            "MAC",
            "MAC0",
            "Encrypt",
            "Encrypt0",
            "Enc_Recipient",
            "Mac_Recipient",
            "Rec_Recipient",
        ]
    );
}

#[test]
fn empty_protected_header_is_an_empty_bstr_in_structures() {
    let protected = ProtectedHeader::from_map(CoseHeaderMap::new()).unwrap();
    let encoded = AadStructure::encryption(AadContext::Encrypt, protected.encoded_map_cbor(), b"")
        .encode()
        .unwrap();
    // ["Encrypt", h'', h'']
    assert_eq!(hex::encode(encoded), "8367456e63727970744040");
}
