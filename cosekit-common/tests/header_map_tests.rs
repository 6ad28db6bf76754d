// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Header map codec: deterministic encoding and strict decoding.

use cosekit_abstractions::{CoseError, CoseHeaderMap, DecodingError, HeaderKey, HeaderValue};
use cosekit_common::{decode_header_map_bytes, encode_header_map, ProtectedHeader, MAX_HEADER_VALUE_DEPTH};

#[test]
fn encoding_sorts_labels_by_encoded_bytes() {
    let header = CoseHeaderMap::new()
        .with_label("a", 1i64)
        .with_label(-1i64, 1i64)
        .with_key_id(vec![0x01])
        .with_algorithm(-7i64);

    let encoded = encode_header_map(&header).unwrap();
    // 1, 4, -1, "a"
    assert_eq!(hex::encode(encoded), "a401260441012001616101");
}

#[test]
fn insertion_order_does_not_change_encoding() {
    let a = CoseHeaderMap::new().with_algorithm(-7i64).with_content_type(0i64).with_key_id(b"k".to_vec());
    let b = CoseHeaderMap::new().with_key_id(b"k".to_vec()).with_content_type(0i64).with_algorithm(-7i64);
    assert_eq!(encode_header_map(&a).unwrap(), encode_header_map(&b).unwrap());
}

#[test]
fn empty_protected_header_is_zero_length() {
    let protected = ProtectedHeader::from_map(CoseHeaderMap::new()).unwrap();
    assert!(protected.is_empty());
    assert!(protected.encoded_map_cbor().is_empty());

    assert!(decode_header_map_bytes(&[]).unwrap().is_empty());
    // An explicitly encoded empty map is still accepted.
    assert!(decode_header_map_bytes(&[0xa0]).unwrap().is_empty());
}

#[test]
fn protected_bytes_are_kept_verbatim() {
    // {4: h'01', 1: -7}: not in deterministic order.
    let wire = hex::decode("a20441010126").unwrap();
    let protected = ProtectedHeader::from_bytes(wire.clone()).unwrap();

    assert_eq!(protected.encoded_map_cbor(), wire.as_slice());
    assert_eq!(protected.header().algorithm(), Some(-7));
    assert_eq!(protected.header().key_id(), Some(&[0x01][..]));
    assert_ne!(encode_header_map(protected.header()).unwrap(), wire);
}

#[test]
fn value_kinds_survive_a_round_trip() {
    let mut nested = std::collections::BTreeMap::new();
    nested.insert(HeaderKey::Int(1), HeaderValue::Text("x".into()));
    let header = CoseHeaderMap::new()
        .with_label(100i64, HeaderValue::Array(vec![HeaderValue::Int(-3), HeaderValue::Null]))
        .with_label(101i64, HeaderValue::Map(nested))
        .with_label(102i64, true)
        .with_label(103i64, HeaderValue::Tagged(1, Box::new(HeaderValue::Int(1_700_000_000))))
        .with_label("ext", "value");

    let decoded = decode_header_map_bytes(&encode_header_map(&header).unwrap()).unwrap();
    assert_eq!(decoded, header);
}

#[test]
fn duplicate_labels_are_rejected() {
    // {1: -7, 1: -8}
    let err = decode_header_map_bytes(&hex::decode("a201260127").unwrap()).unwrap_err();
    assert_eq!(err, DecodingError::DuplicateLabel("1".to_string()));

    // {"a": 1, "a": 2}
    let err = decode_header_map_bytes(&hex::decode("a2616101616102").unwrap()).unwrap_err();
    assert_eq!(err, DecodingError::DuplicateLabel("\"a\"".to_string()));
}

#[test]
fn indefinite_length_items_are_rejected() {
    let err = decode_header_map_bytes(&hex::decode("bf0126ff").unwrap()).unwrap_err();
    assert_eq!(err, DecodingError::IndefiniteLength("maps"));

    // {100: [_ 1]}
    let err = decode_header_map_bytes(&hex::decode("a118649f01ff").unwrap()).unwrap_err();
    assert_eq!(err, DecodingError::IndefiniteLength("arrays"));
}

#[test]
fn malformed_maps_are_rejected() {
    assert!(matches!(
        decode_header_map_bytes(&[0x01]).unwrap_err(),
        DecodingError::UnexpectedType { .. }
    ));
    // bstr label
    assert!(matches!(
        decode_header_map_bytes(&hex::decode("a1410001").unwrap()).unwrap_err(),
        DecodingError::UnexpectedType { .. }
    ));
    assert_eq!(
        decode_header_map_bytes(&hex::decode("a1012600").unwrap()).unwrap_err(),
        DecodingError::TrailingBytes("protected header map")
    );
    assert!(matches!(
        decode_header_map_bytes(&hex::decode("a201").unwrap()).unwrap_err(),
        DecodingError::Cbor(_)
    ));
}

#[test]
fn deeply_nested_values_are_rejected() {
    let mut wire = vec![0xa1, 0x18, 0x64];
    wire.extend(std::iter::repeat(0x81).take(MAX_HEADER_VALUE_DEPTH + 4));
    wire.push(0x01);

    let err = decode_header_map_bytes(&wire).unwrap_err();
    assert_eq!(
        err,
        DecodingError::NestingTooDeep {
            structure: "header value",
            max: MAX_HEADER_VALUE_DEPTH,
        }
    );

    let shallow = hex::decode("a11864818101").unwrap();
    assert!(decode_header_map_bytes(&shallow).is_ok());
}

#[test]
fn protected_header_errors_surface_as_cose_errors() {
    let err = ProtectedHeader::from_bytes(vec![0x01]).unwrap_err();
    assert!(matches!(err, CoseError::Decoding(DecodingError::UnexpectedType { .. })));
}
