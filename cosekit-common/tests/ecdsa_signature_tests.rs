// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! DER <-> fixed-width ECDSA signature conversion.

use cosekit_abstractions::CryptoError;
use cosekit_common::{ecdsa_der_to_fixed, ecdsa_fixed_to_der};

#[test]
fn high_bit_integers_gain_a_leading_zero() {
    let mut fixed = vec![0u8; 64];
    fixed[0] = 0x80;
    fixed[31] = 0x01;
    fixed[63] = 0x02;

    let der = ecdsa_fixed_to_der(&fixed, 32).unwrap();
    assert_eq!(der[0], 0x30);
    // r: INTEGER, 33 bytes, 0x00 0x80 ...
    assert_eq!(&der[2..5], &[0x02, 0x21, 0x00]);
    assert_eq!(der[5], 0x80);
    // s: INTEGER 0x02
    assert_eq!(&der[der.len() - 3..], &[0x02, 0x01, 0x02]);

    assert_eq!(ecdsa_der_to_fixed(&der, 32).unwrap(), fixed);
}

#[test]
fn short_integers_are_left_padded() {
    // SEQUENCE { INTEGER 1, INTEGER 0x00ff }
    let der = hex::decode("3007020101020200ff").unwrap();
    let fixed = ecdsa_der_to_fixed(&der, 32).unwrap();
    assert_eq!(fixed.len(), 64);
    assert_eq!(fixed[31], 0x01);
    assert_eq!(fixed[63], 0xff);
    assert!(fixed[..31].iter().all(|b| *b == 0));
}

#[test]
fn p521_signatures_use_long_form_lengths() {
    let mut fixed: Vec<u8> = (0..132u32).map(|i| (i % 251) as u8 | 0x01).collect();
    // keep s below the group order
    fixed[66] = 0x01;
    let der = ecdsa_fixed_to_der(&fixed, 66).unwrap();
    assert_eq!(&der[..2], &[0x30, 0x81]);
    assert_eq!(ecdsa_der_to_fixed(&der, 66).unwrap(), fixed);
}

#[test]
fn malformed_der_is_rejected() {
    let cases = [
        "",
        "3100",
        "3008020101020101",
        "300602010102010100",
        "3003020101",
        "30070201010201010000",
    ];
    for case in cases {
        let err = ecdsa_der_to_fixed(&hex::decode(case).unwrap(), 32).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSignature(_)), "{case}: {err:?}");
    }

    // r wider than the P-256 field
    let mut der = vec![0x30, 0x26, 0x02, 0x21, 0x01];
    der.extend([0xff; 32]);
    der.extend([0x02, 0x01, 0x01]);
    assert!(ecdsa_der_to_fixed(&der, 32).is_err());
}

#[test]
fn non_canonical_der_is_rejected() {
    let cases = [
        // r = 0x80 without a sign byte reads as negative
        "3006020180020101",
        // s = 1 with redundant leading zeros
        "30080201010203000001",
        // long-form length where the short form fits
        "308106020101020101",
    ];
    for case in cases {
        let der = hex::decode(case).unwrap();
        let err = ecdsa_der_to_fixed(&der, 32).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSignature(_)), "{case}: {err:?}");
    }
}

#[test]
fn zero_scalars_are_rejected() {
    let mut fixed = vec![0u8; 64];
    fixed[63] = 0x01;
    assert!(matches!(
        ecdsa_fixed_to_der(&fixed, 32).unwrap_err(),
        CryptoError::InvalidSignature(_)
    ));
    assert!(ecdsa_der_to_fixed(&hex::decode("3006020100020101").unwrap(), 32).is_err());
}

#[test]
fn unknown_field_sizes_are_rejected() {
    assert!(ecdsa_fixed_to_der(&[0x01; 40], 20).is_err());
    assert!(ecdsa_der_to_fixed(&hex::decode("3006020101020101").unwrap(), 20).is_err());
}

#[test]
fn p384_round_trips_through_der() {
    let mut fixed = vec![0u8; 96];
    fixed[0] = 0x7f;
    fixed[47] = 0x05;
    fixed[95] = 0x09;
    let der = ecdsa_fixed_to_der(&fixed, 48).unwrap();
    assert_eq!(ecdsa_der_to_fixed(&der, 48).unwrap(), fixed);
}

#[test]
fn fixed_length_must_match_field_size() {
    let err = ecdsa_fixed_to_der(&[0u8; 63], 32).unwrap_err();
    assert!(matches!(err, CryptoError::InvalidSignature(_)));
}
