// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

use ethnum::U256;
use meridian_bcs::{from_bytes, to_bytes, DecodeError};
use proptest::prelude::*;

fn round_trip<T>(value: &T)
where
    T: meridian_bcs::Serializable + meridian_bcs::Deserializable + PartialEq + std::fmt::Debug,
{
    let encoded = to_bytes(value).expect("serialization cannot fail for supported values");
    let decoded: T = from_bytes(&encoded).expect("well-formed encoding must decode");
    assert_eq!(&decoded, value);
    // Round-trip fidelity in the other direction: re-encoding reproduces the
    // exact byte string.
    assert_eq!(to_bytes(&decoded).unwrap(), encoded);
}

proptest! {
    #[test]
    fn u8_round_trips(value in any::<u8>()) {
        round_trip(&value);
    }

    #[test]
    fn u16_round_trips(value in any::<u16>()) {
        round_trip(&value);
    }

    #[test]
    fn u32_round_trips(value in any::<u32>()) {
        round_trip(&value);
    }

    #[test]
    fn u64_round_trips(value in any::<u64>()) {
        round_trip(&value);
    }

    #[test]
    fn u128_round_trips(value in any::<u128>()) {
        round_trip(&value);
    }

    #[test]
    fn u256_round_trips(words in any::<[u128; 2]>()) {
        round_trip(&U256::from_words(words[0], words[1]));
    }

    #[test]
    fn string_round_trips(value in ".{0,64}") {
        round_trip(&value);
    }

    #[test]
    fn byte_vector_round_trips(value in proptest::collection::vec(any::<u8>(), 0..256)) {
        round_trip(&value);
    }

    #[test]
    fn nested_vector_round_trips(
        value in proptest::collection::vec(
            proptest::collection::vec(any::<u64>(), 0..8),
            0..8,
        )
    ) {
        round_trip(&value);
    }

    #[test]
    fn option_round_trips(value in proptest::option::of(any::<u64>())) {
        round_trip(&value);
    }

    #[test]
    fn truncation_always_errors(value in proptest::collection::vec(any::<u64>(), 1..16)) {
        let encoded = to_bytes(&value).unwrap();
        // Chopping any suffix off a non-empty encoding must fail, never
        // return a short vector.
        for cut in 0..encoded.len() {
            prop_assert!(from_bytes::<Vec<u64>>(&encoded[..cut]).is_err());
        }
    }

    #[test]
    fn trailing_garbage_always_errors(value in any::<u64>(), garbage in 1usize..8) {
        let mut encoded = to_bytes(&value).unwrap();
        encoded.extend(std::iter::repeat(0u8).take(garbage));
        prop_assert_eq!(
            from_bytes::<u64>(&encoded).unwrap_err(),
            DecodeError::TrailingData { remaining: garbage }
        );
    }
}

#[test]
fn boundary_values() {
    round_trip(&0u8);
    round_trip(&u8::MAX);
    round_trip(&0u64);
    round_trip(&u64::MAX);
    round_trip(&U256::ZERO);
    round_trip(&U256::MAX);
    round_trip(&String::new());
    round_trip(&Vec::<u8>::new());
    round_trip(&Vec::<Vec<String>>::new());
    round_trip(&None::<u64>);
    round_trip(&Some(u64::MAX));
    round_trip(&[7u8; 4]);
    round_trip(&(1u8, "pair".to_string()));
    round_trip(&(true, 2u64, vec![3u8]));
}

#[test]
fn fixed_arrays_have_no_length_prefix() {
    assert_eq!(to_bytes(&[0xAAu8; 4]).unwrap(), vec![0xAA; 4]);
    assert!(from_bytes::<[u8; 4]>(&[1, 2, 3]).is_err());
}

#[test]
fn max_u64_is_eight_ff_bytes() {
    let encoded = to_bytes(&18446744073709551615u64).unwrap();
    assert_eq!(encoded, vec![0xff; 8]);
    assert_eq!(from_bytes::<u64>(&encoded).unwrap(), 18446744073709551615);
}

#[test]
fn two_element_option_encoding_is_rejected() {
    // A hand-built "option" carrying two elements must not decode.
    let bogus = [0x02u8, 0x01, 0x01];
    assert_eq!(
        from_bytes::<Option<u8>>(&bogus).unwrap_err(),
        DecodeError::InvalidOption(2)
    );
}
