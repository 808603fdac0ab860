// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Conversion of caller-supplied argument values into their canonical BCS
//! encodings, driven entirely by the parameter's resolved [`TypeTag`].
//!
//! Two input surfaces share one coercion table: the typed [`ArgValue`] path
//! used when building entry-function payloads in Rust, and the JSON path
//! used for human-friendly view requests. Neither ever silently coerces: an
//! over-width integer, a float where an integer is expected, or a value of
//! the wrong shape is an [`ArgumentTypeMismatch`](crate::BuilderError)
//! naming the offending parameter.

use crate::error::BuilderError;
use meridian_bcs::{Serializer, U256};
use meridian_types::{account_address::AccountAddress, type_tag::TypeTag};
use std::str::FromStr;

/// The largest integer a JSON number can carry without precision loss
/// (2^53 - 1). Wider values must be passed as decimal strings.
pub const JSON_MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// A caller-supplied argument value, prior to conversion against the ABI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(U256),
    Address(AccountAddress),
    /// A string: either a `0x1::string::String` value, a decimal rendering
    /// of a wide integer, or a hex rendering of bytes/addresses.
    Str(String),
    /// Raw bytes for a `vector<u8>` parameter.
    Bytes(Vec<u8>),
    Vector(Vec<ArgValue>),
    OptionSome(Box<ArgValue>),
    OptionNone,
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<u8> for ArgValue {
    fn from(value: u8) -> Self {
        ArgValue::U8(value)
    }
}

impl From<u64> for ArgValue {
    fn from(value: u64) -> Self {
        ArgValue::U64(value)
    }
}

impl From<u128> for ArgValue {
    fn from(value: u128) -> Self {
        ArgValue::U128(value)
    }
}

impl From<AccountAddress> for ArgValue {
    fn from(value: AccountAddress) -> Self {
        ArgValue::Address(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<Vec<u8>> for ArgValue {
    fn from(value: Vec<u8>) -> Self {
        ArgValue::Bytes(value)
    }
}

/// Converts one argument to its BCS encoding per `tag`. `index` is the
/// parameter's position, used only for error attribution.
pub fn convert_arg(index: usize, tag: &TypeTag, value: &ArgValue) -> Result<Vec<u8>, BuilderError> {
    let mut serializer = Serializer::new();
    encode_arg(index, tag, value, &mut serializer)?;
    Ok(serializer.into_bytes())
}

/// Converts one JSON argument to its BCS encoding per `tag`, using the same
/// coercion rules as the typed path.
pub fn convert_json_arg(
    index: usize,
    tag: &TypeTag,
    value: &serde_json::Value,
) -> Result<Vec<u8>, BuilderError> {
    let typed = json_to_arg(index, tag, value)?;
    convert_arg(index, tag, &typed)
}

fn encode_arg(
    index: usize,
    tag: &TypeTag,
    value: &ArgValue,
    serializer: &mut Serializer,
) -> Result<(), BuilderError> {
    match tag {
        TypeTag::Bool => match value {
            ArgValue::Bool(b) => {
                serializer.serialize_bool(*b);
                Ok(())
            }
            other => Err(mismatched(index, tag, other)),
        },
        TypeTag::U8 => {
            serializer.serialize_u8(parse_int::<u8>(index, tag, value, |v| match v {
                ArgValue::U8(n) => Some(*n),
                _ => None,
            })?);
            Ok(())
        }
        TypeTag::U16 => {
            serializer.serialize_u16(parse_int::<u16>(index, tag, value, |v| match v {
                ArgValue::U16(n) => Some(*n),
                _ => None,
            })?);
            Ok(())
        }
        TypeTag::U32 => {
            serializer.serialize_u32(parse_int::<u32>(index, tag, value, |v| match v {
                ArgValue::U32(n) => Some(*n),
                _ => None,
            })?);
            Ok(())
        }
        TypeTag::U64 => {
            serializer.serialize_u64(parse_int::<u64>(index, tag, value, |v| match v {
                ArgValue::U64(n) => Some(*n),
                _ => None,
            })?);
            Ok(())
        }
        TypeTag::U128 => {
            serializer.serialize_u128(parse_int::<u128>(index, tag, value, |v| match v {
                ArgValue::U128(n) => Some(*n),
                _ => None,
            })?);
            Ok(())
        }
        TypeTag::U256 => {
            serializer.serialize_u256(parse_int::<U256>(index, tag, value, |v| match v {
                ArgValue::U256(n) => Some(*n),
                _ => None,
            })?);
            Ok(())
        }
        TypeTag::Address => {
            let address = parse_address(index, tag, value)?;
            serializer.serialize_fixed_bytes(address.as_slice());
            Ok(())
        }
        TypeTag::Signer | TypeTag::Reference(_) => Err(BuilderError::mismatch(
            index,
            tag,
            "signer parameters are supplied by the signing step, not the argument list",
        )),
        TypeTag::Vector(inner) => encode_vector(index, tag, inner, value, serializer),
        TypeTag::Struct(struct_tag) => {
            if struct_tag.is_utf8_string() {
                match value {
                    ArgValue::Str(s) => {
                        serializer.serialize_str(s)?;
                        Ok(())
                    }
                    other => Err(mismatched(index, tag, other)),
                }
            } else if struct_tag.is_option() {
                let inner = struct_tag.type_args.first().ok_or_else(|| {
                    BuilderError::mismatch(index, tag, "option tag is missing its element type")
                })?;
                match value {
                    ArgValue::OptionNone => {
                        serializer.serialize_u8(0);
                        Ok(())
                    }
                    ArgValue::OptionSome(element) => {
                        serializer.serialize_u8(1);
                        encode_arg(index, inner, element, serializer)
                    }
                    other => Err(mismatched(index, tag, other)),
                }
            } else if struct_tag.is_object() {
                // Object wrappers share the wire shape of a plain address.
                let address = parse_address(index, tag, value)?;
                serializer.serialize_fixed_bytes(address.as_slice());
                Ok(())
            } else {
                Err(BuilderError::mismatch(
                    index,
                    tag,
                    "arbitrary struct parameters are not constructible from client values",
                ))
            }
        }
    }
}

fn encode_vector(
    index: usize,
    tag: &TypeTag,
    inner: &TypeTag,
    value: &ArgValue,
    serializer: &mut Serializer,
) -> Result<(), BuilderError> {
    // vector<u8> additionally accepts raw bytes and 0x-hex strings.
    if *inner == TypeTag::U8 {
        match value {
            ArgValue::Bytes(bytes) => {
                serializer.serialize_bytes(bytes)?;
                return Ok(());
            }
            ArgValue::Str(s) => {
                let bytes = decode_hex(index, tag, s)?;
                serializer.serialize_bytes(&bytes)?;
                return Ok(());
            }
            _ => {}
        }
    }
    match value {
        ArgValue::Vector(elements) => {
            serializer.serialize_sequence_length(elements.len())?;
            for element in elements {
                encode_arg(index, inner, element, serializer)?;
            }
            Ok(())
        }
        other => Err(mismatched(index, tag, other)),
    }
}

fn mismatched(index: usize, tag: &TypeTag, value: &ArgValue) -> BuilderError {
    BuilderError::mismatch(index, tag, format!("incompatible value {:?}", value))
}

/// Integers accept their exact-width variant or a decimal string; anything
/// else — including a wider variant that happens to hold a small value — is
/// a mismatch, so no call site ever relies on silent narrowing.
fn parse_int<T: FromStr + Copy>(
    index: usize,
    tag: &TypeTag,
    value: &ArgValue,
    exact: impl Fn(&ArgValue) -> Option<T>,
) -> Result<T, BuilderError> {
    if let Some(native) = exact(value) {
        return Ok(native);
    }
    match value {
        ArgValue::Str(s) => s.parse::<T>().map_err(|_| {
            BuilderError::mismatch(index, tag, format!("`{}` is not a {} value", s, tag))
        }),
        other => Err(mismatched(index, tag, other)),
    }
}

fn parse_address(
    index: usize,
    tag: &TypeTag,
    value: &ArgValue,
) -> Result<AccountAddress, BuilderError> {
    match value {
        ArgValue::Address(address) => Ok(*address),
        ArgValue::Str(s) => AccountAddress::from_str(s)
            .map_err(|e| BuilderError::mismatch(index, tag, e.to_string())),
        other => Err(mismatched(index, tag, other)),
    }
}

fn decode_hex(index: usize, tag: &TypeTag, s: &str) -> Result<Vec<u8>, BuilderError> {
    let stripped = s.strip_prefix("0x").ok_or_else(|| {
        BuilderError::mismatch(index, tag, "byte strings must be 0x-prefixed hex")
    })?;
    hex::decode(stripped).map_err(|e| BuilderError::mismatch(index, tag, e.to_string()))
}

fn json_to_arg(
    index: usize,
    tag: &TypeTag,
    value: &serde_json::Value,
) -> Result<ArgValue, BuilderError> {
    use serde_json::Value;

    let fail = |reason: &str| Err(BuilderError::mismatch(index, tag, reason));

    match tag {
        TypeTag::Bool => match value {
            Value::Bool(b) => Ok(ArgValue::Bool(*b)),
            _ => fail("expected a JSON boolean"),
        },
        TypeTag::U8 | TypeTag::U16 | TypeTag::U32 => {
            let n = json_safe_integer(index, tag, value)?;
            Ok(match tag {
                TypeTag::U8 => ArgValue::U8(narrow(index, tag, n)?),
                TypeTag::U16 => ArgValue::U16(narrow(index, tag, n)?),
                _ => ArgValue::U32(narrow(index, tag, n)?),
            })
        }
        // Wider integers must arrive as strings (or safe-range numbers);
        // a 64-bit-plus JSON number would already have been rounded by any
        // float-based JSON producer.
        TypeTag::U64 | TypeTag::U128 | TypeTag::U256 => match value {
            Value::String(s) => Ok(ArgValue::Str(s.clone())),
            Value::Number(_) => {
                let n = json_safe_integer(index, tag, value)?;
                Ok(ArgValue::Str(n.to_string()))
            }
            _ => fail("expected a decimal string or safe-range integer"),
        },
        TypeTag::Address => match value {
            Value::String(s) => Ok(ArgValue::Str(s.clone())),
            _ => fail("expected a hex address string"),
        },
        TypeTag::Signer | TypeTag::Reference(_) => {
            fail("signer parameters are supplied by the signing step, not the argument list")
        }
        TypeTag::Vector(inner) => {
            if **inner == TypeTag::U8 {
                if let Value::String(s) = value {
                    return Ok(ArgValue::Str(s.clone()));
                }
            }
            match value {
                Value::Array(elements) => Ok(ArgValue::Vector(
                    elements
                        .iter()
                        .map(|element| json_to_arg(index, inner, element))
                        .collect::<Result<Vec<_>, _>>()?,
                )),
                _ => fail("expected a JSON array"),
            }
        }
        TypeTag::Struct(struct_tag) => {
            if struct_tag.is_utf8_string() {
                match value {
                    Value::String(s) => Ok(ArgValue::Str(s.clone())),
                    _ => fail("expected a JSON string"),
                }
            } else if struct_tag.is_option() {
                let inner = struct_tag.type_args.first().ok_or_else(|| {
                    BuilderError::mismatch(index, tag, "option tag is missing its element type")
                })?;
                match value {
                    Value::Null => Ok(ArgValue::OptionNone),
                    present => Ok(ArgValue::OptionSome(Box::new(json_to_arg(
                        index, inner, present,
                    )?))),
                }
            } else if struct_tag.is_object() {
                match value {
                    Value::String(s) => Ok(ArgValue::Str(s.clone())),
                    _ => fail("expected a hex address string"),
                }
            } else {
                fail("arbitrary struct parameters are not constructible from client values")
            }
        }
    }
}

/// Extracts an integral JSON number within the float-safe range.
fn json_safe_integer(
    index: usize,
    tag: &TypeTag,
    value: &serde_json::Value,
) -> Result<u64, BuilderError> {
    let number = match value {
        serde_json::Value::Number(n) => n,
        serde_json::Value::String(s) => {
            return s.parse::<u64>().map_err(|_| {
                BuilderError::mismatch(index, tag, format!("`{}` is not an integer", s))
            })
        }
        _ => return Err(BuilderError::mismatch(index, tag, "expected an integer")),
    };
    let n = number.as_u64().ok_or_else(|| {
        BuilderError::mismatch(
            index,
            tag,
            "expected a non-negative integer, not a float or negative number",
        )
    })?;
    if n > JSON_MAX_SAFE_INTEGER {
        return Err(BuilderError::mismatch(
            index,
            tag,
            "integer exceeds the float-safe range; pass it as a decimal string",
        ));
    }
    Ok(n)
}

fn narrow<T: TryFrom<u64>>(index: usize, tag: &TypeTag, n: u64) -> Result<T, BuilderError> {
    T::try_from(n)
        .map_err(|_| BuilderError::mismatch(index, tag, format!("{} does not fit in {}", n, tag)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tag(signature: &str) -> TypeTag {
        signature.parse().unwrap()
    }

    #[test]
    fn integers_encode_exact_width() {
        assert_eq!(
            convert_arg(0, &tag("u64"), &ArgValue::U64(u64::MAX)).unwrap(),
            vec![0xff; 8]
        );
        assert_eq!(
            convert_arg(0, &tag("u8"), &ArgValue::U8(7)).unwrap(),
            vec![7]
        );
    }

    #[test]
    fn wide_integers_accept_decimal_strings() {
        assert_eq!(
            convert_arg(0, &tag("u64"), &"18446744073709551615".into()).unwrap(),
            vec![0xff; 8]
        );
        assert_eq!(
            convert_arg(0, &tag("u256"), &"1".into()).unwrap(),
            meridian_bcs::to_bytes(&U256::ONE).unwrap()
        );
    }

    #[test]
    fn overflowing_string_is_a_mismatch() {
        let err = convert_arg(3, &tag("u8"), &"256".into()).unwrap_err();
        match err {
            BuilderError::ArgumentTypeMismatch { index, expected, .. } => {
                assert_eq!(index, 3);
                assert_eq!(expected, "u8");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn wider_variant_is_never_narrowed() {
        // A u64-typed value for a u8 parameter fails even when it would fit.
        assert!(convert_arg(0, &tag("u8"), &ArgValue::U64(1)).is_err());
    }

    #[test]
    fn addresses_accept_hex_literals() {
        let direct = convert_arg(
            0,
            &tag("address"),
            &AccountAddress::from_hex_literal("0x1").unwrap().into(),
        )
        .unwrap();
        let parsed = convert_arg(0, &tag("address"), &"0x1".into()).unwrap();
        assert_eq!(direct, parsed);
        assert_eq!(direct.len(), 32);
    }

    #[test]
    fn byte_vectors_accept_hex_and_raw() {
        let from_hex = convert_arg(0, &tag("vector<u8>"), &"0x0102ff".into()).unwrap();
        let from_bytes =
            convert_arg(0, &tag("vector<u8>"), &vec![0x01u8, 0x02, 0xff].into()).unwrap();
        assert_eq!(from_hex, from_bytes);
        assert_eq!(from_hex, vec![3, 0x01, 0x02, 0xff]);
    }

    #[test]
    fn nested_vectors_recurse() {
        let value = ArgValue::Vector(vec![
            ArgValue::Vector(vec![ArgValue::U64(1)]),
            ArgValue::Vector(vec![]),
        ]);
        let encoded = convert_arg(0, &tag("vector<vector<u64>>"), &value).unwrap();
        assert_eq!(encoded, vec![2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn option_encodes_as_zero_or_one() {
        let some = convert_arg(
            0,
            &tag("0x1::option::Option<u64>"),
            &ArgValue::OptionSome(Box::new(ArgValue::U64(5))),
        )
        .unwrap();
        assert_eq!(some, vec![1, 5, 0, 0, 0, 0, 0, 0, 0]);
        let none =
            convert_arg(0, &tag("0x1::option::Option<u64>"), &ArgValue::OptionNone).unwrap();
        assert_eq!(none, vec![0]);
    }

    #[test]
    fn object_wrapper_encodes_as_address() {
        let encoded = convert_arg(
            0,
            &tag("0x1::object::Object<0x4::token::Token>"),
            &"0xabc".into(),
        )
        .unwrap();
        assert_eq!(
            encoded,
            AccountAddress::from_hex_literal("0xabc")
                .unwrap()
                .as_slice()
        );
    }

    #[test]
    fn utf8_string_struct_takes_strings() {
        let encoded =
            convert_arg(0, &tag("0x1::string::String"), &"abc".into()).unwrap();
        assert_eq!(encoded, vec![3, 0x61, 0x62, 0x63]);
    }

    #[test]
    fn signer_argument_is_rejected() {
        assert!(convert_arg(0, &tag("&signer"), &ArgValue::Bool(true)).is_err());
        assert!(convert_arg(0, &tag("signer"), &"0x1".into()).is_err());
    }

    #[test]
    fn json_numbers_follow_safe_integer_rules() {
        assert_eq!(
            convert_json_arg(0, &tag("u64"), &json!("18446744073709551615")).unwrap(),
            vec![0xff; 8]
        );
        assert_eq!(
            convert_json_arg(0, &tag("u64"), &json!(1000)).unwrap(),
            meridian_bcs::to_bytes(&1000u64).unwrap()
        );
        // Floats never pass.
        assert!(convert_json_arg(0, &tag("u64"), &json!(1.5)).is_err());
        // Unsafe-range numbers must be strings.
        assert!(convert_json_arg(0, &tag("u64"), &json!(9007199254740993u64)).is_err());
        // Negative numbers never pass.
        assert!(convert_json_arg(0, &tag("u32"), &json!(-1)).is_err());
    }

    #[test]
    fn json_and_typed_paths_agree() {
        let cases: Vec<(&str, serde_json::Value, ArgValue)> = vec![
            ("bool", json!(true), ArgValue::Bool(true)),
            ("u8", json!(255), ArgValue::U8(255)),
            ("u64", json!("717"), ArgValue::U64(717)),
            ("address", json!("0x1"), "0x1".into()),
            ("vector<u8>", json!("0xdead"), "0xdead".into()),
            (
                "0x1::option::Option<u8>",
                json!(null),
                ArgValue::OptionNone,
            ),
            (
                "vector<u64>",
                json!(["1", "2"]),
                ArgValue::Vector(vec![ArgValue::U64(1), ArgValue::U64(2)]),
            ),
        ];
        for (signature, json_value, typed_value) in cases {
            let t = tag(signature);
            assert_eq!(
                convert_json_arg(0, &t, &json_value).unwrap(),
                convert_arg(0, &t, &typed_value).unwrap(),
                "paths disagree for {}",
                signature
            );
        }
    }
}
