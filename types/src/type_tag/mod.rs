// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Structured descriptors of Move-style value types. A [`TypeTag`] is what
//! the payload builder consults to decide the serialization shape of each
//! argument, and what a transaction's type-argument list carries on the wire.

mod parser;

pub use parser::TypeTagParseError;

use crate::{account_address::AccountAddress, identifier::Identifier};
use meridian_bcs::{Deserializable, DecodeError, Deserializer, EncodeError, Serializable, Serializer};
use std::{fmt, str::FromStr};

/// A Move-style type. The wire variant indices are fixed by the chain's
/// historical encoding and must not be renumbered: bool=0, u8=1, u64=2,
/// u128=3, address=4, signer=5, vector=6, struct=7, u16=8, u32=9, u256=10.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum TypeTag {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    /// A reference marker, e.g. `&signer`. References exist only so ABIs can
    /// mark signer parameters; they are supplied out-of-band by the signing
    /// step and have no wire representation.
    Reference(Box<TypeTag>),
}

impl TypeTag {
    /// True for `signer` and `&signer`, the parameter kinds the authenticator
    /// consumes instead of the payload.
    pub fn is_signer(&self) -> bool {
        match self {
            TypeTag::Signer => true,
            TypeTag::Reference(inner) => matches!(inner.as_ref(), TypeTag::Signer),
            _ => false,
        }
    }

    /// True when this tag is the object-wrapper struct, which shares the wire
    /// shape of a plain address. The check is on the special-cased struct
    /// name, never on the shape of the generic arguments.
    pub fn is_object_wrapper(&self) -> bool {
        matches!(self, TypeTag::Struct(tag) if tag.is_object())
    }
}

/// A fully qualified struct type: `address::module::Name<T0, T1, ...>`.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct StructTag {
    pub address: AccountAddress,
    pub module: Identifier,
    pub name: Identifier,
    pub type_args: Vec<TypeTag>,
}

impl StructTag {
    fn is_framework(&self, module: &str, name: &str) -> bool {
        self.address == AccountAddress::ONE
            && self.module.as_str() == module
            && self.name.as_str() == name
    }

    /// `0x1::object::Object<T>`: an on-chain object reference, serialized as
    /// the object's address.
    pub fn is_object(&self) -> bool {
        self.is_framework("object", "Object")
    }

    /// `0x1::option::Option<T>`: serialized as a zero-or-one-element vector.
    pub fn is_option(&self) -> bool {
        self.is_framework("option", "Option")
    }

    /// `0x1::string::String`: serialized as a length-prefixed UTF-8 string.
    pub fn is_utf8_string(&self) -> bool {
        self.is_framework("string", "String")
    }
}

/// A module on chain, identified by publishing address and name.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ModuleId {
    pub address: AccountAddress,
    pub name: Identifier,
}

impl ModuleId {
    pub fn new(address: AccountAddress, name: Identifier) -> Self {
        ModuleId { address, name }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.address.to_hex_literal(), self.name)
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            self.address.to_hex_literal(),
            self.module,
            self.name
        )?;
        if let Some(first) = self.type_args.first() {
            write!(f, "<{}", first)?;
            for arg in &self.type_args[1..] {
                write!(f, ", {}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::U8 => write!(f, "u8"),
            TypeTag::U16 => write!(f, "u16"),
            TypeTag::U32 => write!(f, "u32"),
            TypeTag::U64 => write!(f, "u64"),
            TypeTag::U128 => write!(f, "u128"),
            TypeTag::U256 => write!(f, "u256"),
            TypeTag::Address => write!(f, "address"),
            TypeTag::Signer => write!(f, "signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{}>", inner),
            TypeTag::Struct(tag) => write!(f, "{}", tag),
            TypeTag::Reference(inner) => write!(f, "&{}", inner),
        }
    }
}

impl FromStr for TypeTag {
    type Err = TypeTagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_type_tag(s)
    }
}

impl FromStr for StructTag {
    type Err = TypeTagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parser::parse_type_tag(s)? {
            TypeTag::Struct(tag) => Ok(*tag),
            other => Err(TypeTagParseError::unexpected_kind(other.to_string())),
        }
    }
}

impl Serializable for TypeTag {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        match self {
            TypeTag::Bool => serializer.serialize_variant_index(0),
            TypeTag::U8 => serializer.serialize_variant_index(1),
            TypeTag::U64 => serializer.serialize_variant_index(2),
            TypeTag::U128 => serializer.serialize_variant_index(3),
            TypeTag::Address => serializer.serialize_variant_index(4),
            TypeTag::Signer => serializer.serialize_variant_index(5),
            TypeTag::Vector(inner) => {
                serializer.serialize_variant_index(6);
                inner.serialize(serializer)?;
            }
            TypeTag::Struct(tag) => {
                serializer.serialize_variant_index(7);
                tag.serialize(serializer)?;
            }
            TypeTag::U16 => serializer.serialize_variant_index(8),
            TypeTag::U32 => serializer.serialize_variant_index(9),
            TypeTag::U256 => serializer.serialize_variant_index(10),
            TypeTag::Reference(_) => {
                return Err(EncodeError::custom(
                    "reference types have no wire representation",
                ))
            }
        }
        Ok(())
    }
}

impl Deserializable for TypeTag {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        let tag = match deserializer.deserialize_variant_index()? {
            0 => TypeTag::Bool,
            1 => TypeTag::U8,
            2 => TypeTag::U64,
            3 => TypeTag::U128,
            4 => TypeTag::Address,
            5 => TypeTag::Signer,
            6 => TypeTag::Vector(Box::new(TypeTag::deserialize(deserializer)?)),
            7 => TypeTag::Struct(Box::new(StructTag::deserialize(deserializer)?)),
            8 => TypeTag::U16,
            9 => TypeTag::U32,
            10 => TypeTag::U256,
            index => {
                return Err(DecodeError::UnknownVariant {
                    type_name: "TypeTag",
                    index,
                })
            }
        };
        Ok(tag)
    }
}

impl Serializable for StructTag {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        self.address.serialize(serializer)?;
        self.module.serialize(serializer)?;
        self.name.serialize(serializer)?;
        self.type_args.serialize(serializer)
    }
}

impl Deserializable for StructTag {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        Ok(StructTag {
            address: AccountAddress::deserialize(deserializer)?,
            module: Identifier::deserialize(deserializer)?,
            name: Identifier::deserialize(deserializer)?,
            type_args: Vec::<TypeTag>::deserialize(deserializer)?,
        })
    }
}

impl Serializable for ModuleId {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        self.address.serialize(serializer)?;
        self.name.serialize(serializer)
    }
}

impl Deserializable for ModuleId {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        Ok(ModuleId {
            address: AccountAddress::deserialize(deserializer)?,
            name: Identifier::deserialize(deserializer)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_parser() {
        let cases = [
            "bool",
            "u8",
            "u256",
            "address",
            "signer",
            "vector<u8>",
            "vector<vector<vector<u64>>>",
            "0x1::option::Option<u64>",
            "vector<0x1::option::Option<u64>>",
            "0x42::pool::Pool<0x1::string::String, vector<bool>>",
        ];
        for case in cases {
            let tag: TypeTag = case.parse().unwrap();
            let rendered = tag.to_string();
            let reparsed: TypeTag = rendered.parse().unwrap();
            assert_eq!(reparsed, tag, "{} did not round-trip", case);
        }
    }

    #[test]
    fn wire_indices_are_stable() {
        assert_eq!(meridian_bcs::to_bytes(&TypeTag::Bool).unwrap(), vec![0]);
        assert_eq!(meridian_bcs::to_bytes(&TypeTag::U64).unwrap(), vec![2]);
        assert_eq!(meridian_bcs::to_bytes(&TypeTag::U16).unwrap(), vec![8]);
        assert_eq!(meridian_bcs::to_bytes(&TypeTag::U256).unwrap(), vec![10]);
        assert_eq!(
            meridian_bcs::to_bytes(&TypeTag::Vector(Box::new(TypeTag::U8))).unwrap(),
            vec![6, 1]
        );
    }

    #[test]
    fn struct_tag_bcs_round_trips() {
        let tag: TypeTag = "0x1::coin::CoinStore<0x1::meridian_coin::MeridianCoin>"
            .parse()
            .unwrap();
        let encoded = meridian_bcs::to_bytes(&tag).unwrap();
        let decoded: TypeTag = meridian_bcs::from_bytes(&encoded).unwrap();
        assert_eq!(decoded, tag);
    }

    #[test]
    fn references_do_not_serialize() {
        let tag: TypeTag = "&signer".parse().unwrap();
        assert!(tag.is_signer());
        assert!(meridian_bcs::to_bytes(&tag).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn identifier_strategy() -> impl Strategy<Value = Identifier> {
            "[a-z][a-z0-9_]{0,12}".prop_map(|s| Identifier::new(s.as_str()).unwrap())
        }

        fn type_tag_strategy() -> impl Strategy<Value = TypeTag> {
            let leaf = prop_oneof![
                Just(TypeTag::Bool),
                Just(TypeTag::U8),
                Just(TypeTag::U16),
                Just(TypeTag::U32),
                Just(TypeTag::U64),
                Just(TypeTag::U128),
                Just(TypeTag::U256),
                Just(TypeTag::Address),
                Just(TypeTag::Signer),
            ];
            leaf.prop_recursive(3, 16, 4, |inner| {
                prop_oneof![
                    inner.clone().prop_map(|tag| TypeTag::Vector(Box::new(tag))),
                    (
                        any::<[u8; 32]>(),
                        identifier_strategy(),
                        identifier_strategy(),
                        proptest::collection::vec(inner, 0..3),
                    )
                        .prop_map(|(address, module, name, type_args)| {
                            TypeTag::Struct(Box::new(StructTag {
                                address: AccountAddress::new(address),
                                module,
                                name,
                                type_args,
                            }))
                        }),
                ]
            })
        }

        proptest! {
            #[test]
            fn display_then_parse_is_identity(tag in type_tag_strategy()) {
                let reparsed: TypeTag = tag.to_string().parse().unwrap();
                prop_assert_eq!(reparsed, tag);
            }

            #[test]
            fn bcs_round_trips_arbitrary_tags(tag in type_tag_strategy()) {
                let encoded = meridian_bcs::to_bytes(&tag).unwrap();
                let decoded: TypeTag = meridian_bcs::from_bytes(&encoded).unwrap();
                prop_assert_eq!(decoded, tag);
            }
        }
    }

    #[test]
    fn object_wrapper_detection_is_name_based() {
        let object: TypeTag = "0x1::object::Object<0x99::market::Listing>".parse().unwrap();
        assert!(object.is_object_wrapper());

        // Same shape, different name: not an object wrapper.
        let lookalike: TypeTag = "0x1::object::Holder<0x99::market::Listing>".parse().unwrap();
        assert!(!lookalike.is_object_wrapper());

        // Same name published at a non-framework address: not an object wrapper.
        let foreign: TypeTag = "0x2::object::Object<0x99::market::Listing>".parse().unwrap();
        assert!(!foreign.is_object_wrapper());
    }
}
