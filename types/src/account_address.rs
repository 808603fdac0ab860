// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

use meridian_bcs::{Deserializable, Deserializer, Serializable, Serializer};
use serde::{Deserialize, Deserializer as SerdeDeserializer, Serialize, Serializer as SerdeSerializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// A 32-byte account address.
///
/// On the wire an address is its raw bytes with no length prefix. In text it
/// is hex, with or without a `0x` prefix; short literals such as `0x1` are
/// left-padded with zeros.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AccountAddress([u8; AccountAddress::LENGTH]);

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("invalid account address literal `{0}`")]
pub struct AccountAddressParseError(String);

impl AccountAddress {
    /// The number of bytes in an address.
    pub const LENGTH: usize = 32;

    /// Address of the core framework account, `0x1`.
    pub const ONE: Self = Self::get_hex_address_one();
    /// The reserved zero address.
    pub const ZERO: Self = Self([0u8; Self::LENGTH]);

    const fn get_hex_address_one() -> Self {
        let mut addr = [0u8; Self::LENGTH];
        addr[Self::LENGTH - 1] = 1u8;
        Self(addr)
    }

    pub const fn new(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AccountAddressParseError> {
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| AccountAddressParseError(hex::encode(bytes)))
    }

    /// Parses a `0x`-prefixed hex literal, allowing fewer than 64 digits.
    pub fn from_hex_literal(literal: &str) -> Result<Self, AccountAddressParseError> {
        let hex = literal
            .strip_prefix("0x")
            .ok_or_else(|| AccountAddressParseError(literal.to_string()))?;
        if hex.is_empty() || hex.len() > Self::LENGTH * 2 {
            return Err(AccountAddressParseError(literal.to_string()));
        }
        // Left-pad odd-length and short literals.
        let mut padded = String::with_capacity(Self::LENGTH * 2);
        for _ in hex.len()..Self::LENGTH * 2 {
            padded.push('0');
        }
        padded.push_str(hex);
        let bytes =
            hex::decode(&padded).map_err(|_| AccountAddressParseError(literal.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Parses exactly 64 hex digits with no prefix.
    pub fn from_hex(hex_str: &str) -> Result<Self, AccountAddressParseError> {
        if hex_str.len() != Self::LENGTH * 2 {
            return Err(AccountAddressParseError(hex_str.to_string()));
        }
        let bytes =
            hex::decode(hex_str).map_err(|_| AccountAddressParseError(hex_str.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn into_bytes(self) -> [u8; Self::LENGTH] {
        self.0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Renders the short literal form, e.g. `0x1`.
    pub fn to_hex_literal(&self) -> String {
        let full = self.to_hex();
        let trimmed = full.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{}", trimmed)
        }
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for AccountAddress {
    type Err = AccountAddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") {
            Self::from_hex_literal(s)
        } else {
            Self::from_hex(s)
        }
    }
}

impl AsRef<[u8]> for AccountAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serializable for AccountAddress {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), meridian_bcs::EncodeError> {
        serializer.serialize_fixed_bytes(&self.0);
        Ok(())
    }
}

impl Deserializable for AccountAddress {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, meridian_bcs::DecodeError> {
        let bytes = deserializer.deserialize_fixed_bytes(Self::LENGTH)?;
        Ok(Self(bytes.try_into().expect("fixed-length read")))
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: SerdeSerializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: SerdeDeserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let literal = <String as Deserialize>::deserialize(deserializer)?;
            AccountAddress::from_str(&literal).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8> as Deserialize>::deserialize(deserializer)?;
            AccountAddress::from_bytes(&bytes).map_err(serde::de::Error::custom)
        }
    }
}
