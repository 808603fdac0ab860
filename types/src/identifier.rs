// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

use meridian_bcs::{Deserializable, Deserializer, Serializable, Serializer};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("invalid identifier `{0}`")]
pub struct InvalidIdentifierError(String);

/// Returns true if `s` is a valid Move-style identifier:
/// `[a-zA-Z_][a-zA-Z0-9_]*`, and not the bare underscore.
pub fn is_valid_identifier(s: &str) -> bool {
    if s == "_" {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An owned, validated module or function name.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(Box<str>);

impl Identifier {
    pub fn new(s: impl Into<Box<str>>) -> Result<Self, InvalidIdentifierError> {
        let s = s.into();
        if is_valid_identifier(&s) {
            Ok(Identifier(s))
        } else {
            Err(InvalidIdentifierError(s.into_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0.into_string()
    }
}

impl FromStr for Identifier {
    type Err = InvalidIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", &self.0)
    }
}

impl Serializable for Identifier {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), meridian_bcs::EncodeError> {
        serializer.serialize_str(&self.0)
    }
}

impl Deserializable for Identifier {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, meridian_bcs::DecodeError> {
        let s = deserializer.deserialize_str()?;
        Identifier::new(s).map_err(|e| meridian_bcs::DecodeError::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_move_identifiers() {
        for ok in ["transfer", "coin_store", "_hidden", "CoinStore", "v2"] {
            assert!(Identifier::new(ok).is_ok(), "{} should parse", ok);
        }
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for bad in ["", "_", "2fast", "has-dash", "has space", "emoji🦀"] {
            assert!(Identifier::new(bad).is_err(), "{} should be rejected", bad);
        }
    }
}
