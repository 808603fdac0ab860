// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

use meridian_bcs::{Deserializable, Deserializer, Serializable, Serializer};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Named chains with stable ids. Chain ids above the named range belong to
/// ephemeral local networks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum NamedChain {
    Mainnet = 1,
    Testnet = 2,
    Testing = 4,
}

impl NamedChain {
    fn from_chain_id(chain_id: ChainId) -> Option<NamedChain> {
        match chain_id.id() {
            1 => Some(NamedChain::Mainnet),
            2 => Some(NamedChain::Testnet),
            4 => Some(NamedChain::Testing),
            _ => None,
        }
    }

    pub fn id(&self) -> u8 {
        *self as u8
    }
}

impl FromStr for NamedChain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(NamedChain::Mainnet),
            "testnet" => Ok(NamedChain::Testnet),
            "testing" => Ok(NamedChain::Testing),
            _ => Err(format!("unknown chain name `{}`", s)),
        }
    }
}

/// A single byte identifying the network a transaction is intended for,
/// preventing cross-chain replay of otherwise identical transactions.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(u8);

impl ChainId {
    pub fn new(id: u8) -> Self {
        ChainId(id)
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    pub fn mainnet() -> Self {
        ChainId(NamedChain::Mainnet.id())
    }

    pub fn testnet() -> Self {
        ChainId(NamedChain::Testnet.id())
    }

    /// The id used by local testing networks.
    pub fn test() -> Self {
        ChainId(NamedChain::Testing.id())
    }

    pub fn is_mainnet(&self) -> bool {
        NamedChain::from_chain_id(*self) == Some(NamedChain::Mainnet)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match NamedChain::from_chain_id(*self) {
            Some(chain) => write!(f, "{:?}", chain),
            None => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", self)
    }
}

impl FromStr for ChainId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("chain id cannot be empty".to_string());
        }
        match s.parse::<u8>() {
            Ok(id) => Ok(ChainId(id)),
            Err(_) => NamedChain::from_str(s).map(|chain| ChainId(chain.id())),
        }
    }
}

impl Serializable for ChainId {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), meridian_bcs::EncodeError> {
        serializer.serialize_u8(self.0);
        Ok(())
    }
}

impl Deserializable for ChainId {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, meridian_bcs::DecodeError> {
        Ok(ChainId(deserializer.deserialize_u8()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_and_numeric_parsing() {
        assert_eq!(ChainId::from_str("mainnet").unwrap(), ChainId::mainnet());
        assert_eq!(ChainId::from_str("TESTNET").unwrap(), ChainId::testnet());
        assert_eq!(ChainId::from_str("42").unwrap(), ChainId::new(42));
        assert!(ChainId::from_str("devnet7").is_err());
        assert!(ChainId::from_str("").is_err());
    }

    #[test]
    fn encodes_as_one_byte() {
        let encoded = meridian_bcs::to_bytes(&ChainId::test()).unwrap();
        assert_eq!(encoded, vec![4]);
    }
}
