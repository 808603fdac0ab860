// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! SHA3-256 hashing and the fixed-width [`HashValue`] used throughout the
//! SDK for digests, authentication keys, and signing-message prefixes.

use crate::error::CryptoMaterialError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tiny_keccak::{Hasher, Sha3};

/// Output value of the chain's cryptographic hash function.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HashValue {
    hash: [u8; HashValue::LENGTH],
}

impl HashValue {
    /// Length of a hash in bytes.
    pub const LENGTH: usize = 32;

    pub fn new(hash: [u8; HashValue::LENGTH]) -> Self {
        HashValue { hash }
    }

    /// The all-zero hash.
    pub fn zero() -> Self {
        HashValue {
            hash: [0; HashValue::LENGTH],
        }
    }

    /// SHA3-256 of `bytes`.
    pub fn sha3_256_of(bytes: &[u8]) -> Self {
        let mut digest = [0u8; HashValue::LENGTH];
        let mut sha3 = Sha3::v256();
        sha3.update(bytes);
        sha3.finalize(&mut digest);
        HashValue::new(digest)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        let hash: [u8; HashValue::LENGTH] = bytes
            .try_into()
            .map_err(|_| CryptoMaterialError::WrongLengthError)?;
        Ok(HashValue::new(hash))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.hash
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.hash.to_vec()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

impl AsRef<[u8]> for HashValue {
    fn as_ref(&self) -> &[u8] {
        &self.hash
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue(0x{})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn sha3_256_known_vector() {
        // SHA3-256 of the empty string.
        assert_eq!(
            HashValue::sha3_256_of(b"").as_slice(),
            hex!("a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a")
        );
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert_eq!(
            HashValue::from_slice(&[0u8; 31]).unwrap_err(),
            CryptoMaterialError::WrongLengthError
        );
    }
}
