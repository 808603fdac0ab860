// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Ed25519 keys and signatures, the chain's default account scheme.
//!
//! Verification uses `verify_strict`, which rejects the malleable encodings
//! a plain cofactored verify would accept, so no separate canonicalization
//! pass is needed for this scheme.

use crate::{
    error::CryptoMaterialError,
    traits::{SigningKey, Uniform, VerifyingKey},
};
use meridian_bcs::{Deserializable, Deserializer, Serializable, Serializer};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer as SerdeDeserializer, Serialize, Serializer as SerdeSerializer};
use std::fmt;

/// An Ed25519 private key.
pub struct Ed25519PrivateKey(ed25519_dalek::SecretKey);

/// An Ed25519 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct Ed25519PublicKey(ed25519_dalek::PublicKey);

/// An Ed25519 signature.
#[derive(Clone, PartialEq, Eq)]
pub struct Ed25519Signature(ed25519_dalek::Signature);

impl Ed25519PrivateKey {
    /// The length of the private key in bytes.
    pub const LENGTH: usize = 32;

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.0.to_bytes()
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        ed25519_dalek::SecretKey::from_bytes(bytes)
            .map(Ed25519PrivateKey)
            .map_err(|_| CryptoMaterialError::DeserializationError)
    }

    /// The public half of this key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(ed25519_dalek::PublicKey::from(&self.0))
    }
}

impl Ed25519PublicKey {
    pub const LENGTH: usize = 32;

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.0.to_bytes()
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        if bytes.len() != Self::LENGTH {
            return Err(CryptoMaterialError::WrongLengthError);
        }
        ed25519_dalek::PublicKey::from_bytes(bytes)
            .map(Ed25519PublicKey)
            .map_err(|_| CryptoMaterialError::DeserializationError)
    }
}

impl Ed25519Signature {
    pub const LENGTH: usize = 64;

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.0.to_bytes()
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        if bytes.len() != Self::LENGTH {
            return Err(CryptoMaterialError::WrongLengthError);
        }
        ed25519_dalek::Signature::try_from(bytes)
            .map(Ed25519Signature)
            .map_err(|_| CryptoMaterialError::DeserializationError)
    }

    /// An all-zero signature, used for simulated transactions that the chain
    /// never verifies.
    pub fn dummy() -> Self {
        Ed25519Signature(
            ed25519_dalek::Signature::try_from(&[0u8; Self::LENGTH][..])
                .expect("all-zero bytes parse as a signature"),
        )
    }
}

impl From<&Ed25519PrivateKey> for Ed25519PublicKey {
    fn from(private_key: &Ed25519PrivateKey) -> Self {
        private_key.public_key()
    }
}

impl SigningKey for Ed25519PrivateKey {
    type VerifyingKeyMaterial = Ed25519PublicKey;
    type SignatureMaterial = Ed25519Signature;

    fn sign_arbitrary_message(&self, message: &[u8]) -> Ed25519Signature {
        let expanded = ed25519_dalek::ExpandedSecretKey::from(&self.0);
        let public_key = ed25519_dalek::PublicKey::from(&self.0);
        Ed25519Signature(expanded.sign(message, &public_key))
    }
}

impl VerifyingKey for Ed25519PublicKey {
    type SigningKeyMaterial = Ed25519PrivateKey;
    type SignatureMaterial = Ed25519Signature;

    fn verify_arbitrary_message(
        &self,
        message: &[u8],
        signature: &Ed25519Signature,
    ) -> Result<(), CryptoMaterialError> {
        self.0
            .verify_strict(message, &signature.0)
            .map_err(|_| CryptoMaterialError::ValidationError)
    }
}

impl Uniform for Ed25519PrivateKey {
    fn generate<R>(rng: &mut R) -> Self
    where
        R: RngCore + CryptoRng,
    {
        Ed25519PrivateKey(ed25519_dalek::SecretKey::generate(rng))
    }
}

// Public keys and signatures travel on the wire as ULEB128-length-prefixed
// byte sequences inside authenticators.

impl Serializable for Ed25519PublicKey {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), meridian_bcs::EncodeError> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl Deserializable for Ed25519PublicKey {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, meridian_bcs::DecodeError> {
        let bytes = deserializer.deserialize_bytes()?;
        Ed25519PublicKey::try_from_bytes(&bytes)
            .map_err(|_| meridian_bcs::DecodeError::custom("invalid Ed25519 public key"))
    }
}

impl Serializable for Ed25519Signature {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), meridian_bcs::EncodeError> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl Deserializable for Ed25519Signature {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, meridian_bcs::DecodeError> {
        let bytes = deserializer.deserialize_bytes()?;
        Ed25519Signature::try_from_bytes(&bytes)
            .map_err(|_| meridian_bcs::DecodeError::custom("invalid Ed25519 signature"))
    }
}

impl fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519PublicKey({})", self)
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signature(0x{})", hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for Ed25519PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        write!(f, "Ed25519PrivateKey(<elided>)")
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: SerdeSerializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serde_bytes::Bytes::new(&self.to_bytes()).serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: SerdeDeserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = if deserializer.is_human_readable() {
            let encoded = <String as Deserialize>::deserialize(deserializer)?;
            hex::decode(encoded.trim_start_matches("0x")).map_err(serde::de::Error::custom)?
        } else {
            serde_bytes::deserialize::<Vec<u8>, _>(deserializer)?
        };
        Ed25519PublicKey::try_from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}
