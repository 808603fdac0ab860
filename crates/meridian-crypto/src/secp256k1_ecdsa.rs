// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! ECDSA over secp256k1. Signatures are produced over the SHA3-256 digest of
//! the signing message and are kept in low-S form; a high-S signature is
//! rejected at deserialization rather than at chain-side verification.

use crate::{
    error::CryptoMaterialError,
    hash::HashValue,
    traits::{SigningKey, Uniform, VerifyingKey},
};
use meridian_bcs::{Deserializable, Deserializer, Serializable, Serializer};
use rand_core::{CryptoRng, RngCore};
use std::fmt;

/// A secp256k1 ECDSA private key.
pub struct PrivateKey(libsecp256k1::SecretKey);

/// A secp256k1 ECDSA public key, stored uncompressed without the leading
/// `0x04` marker byte.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(libsecp256k1::PublicKey);

/// A secp256k1 ECDSA signature in compact (r || s) form.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(libsecp256k1::Signature);

impl PrivateKey {
    pub const LENGTH: usize = 32;

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.0.serialize()
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        let bytes: [u8; Self::LENGTH] = bytes
            .try_into()
            .map_err(|_| CryptoMaterialError::WrongLengthError)?;
        libsecp256k1::SecretKey::parse(&bytes)
            .map(PrivateKey)
            .map_err(|_| CryptoMaterialError::DeserializationError)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(libsecp256k1::PublicKey::from_secret_key(&self.0))
    }
}

impl PublicKey {
    /// Uncompressed form, without the SEC1 `0x04` prefix.
    pub const LENGTH: usize = 64;

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        let full = self.0.serialize();
        full[1..].try_into().expect("fixed 65-byte encoding")
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        if bytes.len() != Self::LENGTH {
            return Err(CryptoMaterialError::WrongLengthError);
        }
        let mut full = [0u8; Self::LENGTH + 1];
        full[0] = 0x04;
        full[1..].copy_from_slice(bytes);
        libsecp256k1::PublicKey::parse(&full)
            .map(PublicKey)
            .map_err(|_| CryptoMaterialError::DeserializationError)
    }
}

impl Signature {
    pub const LENGTH: usize = 64;

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.0.serialize()
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        let bytes: [u8; Self::LENGTH] = bytes
            .try_into()
            .map_err(|_| CryptoMaterialError::WrongLengthError)?;
        let signature = libsecp256k1::Signature::parse_standard(&bytes)
            .map_err(|_| CryptoMaterialError::DeserializationError)?;
        if signature.s.is_high() {
            return Err(CryptoMaterialError::CanonicalRepresentationError);
        }
        Ok(Signature(signature))
    }
}

impl From<&PrivateKey> for PublicKey {
    fn from(private_key: &PrivateKey) -> Self {
        private_key.public_key()
    }
}

impl SigningKey for PrivateKey {
    type VerifyingKeyMaterial = PublicKey;
    type SignatureMaterial = Signature;

    fn sign_arbitrary_message(&self, message: &[u8]) -> Signature {
        let digest = HashValue::sha3_256_of(message);
        let message = libsecp256k1::Message::parse_slice(digest.as_slice())
            .expect("a 32-byte digest always parses");
        // libsecp produces low-S signatures, so no normalization pass here.
        Signature(libsecp256k1::sign(&message, &self.0).0)
    }
}

impl VerifyingKey for PublicKey {
    type SigningKeyMaterial = PrivateKey;
    type SignatureMaterial = Signature;

    fn verify_arbitrary_message(
        &self,
        message: &[u8],
        signature: &Signature,
    ) -> Result<(), CryptoMaterialError> {
        if signature.0.s.is_high() {
            return Err(CryptoMaterialError::CanonicalRepresentationError);
        }
        let digest = HashValue::sha3_256_of(message);
        let message = libsecp256k1::Message::parse_slice(digest.as_slice())
            .expect("a 32-byte digest always parses");
        if libsecp256k1::verify(&message, &signature.0, &self.0) {
            Ok(())
        } else {
            Err(CryptoMaterialError::ValidationError)
        }
    }
}

impl Uniform for PrivateKey {
    fn generate<R>(rng: &mut R) -> Self
    where
        R: RngCore + CryptoRng,
    {
        // Rejection-sample until the 32 bytes land inside the field order.
        loop {
            let mut bytes = [0u8; Self::LENGTH];
            rng.fill_bytes(&mut bytes);
            if let Ok(key) = libsecp256k1::SecretKey::parse(&bytes) {
                return PrivateKey(key);
            }
        }
    }
}

impl Serializable for PublicKey {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), meridian_bcs::EncodeError> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl Deserializable for PublicKey {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, meridian_bcs::DecodeError> {
        let bytes = deserializer.deserialize_bytes()?;
        PublicKey::try_from_bytes(&bytes)
            .map_err(|_| meridian_bcs::DecodeError::custom("invalid secp256k1 public key"))
    }
}

impl Serializable for Signature {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), meridian_bcs::EncodeError> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl Deserializable for Signature {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, meridian_bcs::DecodeError> {
        let bytes = deserializer.deserialize_bytes()?;
        Signature::try_from_bytes(&bytes)
            .map_err(|_| meridian_bcs::DecodeError::custom("invalid secp256k1 signature"))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "secp256k1::PublicKey(0x{})", hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "secp256k1::Signature(0x{})", hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "secp256k1::PrivateKey(<elided>)")
    }
}
