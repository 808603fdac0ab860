// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! ECDSA over NIST P-256 (secp256r1), the curve platform authenticators
//! (WebAuthn/passkeys) sign with.
//!
//! A DER signature coming out of a platform authenticator has two valid
//! encodings of the same statement, (r, s) and (r, n - s); the chain accepts
//! only the low-S form. [`Signature::from_der`] therefore normalizes
//! unconditionally — canonicalization is part of constructing the value, not
//! an optional cleanup step.

use crate::{
    error::CryptoMaterialError,
    traits::{SigningKey, Uniform, VerifyingKey},
};
use meridian_bcs::{Deserializable, Deserializer, Serializable, Serializer};
use p256::ecdsa::signature::{Signer, Verifier};
use rand_core::{CryptoRng, RngCore};
use std::fmt;

/// A P-256 ECDSA private key.
pub struct PrivateKey(p256::ecdsa::SigningKey);

/// A P-256 ECDSA public key in SEC1 uncompressed form (65 bytes).
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(p256::ecdsa::VerifyingKey);

/// A P-256 ECDSA signature in compact (r || s) form, always low-S.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(p256::ecdsa::Signature);

impl PrivateKey {
    pub const LENGTH: usize = 32;

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.0.to_bytes().into()
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        if bytes.len() != Self::LENGTH {
            return Err(CryptoMaterialError::WrongLengthError);
        }
        p256::ecdsa::SigningKey::from_slice(bytes)
            .map(PrivateKey)
            .map_err(|_| CryptoMaterialError::DeserializationError)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(*self.0.verifying_key())
    }
}

impl PublicKey {
    /// SEC1 uncompressed encoding, including the leading `0x04` byte.
    pub const LENGTH: usize = 65;

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(false).as_bytes().to_vec()
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        if bytes.len() != Self::LENGTH {
            return Err(CryptoMaterialError::WrongLengthError);
        }
        p256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
            .map(PublicKey)
            .map_err(|_| CryptoMaterialError::DeserializationError)
    }
}

impl Signature {
    pub const LENGTH: usize = 64;

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.0.to_bytes().into()
    }

    /// Parses a compact (r || s) signature, rejecting high-S forms.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        if bytes.len() != Self::LENGTH {
            return Err(CryptoMaterialError::WrongLengthError);
        }
        let signature = p256::ecdsa::Signature::from_slice(bytes)
            .map_err(|_| CryptoMaterialError::DeserializationError)?;
        if signature.normalize_s().is_some() {
            return Err(CryptoMaterialError::CanonicalRepresentationError);
        }
        Ok(Signature(signature))
    }

    /// Parses a DER-encoded ECDSA signature as returned by platform
    /// authenticators and normalizes it to low-S form.
    pub fn from_der(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        let signature = p256::ecdsa::Signature::from_der(bytes)
            .map_err(|_| CryptoMaterialError::DeserializationError)?;
        Ok(Signature(signature.normalize_s().unwrap_or(signature)))
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
        // RFC 6979 deterministic signing over SHA-256; the resulting
        // signature is already low-S.
        Signature(self.0.sign(message))
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
        if signature.0.normalize_s().is_some() {
            return Err(CryptoMaterialError::CanonicalRepresentationError);
        }
        self.0
            .verify(message, &signature.0)
            .map_err(|_| CryptoMaterialError::ValidationError)
    }
}

impl Uniform for PrivateKey {
    fn generate<R>(rng: &mut R) -> Self
    where
        R: RngCore + CryptoRng,
    {
        loop {
            let mut bytes = [0u8; Self::LENGTH];
            rng.fill_bytes(&mut bytes);
            if let Ok(key) = p256::ecdsa::SigningKey::from_slice(&bytes) {
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
            .map_err(|_| meridian_bcs::DecodeError::custom("invalid P-256 public key"))
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
            .map_err(|_| meridian_bcs::DecodeError::custom("invalid P-256 signature"))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "secp256r1::PublicKey(0x{})", hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "secp256r1::Signature(0x{})", hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "secp256r1::PrivateKey(<elided>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::elliptic_curve::PrimeField;
    use rand::{rngs::StdRng, SeedableRng};

    fn test_key() -> PrivateKey {
        let mut rng = StdRng::from_seed([23u8; 32]);
        PrivateKey::generate(&mut rng)
    }

    #[test]
    fn sign_and_verify() {
        let key = test_key();
        let signature = key.sign_arbitrary_message(b"challenge");
        assert!(key
            .public_key()
            .verify_arbitrary_message(b"challenge", &signature)
            .is_ok());
    }

    #[test]
    fn der_parse_normalizes_high_s() {
        let key = test_key();
        let low = key.sign_arbitrary_message(b"ceremony").0;

        // Build the high-S twin and DER-encode it; parsing must hand back
        // the low-S original.
        let (r, s) = (low.r(), low.s());
        let high =
            p256::ecdsa::Signature::from_scalars(r.to_repr(), (-*s).to_repr()).unwrap();
        assert!(high.normalize_s().is_some());

        let parsed = Signature::from_der(high.to_der().as_bytes()).unwrap();
        assert_eq!(parsed.0, low);
        assert!(parsed.0.normalize_s().is_none());
    }

    #[test]
    fn high_s_compact_form_is_rejected() {
        let key = test_key();
        let low = key.sign_arbitrary_message(b"ceremony").0;
        let high =
            p256::ecdsa::Signature::from_scalars(low.r().to_repr(), (-*low.s()).to_repr())
                .unwrap();
        assert_eq!(
            Signature::try_from_bytes(&high.to_bytes()).unwrap_err(),
            CryptoMaterialError::CanonicalRepresentationError
        );
    }
}
