// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Traits tying signable structures to the key schemes, and the
//! domain-separated signing-message derivation.

use crate::{error::CryptoMaterialError, hash::HashValue};
use meridian_bcs::Serializable;
use rand_core::{CryptoRng, RngCore};

/// Prefix namespace for every signing-message salt on the Meridian chain.
pub const SALT_PREFIX: &str = "MERIDIAN::";

/// A structure that can be signed. The signing message is a fixed
/// domain-separation prefix — the SHA3-256 of `"MERIDIAN::<seed name>"` —
/// concatenated with the structure's BCS bytes. The prefix keeps a signed
/// transaction from ever being confused with any other signed artifact that
/// happens to share its byte encoding.
pub trait CryptoHash: Serializable {
    /// The structure's name under the chain's salt namespace, e.g.
    /// `"RawTransaction"`.
    fn seed_name() -> &'static str;

    /// The 32-byte domain-separation prefix for this structure.
    fn domain_separator() -> HashValue {
        let mut salt = SALT_PREFIX.as_bytes().to_vec();
        salt.extend_from_slice(Self::seed_name().as_bytes());
        HashValue::sha3_256_of(&salt)
    }
}

/// Returns the exact bytes a signer must sign for `value`: the domain
/// separator followed by the BCS encoding.
pub fn signing_message<T: CryptoHash>(value: &T) -> Result<Vec<u8>, CryptoMaterialError> {
    let mut message = T::domain_separator().to_vec();
    let bytes =
        meridian_bcs::to_bytes(value).map_err(|_| CryptoMaterialError::SerializationError)?;
    message.extend_from_slice(&bytes);
    Ok(message)
}

/// A key that can produce signatures over signable structures.
pub trait SigningKey {
    type VerifyingKeyMaterial: VerifyingKey<SigningKeyMaterial = Self>;
    type SignatureMaterial;

    /// Signs the domain-separated message for `value`.
    fn sign<T: CryptoHash>(
        &self,
        value: &T,
    ) -> Result<Self::SignatureMaterial, CryptoMaterialError> {
        Ok(self.sign_arbitrary_message(&signing_message(value)?))
    }

    /// Signs exactly `message`, with no hashing or prefixing applied on top.
    /// Callers are expected to pass a domain-separated message.
    fn sign_arbitrary_message(&self, message: &[u8]) -> Self::SignatureMaterial;
}

/// A key that can verify signatures produced by its signing half.
pub trait VerifyingKey {
    type SigningKeyMaterial: SigningKey<VerifyingKeyMaterial = Self>;
    type SignatureMaterial;

    fn verify<T: CryptoHash>(
        &self,
        value: &T,
        signature: &Self::SignatureMaterial,
    ) -> Result<(), CryptoMaterialError> {
        self.verify_arbitrary_message(&signing_message(value)?, signature)
    }

    fn verify_arbitrary_message(
        &self,
        message: &[u8],
        signature: &Self::SignatureMaterial,
    ) -> Result<(), CryptoMaterialError>;
}

/// Material that can be generated from a cryptographically secure RNG.
pub trait Uniform {
    fn generate<R>(rng: &mut R) -> Self
    where
        R: RngCore + CryptoRng;
}
