// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! WebAuthn (passkey) assertions as transaction signatures.
//!
//! A platform authenticator signs `authenticator_data || sha256(client_data_json)`
//! with a P-256 key, and the client data embeds the challenge the caller
//! requested. For a Meridian transaction the challenge is the SHA3-256 digest
//! of the transaction's signing message, so verifying an assertion means
//! checking both that binding and the ECDSA signature itself.

use anyhow::{ensure, Result};
use meridian_bcs::{
    Deserializable, DecodeError, Deserializer, EncodeError, Serializable, Serializer,
};
use meridian_crypto::{
    error::CryptoMaterialError,
    hash::HashValue,
    secp256r1_ecdsa,
    traits::{signing_message, CryptoHash, VerifyingKey},
};
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// The pieces of a WebAuthn assertion a verifier needs. The signature is
/// normalized to low-S at construction; a high-S assertion can never be
/// represented by this type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartialAuthenticatorAssertionResponse {
    signature: secp256r1_ecdsa::Signature,
    authenticator_data: Vec<u8>,
    client_data_json: Vec<u8>,
}

/// The subset of the client data a verifier inspects.
#[derive(Debug, Deserialize)]
struct CollectedClientData {
    #[serde(rename = "type")]
    ceremony_type: String,
    challenge: String,
}

impl PartialAuthenticatorAssertionResponse {
    pub fn new(
        signature: secp256r1_ecdsa::Signature,
        authenticator_data: Vec<u8>,
        client_data_json: Vec<u8>,
    ) -> Self {
        PartialAuthenticatorAssertionResponse {
            signature,
            authenticator_data,
            client_data_json,
        }
    }

    /// Builds an assertion from the DER-encoded signature a platform
    /// authenticator returns, normalizing it to the canonical low-S form.
    pub fn from_der_signature(
        der_signature: &[u8],
        authenticator_data: Vec<u8>,
        client_data_json: Vec<u8>,
    ) -> Result<Self, CryptoMaterialError> {
        Ok(Self::new(
            secp256r1_ecdsa::Signature::from_der(der_signature)?,
            authenticator_data,
            client_data_json,
        ))
    }

    pub fn signature(&self) -> &secp256r1_ecdsa::Signature {
        &self.signature
    }

    /// The exact bytes the platform authenticator signed.
    pub fn verification_data(&self) -> Vec<u8> {
        let mut data = self.authenticator_data.clone();
        data.extend_from_slice(&Sha256::digest(&self.client_data_json));
        data
    }

    /// The challenge a client must request for `message`: the SHA3-256
    /// digest of its signing message, base64url-encoded without padding.
    pub fn expected_challenge<T: CryptoHash>(message: &T) -> Result<String> {
        let digest = HashValue::sha3_256_of(&signing_message(message)?);
        Ok(base64::encode_config(
            digest.as_slice(),
            base64::URL_SAFE_NO_PAD,
        ))
    }

    /// Verifies that the assertion's challenge binds `message` and that the
    /// signature checks out under `public_key`.
    pub fn verify<T: CryptoHash>(
        &self,
        message: &T,
        public_key: &secp256r1_ecdsa::PublicKey,
    ) -> Result<()> {
        let client_data: CollectedClientData = serde_json::from_slice(&self.client_data_json)?;
        ensure!(
            client_data.ceremony_type == "webauthn.get",
            "unexpected ceremony type `{}`",
            client_data.ceremony_type,
        );
        ensure!(
            client_data.challenge == Self::expected_challenge(message)?,
            "assertion challenge does not match the transaction signing message",
        );
        public_key.verify_arbitrary_message(&self.verification_data(), &self.signature)?;
        Ok(())
    }
}

impl Serializable for PartialAuthenticatorAssertionResponse {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        self.signature.serialize(serializer)?;
        serializer.serialize_bytes(&self.authenticator_data)?;
        serializer.serialize_bytes(&self.client_data_json)
    }
}

impl Deserializable for PartialAuthenticatorAssertionResponse {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        Ok(PartialAuthenticatorAssertionResponse {
            signature: secp256r1_ecdsa::Signature::deserialize(deserializer)?,
            authenticator_data: deserializer.deserialize_bytes()?,
            client_data_json: deserializer.deserialize_bytes()?,
        })
    }
}
