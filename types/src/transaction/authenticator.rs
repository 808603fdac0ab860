// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Transaction and account authenticators.
//!
//! An authenticator is the proof attached to a transaction that its declared
//! signers authorized it. Constructing one only guarantees shape; whether the
//! embedded key material actually derives the sender's on-chain address is
//! checked at verification, chain-side or via [`TransactionAuthenticator::verify`].

use crate::{
    account_address::AccountAddress,
    transaction::{webauthn::PartialAuthenticatorAssertionResponse, RawTransaction, RawTransactionWithData},
};
use anyhow::{bail, ensure, Result};
use meridian_bcs::{
    Deserializable, DecodeError, Deserializer, EncodeError, Serializable, Serializer,
};
use meridian_crypto::{
    ed25519::{Ed25519PublicKey, Ed25519Signature},
    hash::HashValue,
    secp256k1_ecdsa, secp256r1_ecdsa,
    traits::{CryptoHash, VerifyingKey},
};
use std::fmt;

/// Single-byte scheme identifiers, appended to key material when deriving an
/// account's authentication key. Value 1 is reserved for the retired
/// threshold-Ed25519 scheme and is never produced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Scheme {
    Ed25519 = 0,
    SingleKey = 2,
    MultiKey = 3,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display = match self {
            Scheme::Ed25519 => "Ed25519",
            Scheme::SingleKey => "SingleKey",
            Scheme::MultiKey => "MultiKey",
        };
        write!(f, "Scheme::{}", display)
    }
}

/// The 32-byte value stored on chain that key material must hash to.
///
/// `auth_key = sha3_256(preimage || scheme_byte)` where the preimage is the
/// scheme-specific encoding of the public key(s).
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AuthenticationKey([u8; AuthenticationKey::LENGTH]);

impl AuthenticationKey {
    pub const LENGTH: usize = 32;

    pub fn new(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_preimage(mut public_key_bytes: Vec<u8>, scheme: Scheme) -> Self {
        public_key_bytes.push(scheme as u8);
        AuthenticationKey(
            HashValue::sha3_256_of(&public_key_bytes)
                .as_slice()
                .try_into()
                .expect("hash output is 32 bytes"),
        )
    }

    pub fn ed25519(public_key: &Ed25519PublicKey) -> Self {
        Self::from_preimage(public_key.to_bytes().to_vec(), Scheme::Ed25519)
    }

    pub fn any_key(public_key: &AnyPublicKey) -> Self {
        Self::from_preimage(public_key.to_bytes(), Scheme::SingleKey)
    }

    pub fn multi_key(public_keys: &MultiKey) -> Self {
        Self::from_preimage(public_keys.to_bytes(), Scheme::MultiKey)
    }

    /// The account address this key controls.
    pub fn account_address(&self) -> AccountAddress {
        AccountAddress::new(self.0)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl fmt::Display for AuthenticationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AuthenticationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthenticationKey({})", self)
    }
}

/// Authenticator for a whole transaction. Wire variant indices: Ed25519=0,
/// retired threshold scheme=1, MultiAgent=2, FeePayer=3, SingleSender=4.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransactionAuthenticator {
    /// The original single-signer scheme.
    Ed25519 {
        public_key: Ed25519PublicKey,
        signature: Ed25519Signature,
    },
    /// A transaction with secondary signers in addition to its sender.
    MultiAgent {
        sender: AccountAuthenticator,
        secondary_signer_addresses: Vec<AccountAddress>,
        secondary_signers: Vec<AccountAuthenticator>,
    },
    /// A sponsored transaction whose gas is paid by the fee payer.
    FeePayer {
        sender: AccountAuthenticator,
        secondary_signer_addresses: Vec<AccountAddress>,
        secondary_signers: Vec<AccountAuthenticator>,
        fee_payer_address: AccountAddress,
        fee_payer_signer: AccountAuthenticator,
    },
    /// A single sender using any account scheme.
    SingleSender { sender: AccountAuthenticator },
}

impl TransactionAuthenticator {
    pub fn ed25519(public_key: Ed25519PublicKey, signature: Ed25519Signature) -> Self {
        Self::Ed25519 {
            public_key,
            signature,
        }
    }

    pub fn multi_agent(
        sender: AccountAuthenticator,
        secondary_signer_addresses: Vec<AccountAddress>,
        secondary_signers: Vec<AccountAuthenticator>,
    ) -> Self {
        Self::MultiAgent {
            sender,
            secondary_signer_addresses,
            secondary_signers,
        }
    }

    pub fn fee_payer(
        sender: AccountAuthenticator,
        secondary_signer_addresses: Vec<AccountAddress>,
        secondary_signers: Vec<AccountAuthenticator>,
        fee_payer_address: AccountAddress,
        fee_payer_signer: AccountAuthenticator,
    ) -> Self {
        Self::FeePayer {
            sender,
            secondary_signer_addresses,
            secondary_signers,
            fee_payer_address,
            fee_payer_signer,
        }
    }

    pub fn single_sender(sender: AccountAuthenticator) -> Self {
        Self::SingleSender { sender }
    }

    pub fn secondary_signer_addresses(&self) -> Vec<AccountAddress> {
        match self {
            Self::Ed25519 { .. } | Self::SingleSender { .. } => vec![],
            Self::MultiAgent {
                secondary_signer_addresses,
                ..
            }
            | Self::FeePayer {
                secondary_signer_addresses,
                ..
            } => secondary_signer_addresses.clone(),
        }
    }

    pub fn fee_payer_address(&self) -> Option<AccountAddress> {
        match self {
            Self::FeePayer {
                fee_payer_address, ..
            } => Some(*fee_payer_address),
            _ => None,
        }
    }

    /// Verifies every signature in this authenticator against `raw_txn`,
    /// reconstructing the exact signing message each participant must have
    /// signed.
    pub fn verify(&self, raw_txn: &RawTransaction) -> Result<()> {
        match self {
            Self::Ed25519 {
                public_key,
                signature,
            } => Ok(public_key.verify(raw_txn, signature)?),
            Self::MultiAgent {
                sender,
                secondary_signer_addresses,
                secondary_signers,
            } => {
                ensure!(
                    secondary_signer_addresses.len() == secondary_signers.len(),
                    "number of secondary signer addresses ({}) doesn't match number of \
                     secondary signers ({})",
                    secondary_signer_addresses.len(),
                    secondary_signers.len(),
                );
                let message = RawTransactionWithData::new_multi_agent(
                    raw_txn.clone(),
                    secondary_signer_addresses.clone(),
                );
                sender.verify(&message)?;
                for signer in secondary_signers {
                    signer.verify(&message)?;
                }
                Ok(())
            }
            Self::FeePayer {
                sender,
                secondary_signer_addresses,
                secondary_signers,
                fee_payer_address,
                fee_payer_signer,
            } => {
                ensure!(
                    secondary_signer_addresses.len() == secondary_signers.len(),
                    "number of secondary signer addresses ({}) doesn't match number of \
                     secondary signers ({})",
                    secondary_signer_addresses.len(),
                    secondary_signers.len(),
                );
                let message = RawTransactionWithData::new_fee_payer(
                    raw_txn.clone(),
                    secondary_signer_addresses.clone(),
                    *fee_payer_address,
                );
                sender.verify(&message)?;
                for signer in secondary_signers {
                    signer.verify(&message)?;
                }
                fee_payer_signer.verify(&message)?;
                Ok(())
            }
            Self::SingleSender { sender } => sender.verify(raw_txn),
        }
    }
}

impl fmt::Display for TransactionAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ed25519 { .. } => write!(f, "TransactionAuthenticator[scheme: Ed25519]"),
            Self::MultiAgent {
                secondary_signer_addresses,
                ..
            } => write!(
                f,
                "TransactionAuthenticator[scheme: MultiAgent, {} secondary signers]",
                secondary_signer_addresses.len()
            ),
            Self::FeePayer {
                fee_payer_address, ..
            } => write!(
                f,
                "TransactionAuthenticator[scheme: FeePayer, fee payer: {}]",
                fee_payer_address
            ),
            Self::SingleSender { sender } => {
                write!(f, "TransactionAuthenticator[scheme: SingleSender, {}]", sender)
            }
        }
    }
}

impl Serializable for TransactionAuthenticator {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        match self {
            Self::Ed25519 {
                public_key,
                signature,
            } => {
                serializer.serialize_variant_index(0);
                public_key.serialize(serializer)?;
                signature.serialize(serializer)
            }
            Self::MultiAgent {
                sender,
                secondary_signer_addresses,
                secondary_signers,
            } => {
                serializer.serialize_variant_index(2);
                sender.serialize(serializer)?;
                secondary_signer_addresses.serialize(serializer)?;
                secondary_signers.serialize(serializer)
            }
            Self::FeePayer {
                sender,
                secondary_signer_addresses,
                secondary_signers,
                fee_payer_address,
                fee_payer_signer,
            } => {
                serializer.serialize_variant_index(3);
                sender.serialize(serializer)?;
                secondary_signer_addresses.serialize(serializer)?;
                secondary_signers.serialize(serializer)?;
                fee_payer_address.serialize(serializer)?;
                fee_payer_signer.serialize(serializer)
            }
            Self::SingleSender { sender } => {
                serializer.serialize_variant_index(4);
                sender.serialize(serializer)
            }
        }
    }
}

impl Deserializable for TransactionAuthenticator {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        match deserializer.deserialize_variant_index()? {
            0 => Ok(Self::Ed25519 {
                public_key: Ed25519PublicKey::deserialize(deserializer)?,
                signature: Ed25519Signature::deserialize(deserializer)?,
            }),
            1 => Err(DecodeError::custom(
                "the threshold-Ed25519 transaction authenticator is retired",
            )),
            2 => Ok(Self::MultiAgent {
                sender: AccountAuthenticator::deserialize(deserializer)?,
                secondary_signer_addresses: Vec::deserialize(deserializer)?,
                secondary_signers: Vec::deserialize(deserializer)?,
            }),
            3 => Ok(Self::FeePayer {
                sender: AccountAuthenticator::deserialize(deserializer)?,
                secondary_signer_addresses: Vec::deserialize(deserializer)?,
                secondary_signers: Vec::deserialize(deserializer)?,
                fee_payer_address: AccountAddress::deserialize(deserializer)?,
                fee_payer_signer: AccountAuthenticator::deserialize(deserializer)?,
            }),
            4 => Ok(Self::SingleSender {
                sender: AccountAuthenticator::deserialize(deserializer)?,
            }),
            index => Err(DecodeError::UnknownVariant {
                type_name: "TransactionAuthenticator",
                index,
            }),
        }
    }
}

/// Authenticator for a single account's participation in a transaction.
/// Wire variant indices: Ed25519=0, retired=1, SingleKey=2, MultiKey=3,
/// NoAccountAuthenticator=4.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AccountAuthenticator {
    Ed25519 {
        public_key: Ed25519PublicKey,
        signature: Ed25519Signature,
    },
    SingleKey {
        authenticator: SingleKeyAuthenticator,
    },
    MultiKey {
        authenticator: MultiKeyAuthenticator,
    },
    /// Carries no proof at all; accepted only by simulation endpoints.
    NoAccountAuthenticator,
}

impl AccountAuthenticator {
    pub fn ed25519(public_key: Ed25519PublicKey, signature: Ed25519Signature) -> Self {
        Self::Ed25519 {
            public_key,
            signature,
        }
    }

    pub fn single_key(authenticator: SingleKeyAuthenticator) -> Self {
        Self::SingleKey { authenticator }
    }

    pub fn multi_key(authenticator: MultiKeyAuthenticator) -> Self {
        Self::MultiKey { authenticator }
    }

    pub fn scheme(&self) -> Option<Scheme> {
        match self {
            Self::Ed25519 { .. } => Some(Scheme::Ed25519),
            Self::SingleKey { .. } => Some(Scheme::SingleKey),
            Self::MultiKey { .. } => Some(Scheme::MultiKey),
            Self::NoAccountAuthenticator => None,
        }
    }

    /// The authentication key this authenticator's public material derives,
    /// if it carries any.
    pub fn authentication_key(&self) -> Option<AuthenticationKey> {
        match self {
            Self::Ed25519 { public_key, .. } => Some(AuthenticationKey::ed25519(public_key)),
            Self::SingleKey { authenticator } => {
                Some(AuthenticationKey::any_key(authenticator.public_key()))
            }
            Self::MultiKey { authenticator } => {
                Some(AuthenticationKey::multi_key(authenticator.public_keys()))
            }
            Self::NoAccountAuthenticator => None,
        }
    }

    pub fn verify<T: CryptoHash>(&self, message: &T) -> Result<()> {
        match self {
            Self::Ed25519 {
                public_key,
                signature,
            } => Ok(public_key.verify(message, signature)?),
            Self::SingleKey { authenticator } => authenticator.verify(message),
            Self::MultiKey { authenticator } => authenticator.verify(message),
            Self::NoAccountAuthenticator => {
                bail!("no-account authenticators carry no verifiable signature")
            }
        }
    }
}

impl fmt::Display for AccountAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scheme() {
            Some(scheme) => write!(f, "AccountAuthenticator[{}]", scheme),
            None => write!(f, "AccountAuthenticator[None]"),
        }
    }
}

impl Serializable for AccountAuthenticator {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        match self {
            Self::Ed25519 {
                public_key,
                signature,
            } => {
                serializer.serialize_variant_index(0);
                public_key.serialize(serializer)?;
                signature.serialize(serializer)
            }
            Self::SingleKey { authenticator } => {
                serializer.serialize_variant_index(2);
                authenticator.serialize(serializer)
            }
            Self::MultiKey { authenticator } => {
                serializer.serialize_variant_index(3);
                authenticator.serialize(serializer)
            }
            Self::NoAccountAuthenticator => {
                serializer.serialize_variant_index(4);
                Ok(())
            }
        }
    }
}

impl Deserializable for AccountAuthenticator {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        match deserializer.deserialize_variant_index()? {
            0 => Ok(Self::Ed25519 {
                public_key: Ed25519PublicKey::deserialize(deserializer)?,
                signature: Ed25519Signature::deserialize(deserializer)?,
            }),
            1 => Err(DecodeError::custom(
                "the threshold-Ed25519 account authenticator is retired",
            )),
            2 => Ok(Self::SingleKey {
                authenticator: SingleKeyAuthenticator::deserialize(deserializer)?,
            }),
            3 => Ok(Self::MultiKey {
                authenticator: MultiKeyAuthenticator::deserialize(deserializer)?,
            }),
            4 => Ok(Self::NoAccountAuthenticator),
            index => Err(DecodeError::UnknownVariant {
                type_name: "AccountAuthenticator",
                index,
            }),
        }
    }
}

/// A public key under any of the single-key schemes. Wire variant indices:
/// Ed25519=0, Secp256k1Ecdsa=1, Secp256r1Ecdsa=2.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AnyPublicKey {
    Ed25519 { public_key: Ed25519PublicKey },
    Secp256k1Ecdsa { public_key: secp256k1_ecdsa::PublicKey },
    Secp256r1Ecdsa { public_key: secp256r1_ecdsa::PublicKey },
}

impl AnyPublicKey {
    pub fn ed25519(public_key: Ed25519PublicKey) -> Self {
        Self::Ed25519 { public_key }
    }

    pub fn secp256k1_ecdsa(public_key: secp256k1_ecdsa::PublicKey) -> Self {
        Self::Secp256k1Ecdsa { public_key }
    }

    pub fn secp256r1_ecdsa(public_key: secp256r1_ecdsa::PublicKey) -> Self {
        Self::Secp256r1Ecdsa { public_key }
    }

    /// The BCS encoding of this key, used as authentication-key preimage.
    pub fn to_bytes(&self) -> Vec<u8> {
        meridian_bcs::to_bytes(self).expect("public keys always serialize")
    }
}

impl Serializable for AnyPublicKey {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        match self {
            Self::Ed25519 { public_key } => {
                serializer.serialize_variant_index(0);
                public_key.serialize(serializer)
            }
            Self::Secp256k1Ecdsa { public_key } => {
                serializer.serialize_variant_index(1);
                public_key.serialize(serializer)
            }
            Self::Secp256r1Ecdsa { public_key } => {
                serializer.serialize_variant_index(2);
                public_key.serialize(serializer)
            }
        }
    }
}

impl Deserializable for AnyPublicKey {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        match deserializer.deserialize_variant_index()? {
            0 => Ok(Self::Ed25519 {
                public_key: Ed25519PublicKey::deserialize(deserializer)?,
            }),
            1 => Ok(Self::Secp256k1Ecdsa {
                public_key: secp256k1_ecdsa::PublicKey::deserialize(deserializer)?,
            }),
            2 => Ok(Self::Secp256r1Ecdsa {
                public_key: secp256r1_ecdsa::PublicKey::deserialize(deserializer)?,
            }),
            index => Err(DecodeError::UnknownVariant {
                type_name: "AnyPublicKey",
                index,
            }),
        }
    }
}

/// A signature under any of the single-key schemes. Wire variant indices:
/// Ed25519=0, Secp256k1Ecdsa=1, WebAuthn=2.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AnySignature {
    Ed25519 { signature: Ed25519Signature },
    Secp256k1Ecdsa { signature: secp256k1_ecdsa::Signature },
    WebAuthn { signature: PartialAuthenticatorAssertionResponse },
}

impl AnySignature {
    pub fn ed25519(signature: Ed25519Signature) -> Self {
        Self::Ed25519 { signature }
    }

    pub fn secp256k1_ecdsa(signature: secp256k1_ecdsa::Signature) -> Self {
        Self::Secp256k1Ecdsa { signature }
    }

    pub fn webauthn(signature: PartialAuthenticatorAssertionResponse) -> Self {
        Self::WebAuthn { signature }
    }

    /// Verifies this signature over `message` with `public_key`, failing when
    /// the signature and key schemes don't pair up.
    pub fn verify<T: CryptoHash>(&self, public_key: &AnyPublicKey, message: &T) -> Result<()> {
        match (self, public_key) {
            (Self::Ed25519 { signature }, AnyPublicKey::Ed25519 { public_key }) => {
                Ok(public_key.verify(message, signature)?)
            }
            (Self::Secp256k1Ecdsa { signature }, AnyPublicKey::Secp256k1Ecdsa { public_key }) => {
                Ok(public_key.verify(message, signature)?)
            }
            (Self::WebAuthn { signature }, AnyPublicKey::Secp256r1Ecdsa { public_key }) => {
                signature.verify(message, public_key)
            }
            _ => bail!("signature scheme does not match public key scheme"),
        }
    }
}

impl Serializable for AnySignature {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        match self {
            Self::Ed25519 { signature } => {
                serializer.serialize_variant_index(0);
                signature.serialize(serializer)
            }
            Self::Secp256k1Ecdsa { signature } => {
                serializer.serialize_variant_index(1);
                signature.serialize(serializer)
            }
            Self::WebAuthn { signature } => {
                serializer.serialize_variant_index(2);
                signature.serialize(serializer)
            }
        }
    }
}

impl Deserializable for AnySignature {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        match deserializer.deserialize_variant_index()? {
            0 => Ok(Self::Ed25519 {
                signature: Ed25519Signature::deserialize(deserializer)?,
            }),
            1 => Ok(Self::Secp256k1Ecdsa {
                signature: secp256k1_ecdsa::Signature::deserialize(deserializer)?,
            }),
            2 => Ok(Self::WebAuthn {
                signature: PartialAuthenticatorAssertionResponse::deserialize(deserializer)?,
            }),
            index => Err(DecodeError::UnknownVariant {
                type_name: "AnySignature",
                index,
            }),
        }
    }
}

/// One public key plus one signature under a single-key scheme.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SingleKeyAuthenticator {
    public_key: AnyPublicKey,
    signature: AnySignature,
}

impl SingleKeyAuthenticator {
    pub fn new(public_key: AnyPublicKey, signature: AnySignature) -> Self {
        SingleKeyAuthenticator {
            public_key,
            signature,
        }
    }

    pub fn public_key(&self) -> &AnyPublicKey {
        &self.public_key
    }

    pub fn signature(&self) -> &AnySignature {
        &self.signature
    }

    pub fn verify<T: CryptoHash>(&self, message: &T) -> Result<()> {
        self.signature.verify(&self.public_key, message)
    }
}

impl Serializable for SingleKeyAuthenticator {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        self.public_key.serialize(serializer)?;
        self.signature.serialize(serializer)
    }
}

impl Deserializable for SingleKeyAuthenticator {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        Ok(SingleKeyAuthenticator {
            public_key: AnyPublicKey::deserialize(deserializer)?,
            signature: AnySignature::deserialize(deserializer)?,
        })
    }
}

/// An account backed by several keys, any `signatures_required` of which must
/// sign. The keys may mix schemes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MultiKey {
    public_keys: Vec<AnyPublicKey>,
    signatures_required: u8,
}

impl MultiKey {
    /// The largest key set a multi-key account may declare.
    pub const MAX_KEYS: usize = 32;

    pub fn new(public_keys: Vec<AnyPublicKey>, signatures_required: u8) -> Result<Self> {
        ensure!(
            signatures_required > 0,
            "the number of required signatures must be positive"
        );
        ensure!(
            public_keys.len() >= signatures_required as usize,
            "not enough keys ({}) for the required signatures ({})",
            public_keys.len(),
            signatures_required,
        );
        ensure!(
            public_keys.len() <= Self::MAX_KEYS,
            "at most {} keys are allowed, got {}",
            Self::MAX_KEYS,
            public_keys.len(),
        );
        Ok(MultiKey {
            public_keys,
            signatures_required,
        })
    }

    pub fn public_keys(&self) -> &[AnyPublicKey] {
        &self.public_keys
    }

    pub fn signatures_required(&self) -> u8 {
        self.signatures_required
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        meridian_bcs::to_bytes(self).expect("multi-key sets always serialize")
    }
}

impl Serializable for MultiKey {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        self.public_keys.serialize(serializer)?;
        serializer.serialize_u8(self.signatures_required);
        Ok(())
    }
}

impl Deserializable for MultiKey {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        let public_keys = Vec::<AnyPublicKey>::deserialize(deserializer)?;
        let signatures_required = deserializer.deserialize_u8()?;
        MultiKey::new(public_keys, signatures_required)
            .map_err(|e| DecodeError::custom(e.to_string()))
    }
}

const BITMAP_LEN: usize = MultiKey::MAX_KEYS / 8;

/// A threshold set of signatures over one multi-key account. The bitmap marks
/// which declared keys produced a signature, most significant bit first.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MultiKeyAuthenticator {
    public_keys: MultiKey,
    signatures: Vec<AnySignature>,
    signatures_bitmap: [u8; BITMAP_LEN],
}

impl MultiKeyAuthenticator {
    /// Assembles a threshold authenticator from `(key index, signature)`
    /// pairs. Fails fast when fewer signatures than the declared threshold
    /// are supplied, rather than producing an under-signed authenticator
    /// that could only fail chain-side.
    pub fn new(public_keys: MultiKey, signatures: Vec<(u8, AnySignature)>) -> Result<Self> {
        ensure!(
            signatures.len() >= public_keys.signatures_required() as usize,
            "{} signatures provided, but the account requires {}",
            signatures.len(),
            public_keys.signatures_required(),
        );

        let mut bitmap = [0u8; BITMAP_LEN];
        let mut ordered: Vec<(u8, AnySignature)> = signatures;
        ordered.sort_by_key(|(index, _)| *index);

        let mut collected = Vec::with_capacity(ordered.len());
        let mut previous: Option<u8> = None;
        for (index, signature) in ordered {
            ensure!(
                (index as usize) < public_keys.public_keys().len(),
                "signature index {} out of range for {} keys",
                index,
                public_keys.public_keys().len(),
            );
            ensure!(
                previous != Some(index),
                "duplicate signature for key index {}",
                index,
            );
            previous = Some(index);
            bitmap[index as usize / 8] |= 0x80 >> (index % 8);
            collected.push(signature);
        }

        Ok(MultiKeyAuthenticator {
            public_keys,
            signatures: collected,
            signatures_bitmap: bitmap,
        })
    }

    pub fn public_keys(&self) -> &MultiKey {
        &self.public_keys
    }

    fn signer_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        for index in 0..MultiKey::MAX_KEYS {
            if self.signatures_bitmap[index / 8] & (0x80 >> (index % 8)) != 0 {
                indices.push(index);
            }
        }
        indices
    }

    pub fn verify<T: CryptoHash>(&self, message: &T) -> Result<()> {
        let indices = self.signer_indices();
        ensure!(
            indices.len() == self.signatures.len(),
            "bitmap marks {} signers but {} signatures are present",
            indices.len(),
            self.signatures.len(),
        );
        ensure!(
            self.signatures.len() >= self.public_keys.signatures_required() as usize,
            "{} signatures present, but the account requires {}",
            self.signatures.len(),
            self.public_keys.signatures_required(),
        );
        for (index, signature) in indices.into_iter().zip(self.signatures.iter()) {
            signature.verify(&self.public_keys.public_keys()[index], message)?;
        }
        Ok(())
    }
}

impl Serializable for MultiKeyAuthenticator {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        self.public_keys.serialize(serializer)?;
        self.signatures.serialize(serializer)?;
        serializer.serialize_bytes(&self.signatures_bitmap)
    }
}

impl Deserializable for MultiKeyAuthenticator {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        let public_keys = MultiKey::deserialize(deserializer)?;
        let signatures = Vec::<AnySignature>::deserialize(deserializer)?;
        let bitmap_bytes = deserializer.deserialize_bytes()?;
        let signatures_bitmap: [u8; BITMAP_LEN] = bitmap_bytes
            .as_slice()
            .try_into()
            .map_err(|_| DecodeError::custom("signature bitmap must be exactly 4 bytes"))?;
        Ok(MultiKeyAuthenticator {
            public_keys,
            signatures,
            signatures_bitmap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_crypto::{
        ed25519::Ed25519PrivateKey,
        traits::{SigningKey, Uniform},
    };
    use rand::{rngs::StdRng, SeedableRng};

    fn keys(count: usize) -> Vec<Ed25519PrivateKey> {
        let mut rng = StdRng::from_seed([42u8; 32]);
        (0..count).map(|_| Ed25519PrivateKey::generate(&mut rng)).collect()
    }

    struct Message;
    impl Serializable for Message {
        fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
            serializer.serialize_str("probe")
        }
    }
    impl CryptoHash for Message {
        fn seed_name() -> &'static str {
            "Message"
        }
    }

    #[test]
    fn authentication_key_differs_per_scheme() {
        let key = &keys(1)[0];
        let ed = AuthenticationKey::ed25519(&key.public_key());
        let single = AuthenticationKey::any_key(&AnyPublicKey::ed25519(key.public_key()));
        // Same key material, different scheme byte, different address.
        assert_ne!(ed, single);
        assert_ne!(ed.account_address(), single.account_address());
    }

    #[test]
    fn multi_key_threshold_not_met_fails_fast() {
        let signers = keys(3);
        let multi_key = MultiKey::new(
            signers
                .iter()
                .map(|k| AnyPublicKey::ed25519(k.public_key()))
                .collect(),
            2,
        )
        .unwrap();

        let one_signature = vec![(
            0u8,
            AnySignature::ed25519(signers[0].sign(&Message).unwrap()),
        )];
        assert!(MultiKeyAuthenticator::new(multi_key, one_signature).is_err());
    }

    #[test]
    fn multi_key_meets_threshold_and_verifies() {
        let signers = keys(3);
        let multi_key = MultiKey::new(
            signers
                .iter()
                .map(|k| AnyPublicKey::ed25519(k.public_key()))
                .collect(),
            2,
        )
        .unwrap();

        // Sign with keys 0 and 2, deliberately out of order.
        let signatures = vec![
            (2u8, AnySignature::ed25519(signers[2].sign(&Message).unwrap())),
            (0u8, AnySignature::ed25519(signers[0].sign(&Message).unwrap())),
        ];
        let authenticator = MultiKeyAuthenticator::new(multi_key, signatures).unwrap();
        authenticator.verify(&Message).unwrap();
        assert_eq!(authenticator.signer_indices(), vec![0, 2]);
    }

    #[test]
    fn multi_key_rejects_duplicate_and_out_of_range_indices() {
        let signers = keys(2);
        let multi_key = MultiKey::new(
            signers
                .iter()
                .map(|k| AnyPublicKey::ed25519(k.public_key()))
                .collect(),
            1,
        )
        .unwrap();
        let sig = AnySignature::ed25519(signers[0].sign(&Message).unwrap());

        assert!(MultiKeyAuthenticator::new(
            multi_key.clone(),
            vec![(0, sig.clone()), (0, sig.clone())]
        )
        .is_err());
        assert!(MultiKeyAuthenticator::new(multi_key, vec![(7, sig)]).is_err());
    }

    #[test]
    fn mismatched_scheme_pair_is_rejected() {
        let key = &keys(1)[0];
        let mut rng = StdRng::from_seed([5u8; 32]);
        let k1 = meridian_crypto::secp256k1_ecdsa::PrivateKey::generate(&mut rng);

        let authenticator = SingleKeyAuthenticator::new(
            AnyPublicKey::secp256k1_ecdsa(k1.public_key()),
            AnySignature::ed25519(key.sign(&Message).unwrap()),
        );
        assert!(authenticator.verify(&Message).is_err());
    }

    #[test]
    fn account_authenticator_wire_indices() {
        let key = &keys(1)[0];
        let signature = key.sign(&Message).unwrap();

        let ed = AccountAuthenticator::ed25519(key.public_key(), signature.clone());
        assert_eq!(meridian_bcs::to_bytes(&ed).unwrap()[0], 0);

        let single = AccountAuthenticator::single_key(SingleKeyAuthenticator::new(
            AnyPublicKey::ed25519(key.public_key()),
            AnySignature::ed25519(signature),
        ));
        assert_eq!(meridian_bcs::to_bytes(&single).unwrap()[0], 2);

        let none = AccountAuthenticator::NoAccountAuthenticator;
        let encoded = meridian_bcs::to_bytes(&none).unwrap();
        assert_eq!(encoded, vec![4]);
    }

    #[test]
    fn ed25519_account_authenticator_layout() {
        let key = &keys(1)[0];
        let auth = AccountAuthenticator::ed25519(key.public_key(), key.sign(&Message).unwrap());
        let encoded = meridian_bcs::to_bytes(&auth).unwrap();
        // variant (1) + pubkey length prefix (1) + pubkey (32) + signature
        // length prefix (1) + signature (64)
        assert_eq!(encoded.len(), 99);
        assert_eq!(encoded[1], 32);
        assert_eq!(encoded[34], 64);
        let decoded: AccountAuthenticator = meridian_bcs::from_bytes(&encoded).unwrap();
        assert_eq!(decoded, auth);
    }

    #[test]
    fn retired_variant_fails_to_decode() {
        let err = meridian_bcs::from_bytes::<AccountAuthenticator>(&[1]).unwrap_err();
        assert!(matches!(err, DecodeError::Custom(_)));
    }
}
