// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Transaction payloads, the raw transaction a client signs, and the signed
//! envelope it submits.

pub mod authenticator;
pub mod script;
pub mod webauthn;

pub use script::{EntryFunction, Script, TransactionArgument};

use crate::{account_address::AccountAddress, chain_id::ChainId};
use anyhow::{format_err, Result};
use authenticator::{
    AccountAuthenticator, AnyPublicKey, AnySignature, SingleKeyAuthenticator,
    TransactionAuthenticator,
};
use meridian_bcs::{
    Deserializable, DecodeError, Deserializer, EncodeError, Serializable, Serializer,
};
use meridian_crypto::{
    ed25519::{Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature},
    secp256k1_ecdsa,
    traits::{signing_message, CryptoHash, SigningKey},
    CryptoMaterialError,
};
use once_cell::sync::OnceCell;
use std::{fmt, ops::Deref};

/// The executable part of a transaction. Wire variant indices: Script=0,
/// retired module-bundle form=1, EntryFunction=2.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TransactionPayload {
    /// Code to execute directly.
    Script(Script),
    /// A call of an entry function published on chain.
    EntryFunction(EntryFunction),
}

impl TransactionPayload {
    pub fn into_entry_function(self) -> EntryFunction {
        match self {
            Self::EntryFunction(entry_function) => entry_function,
            payload => panic!("expected an entry-function payload, found: {:#?}", payload),
        }
    }
}

impl Serializable for TransactionPayload {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        match self {
            Self::Script(script) => {
                serializer.serialize_variant_index(0);
                script.serialize(serializer)
            }
            Self::EntryFunction(entry_function) => {
                serializer.serialize_variant_index(2);
                entry_function.serialize(serializer)
            }
        }
    }
}

impl Deserializable for TransactionPayload {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        match deserializer.deserialize_variant_index()? {
            0 => Ok(Self::Script(Script::deserialize(deserializer)?)),
            1 => Err(DecodeError::custom(
                "the module-bundle payload variant is retired",
            )),
            2 => Ok(Self::EntryFunction(EntryFunction::deserialize(
                deserializer,
            )?)),
            index => Err(DecodeError::UnknownVariant {
                type_name: "TransactionPayload",
                index,
            }),
        }
    }
}

impl From<EntryFunction> for TransactionPayload {
    fn from(entry_function: EntryFunction) -> Self {
        TransactionPayload::EntryFunction(entry_function)
    }
}

impl From<Script> for TransactionPayload {
    fn from(script: Script) -> Self {
        TransactionPayload::Script(script)
    }
}

/// RawTransaction is the portion of a transaction a client signs.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RawTransaction {
    /// Sender's address.
    sender: AccountAddress,
    /// Sequence number of this transaction. Must match the sequence number
    /// stored in the sender's account when the transaction executes.
    sequence_number: u64,
    /// The transaction payload.
    payload: TransactionPayload,
    /// Maximal total gas to spend for this transaction.
    max_gas_amount: u64,
    /// Price to be paid per gas unit.
    gas_unit_price: u64,
    /// Expiration timestamp for this transaction, in seconds since the Unix
    /// epoch. A transaction whose expiration has passed is discarded.
    expiration_timestamp_secs: u64,
    /// Chain ID of the Meridian network this transaction is intended for.
    chain_id: ChainId,
}

impl RawTransaction {
    pub fn new(
        sender: AccountAddress,
        sequence_number: u64,
        payload: TransactionPayload,
        max_gas_amount: u64,
        gas_unit_price: u64,
        expiration_timestamp_secs: u64,
        chain_id: ChainId,
    ) -> Self {
        RawTransaction {
            sender,
            sequence_number,
            payload,
            max_gas_amount,
            gas_unit_price,
            expiration_timestamp_secs,
            chain_id,
        }
    }

    /// Create a new `RawTransaction` with an entry function.
    pub fn new_entry_function(
        sender: AccountAddress,
        sequence_number: u64,
        entry_function: EntryFunction,
        max_gas_amount: u64,
        gas_unit_price: u64,
        expiration_timestamp_secs: u64,
        chain_id: ChainId,
    ) -> Self {
        Self::new(
            sender,
            sequence_number,
            TransactionPayload::EntryFunction(entry_function),
            max_gas_amount,
            gas_unit_price,
            expiration_timestamp_secs,
            chain_id,
        )
    }

    /// Create a new `RawTransaction` with a script.
    pub fn new_script(
        sender: AccountAddress,
        sequence_number: u64,
        script: Script,
        max_gas_amount: u64,
        gas_unit_price: u64,
        expiration_timestamp_secs: u64,
        chain_id: ChainId,
    ) -> Self {
        Self::new(
            sender,
            sequence_number,
            TransactionPayload::Script(script),
            max_gas_amount,
            gas_unit_price,
            expiration_timestamp_secs,
            chain_id,
        )
    }

    /// Signs the given `RawTransaction`. Note that this consumes the
    /// `RawTransaction` and turns it into a `SignatureCheckedTransaction`.
    pub fn sign(
        self,
        private_key: &Ed25519PrivateKey,
        public_key: Ed25519PublicKey,
    ) -> Result<SignatureCheckedTransaction> {
        let signature = private_key.sign(&self)?;
        Ok(SignatureCheckedTransaction(SignedTransaction::new(
            self, public_key, signature,
        )))
    }

    /// Signs the given multi-agent `RawTransaction`: every participant signs
    /// the same message, which binds the raw transaction to the ordered
    /// secondary signer set.
    ///
    /// The order and length of `secondary_private_keys` must match
    /// `secondary_signers`.
    pub fn sign_multi_agent(
        self,
        sender_private_key: &Ed25519PrivateKey,
        secondary_signers: Vec<AccountAddress>,
        secondary_private_keys: Vec<&Ed25519PrivateKey>,
    ) -> Result<SignatureCheckedTransaction> {
        let message =
            RawTransactionWithData::new_multi_agent(self.clone(), secondary_signers.clone());
        let sender_signature = sender_private_key.sign(&message)?;
        let sender_authenticator = AccountAuthenticator::ed25519(
            sender_private_key.public_key(),
            sender_signature,
        );

        if secondary_private_keys.len() != secondary_signers.len() {
            return Err(format_err!(
                "number of secondary private keys and number of secondary signers don't match"
            ));
        }
        let mut secondary_authenticators = vec![];
        for private_key in secondary_private_keys {
            let signature = private_key.sign(&message)?;
            secondary_authenticators
                .push(AccountAuthenticator::ed25519(private_key.public_key(), signature));
        }

        Ok(SignatureCheckedTransaction(
            SignedTransaction::new_multi_agent(
                self,
                sender_authenticator,
                secondary_signers,
                secondary_authenticators,
            ),
        ))
    }

    /// Signs the given fee-payer `RawTransaction`: like the multi-agent flow,
    /// but the signed message additionally binds the fee payer's address.
    pub fn sign_fee_payer(
        self,
        sender_private_key: &Ed25519PrivateKey,
        secondary_signers: Vec<AccountAddress>,
        secondary_private_keys: Vec<&Ed25519PrivateKey>,
        fee_payer_address: AccountAddress,
        fee_payer_private_key: &Ed25519PrivateKey,
    ) -> Result<SignatureCheckedTransaction> {
        let message = RawTransactionWithData::new_fee_payer(
            self.clone(),
            secondary_signers.clone(),
            fee_payer_address,
        );
        let sender_signature = sender_private_key.sign(&message)?;
        let sender_authenticator = AccountAuthenticator::ed25519(
            sender_private_key.public_key(),
            sender_signature,
        );

        if secondary_private_keys.len() != secondary_signers.len() {
            return Err(format_err!(
                "number of secondary private keys and number of secondary signers don't match"
            ));
        }
        let mut secondary_authenticators = vec![];
        for private_key in secondary_private_keys {
            let signature = private_key.sign(&message)?;
            secondary_authenticators
                .push(AccountAuthenticator::ed25519(private_key.public_key(), signature));
        }

        let fee_payer_signature = fee_payer_private_key.sign(&message)?;
        let fee_payer_authenticator = AccountAuthenticator::ed25519(
            fee_payer_private_key.public_key(),
            fee_payer_signature,
        );

        Ok(SignatureCheckedTransaction(
            SignedTransaction::new_fee_payer(
                self,
                sender_authenticator,
                secondary_signers,
                secondary_authenticators,
                fee_payer_address,
                fee_payer_authenticator,
            ),
        ))
    }

    /// Signs the given `RawTransaction` with a secp256k1 key under the
    /// single-key scheme.
    pub fn sign_secp256k1_ecdsa(
        self,
        private_key: &secp256k1_ecdsa::PrivateKey,
    ) -> Result<SignatureCheckedTransaction> {
        let signature = private_key.sign(&self)?;
        let authenticator = AccountAuthenticator::single_key(SingleKeyAuthenticator::new(
            AnyPublicKey::secp256k1_ecdsa(private_key.public_key()),
            AnySignature::secp256k1_ecdsa(signature),
        ));
        Ok(SignatureCheckedTransaction(
            SignedTransaction::new_single_sender(self, authenticator),
        ))
    }

    pub fn sender(&self) -> AccountAddress {
        self.sender
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &TransactionPayload {
        &self.payload
    }

    pub fn into_payload(self) -> TransactionPayload {
        self.payload
    }

    pub fn max_gas_amount(&self) -> u64 {
        self.max_gas_amount
    }

    pub fn gas_unit_price(&self) -> u64 {
        self.gas_unit_price
    }

    pub fn set_gas_unit_price(&mut self, gas_unit_price: u64) {
        self.gas_unit_price = gas_unit_price;
    }

    pub fn expiration_timestamp_secs(&self) -> u64 {
        self.expiration_timestamp_secs
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Return the signing message for creating a transaction signature.
    pub fn signing_message(&self) -> Result<Vec<u8>, CryptoMaterialError> {
        signing_message(self)
    }
}

impl Serializable for RawTransaction {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        self.sender.serialize(serializer)?;
        serializer.serialize_u64(self.sequence_number);
        self.payload.serialize(serializer)?;
        serializer.serialize_u64(self.max_gas_amount);
        serializer.serialize_u64(self.gas_unit_price);
        serializer.serialize_u64(self.expiration_timestamp_secs);
        self.chain_id.serialize(serializer)
    }
}

impl Deserializable for RawTransaction {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        Ok(RawTransaction {
            sender: AccountAddress::deserialize(deserializer)?,
            sequence_number: deserializer.deserialize_u64()?,
            payload: TransactionPayload::deserialize(deserializer)?,
            max_gas_amount: deserializer.deserialize_u64()?,
            gas_unit_price: deserializer.deserialize_u64()?,
            expiration_timestamp_secs: deserializer.deserialize_u64()?,
            chain_id: ChainId::deserialize(deserializer)?,
        })
    }
}

impl CryptoHash for RawTransaction {
    fn seed_name() -> &'static str {
        "RawTransaction"
    }
}

/// The message multi-agent and fee-payer participants actually sign: the raw
/// transaction plus the full participant set, so no signer can be bound to a
/// different set than the others.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum RawTransactionWithData {
    MultiAgent {
        raw_txn: RawTransaction,
        secondary_signer_addresses: Vec<AccountAddress>,
    },
    MultiAgentWithFeePayer {
        raw_txn: RawTransaction,
        secondary_signer_addresses: Vec<AccountAddress>,
        fee_payer_address: AccountAddress,
    },
}

impl RawTransactionWithData {
    pub fn new_multi_agent(
        raw_txn: RawTransaction,
        secondary_signer_addresses: Vec<AccountAddress>,
    ) -> Self {
        Self::MultiAgent {
            raw_txn,
            secondary_signer_addresses,
        }
    }

    pub fn new_fee_payer(
        raw_txn: RawTransaction,
        secondary_signer_addresses: Vec<AccountAddress>,
        fee_payer_address: AccountAddress,
    ) -> Self {
        Self::MultiAgentWithFeePayer {
            raw_txn,
            secondary_signer_addresses,
            fee_payer_address,
        }
    }
}

impl Serializable for RawTransactionWithData {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        match self {
            Self::MultiAgent {
                raw_txn,
                secondary_signer_addresses,
            } => {
                serializer.serialize_variant_index(0);
                raw_txn.serialize(serializer)?;
                secondary_signer_addresses.serialize(serializer)
            }
            Self::MultiAgentWithFeePayer {
                raw_txn,
                secondary_signer_addresses,
                fee_payer_address,
            } => {
                serializer.serialize_variant_index(1);
                raw_txn.serialize(serializer)?;
                secondary_signer_addresses.serialize(serializer)?;
                fee_payer_address.serialize(serializer)
            }
        }
    }
}

impl Deserializable for RawTransactionWithData {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        match deserializer.deserialize_variant_index()? {
            0 => Ok(Self::MultiAgent {
                raw_txn: RawTransaction::deserialize(deserializer)?,
                secondary_signer_addresses: Vec::deserialize(deserializer)?,
            }),
            1 => Ok(Self::MultiAgentWithFeePayer {
                raw_txn: RawTransaction::deserialize(deserializer)?,
                secondary_signer_addresses: Vec::deserialize(deserializer)?,
                fee_payer_address: AccountAddress::deserialize(deserializer)?,
            }),
            index => Err(DecodeError::UnknownVariant {
                type_name: "RawTransactionWithData",
                index,
            }),
        }
    }
}

impl CryptoHash for RawTransactionWithData {
    fn seed_name() -> &'static str {
        "RawTransactionWithData"
    }
}

/// A transaction that has been signed.
///
/// The signature of a `SignedTransaction` is not guaranteed to be verified;
/// for a statically verified transaction see [`SignatureCheckedTransaction`].
#[derive(Clone, Eq)]
pub struct SignedTransaction {
    /// The raw transaction.
    raw_txn: RawTransaction,

    /// Public key and signature to authenticate.
    authenticator: TransactionAuthenticator,

    /// A cached size of the raw transaction bytes, to avoid serializing the
    /// same transaction repeatedly when the size is queried.
    raw_txn_size: OnceCell<usize>,

    /// A cached size of the authenticator.
    authenticator_size: OnceCell<usize>,
}

/// PartialEq ignores the cached size cells, which may or may not be
/// initialized.
impl PartialEq for SignedTransaction {
    fn eq(&self, other: &Self) -> bool {
        self.raw_txn == other.raw_txn && self.authenticator == other.authenticator
    }
}

impl fmt::Debug for SignedTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SignedTransaction {{ raw_txn: {:#?}, authenticator: {:#?} }}",
            self.raw_txn, self.authenticator
        )
    }
}

impl SignedTransaction {
    pub fn new_signed_transaction(
        raw_txn: RawTransaction,
        authenticator: TransactionAuthenticator,
    ) -> SignedTransaction {
        SignedTransaction {
            raw_txn,
            authenticator,
            raw_txn_size: OnceCell::new(),
            authenticator_size: OnceCell::new(),
        }
    }

    pub fn new(
        raw_txn: RawTransaction,
        public_key: Ed25519PublicKey,
        signature: Ed25519Signature,
    ) -> SignedTransaction {
        Self::new_signed_transaction(
            raw_txn,
            TransactionAuthenticator::ed25519(public_key, signature),
        )
    }

    pub fn new_multi_agent(
        raw_txn: RawTransaction,
        sender: AccountAuthenticator,
        secondary_signer_addresses: Vec<AccountAddress>,
        secondary_signers: Vec<AccountAuthenticator>,
    ) -> Self {
        Self::new_signed_transaction(
            raw_txn,
            TransactionAuthenticator::multi_agent(
                sender,
                secondary_signer_addresses,
                secondary_signers,
            ),
        )
    }

    pub fn new_fee_payer(
        raw_txn: RawTransaction,
        sender: AccountAuthenticator,
        secondary_signer_addresses: Vec<AccountAddress>,
        secondary_signers: Vec<AccountAuthenticator>,
        fee_payer_address: AccountAddress,
        fee_payer_signer: AccountAuthenticator,
    ) -> Self {
        Self::new_signed_transaction(
            raw_txn,
            TransactionAuthenticator::fee_payer(
                sender,
                secondary_signer_addresses,
                secondary_signers,
                fee_payer_address,
                fee_payer_signer,
            ),
        )
    }

    pub fn new_single_sender(
        raw_txn: RawTransaction,
        authenticator: AccountAuthenticator,
    ) -> SignedTransaction {
        Self::new_signed_transaction(
            raw_txn,
            TransactionAuthenticator::single_sender(authenticator),
        )
    }

    /// An envelope for gas estimation: it carries no signature and is only
    /// accepted by simulation endpoints.
    pub fn new_for_simulation(raw_txn: RawTransaction) -> SignedTransaction {
        Self::new_single_sender(raw_txn, AccountAuthenticator::NoAccountAuthenticator)
    }

    pub fn authenticator(&self) -> TransactionAuthenticator {
        self.authenticator.clone()
    }

    pub fn authenticator_ref(&self) -> &TransactionAuthenticator {
        &self.authenticator
    }

    pub fn sender(&self) -> AccountAddress {
        self.raw_txn.sender
    }

    pub fn raw_transaction_ref(&self) -> &RawTransaction {
        &self.raw_txn
    }

    pub fn into_raw_transaction(self) -> RawTransaction {
        self.raw_txn
    }

    pub fn sequence_number(&self) -> u64 {
        self.raw_txn.sequence_number
    }

    pub fn chain_id(&self) -> ChainId {
        self.raw_txn.chain_id
    }

    pub fn payload(&self) -> &TransactionPayload {
        &self.raw_txn.payload
    }

    pub fn max_gas_amount(&self) -> u64 {
        self.raw_txn.max_gas_amount
    }

    pub fn gas_unit_price(&self) -> u64 {
        self.raw_txn.gas_unit_price
    }

    pub fn expiration_timestamp_secs(&self) -> u64 {
        self.raw_txn.expiration_timestamp_secs
    }

    pub fn raw_txn_bytes_len(&self) -> usize {
        *self.raw_txn_size.get_or_init(|| {
            meridian_bcs::serialized_size(&self.raw_txn)
                .expect("unable to serialize RawTransaction")
        })
    }

    pub fn txn_bytes_len(&self) -> usize {
        let authenticator_size = *self.authenticator_size.get_or_init(|| {
            meridian_bcs::serialized_size(&self.authenticator)
                .expect("unable to serialize TransactionAuthenticator")
        });
        self.raw_txn_bytes_len() + authenticator_size
    }

    /// Checks the signature of the given transaction. Returns
    /// `Ok(SignatureCheckedTransaction)` if the signature is valid.
    pub fn check_signature(self) -> Result<SignatureCheckedTransaction> {
        self.authenticator.verify(&self.raw_txn)?;
        Ok(SignatureCheckedTransaction(self))
    }

    pub fn verify_signature(&self) -> Result<()> {
        self.authenticator.verify(&self.raw_txn)?;
        Ok(())
    }

    pub fn is_multi_agent(&self) -> bool {
        matches!(
            self.authenticator,
            TransactionAuthenticator::MultiAgent { .. }
        )
    }

    pub fn contains_duplicate_signers(&self) -> bool {
        let mut all_signer_addresses = self.authenticator.secondary_signer_addresses();
        all_signer_addresses.push(self.sender());
        let mut seen = std::collections::BTreeSet::new();
        all_signer_addresses.iter().any(|a| !seen.insert(*a))
    }
}

impl Serializable for SignedTransaction {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        self.raw_txn.serialize(serializer)?;
        self.authenticator.serialize(serializer)
    }
}

impl Deserializable for SignedTransaction {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        let raw_txn = RawTransaction::deserialize(deserializer)?;
        let authenticator = TransactionAuthenticator::deserialize(deserializer)?;
        Ok(Self::new_signed_transaction(raw_txn, authenticator))
    }
}

/// A transaction for which the signature has been verified. Created by
/// [`SignedTransaction::check_signature`] and [`RawTransaction::sign`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignatureCheckedTransaction(SignedTransaction);

impl SignatureCheckedTransaction {
    /// Returns the `SignedTransaction` within.
    pub fn into_inner(self) -> SignedTransaction {
        self.0
    }

    /// Returns the `RawTransaction` within.
    pub fn into_raw_transaction(self) -> RawTransaction {
        self.0.into_raw_transaction()
    }
}

impl Deref for SignatureCheckedTransaction {
    type Target = SignedTransaction;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{identifier::Identifier, type_tag::ModuleId};
    use meridian_crypto::traits::Uniform;
    use rand::{rngs::StdRng, SeedableRng};

    fn test_keys(count: usize) -> Vec<Ed25519PrivateKey> {
        let mut rng = StdRng::from_seed([9u8; 32]);
        (0..count)
            .map(|_| Ed25519PrivateKey::generate(&mut rng))
            .collect()
    }

    fn transfer_payload() -> TransactionPayload {
        TransactionPayload::EntryFunction(EntryFunction::new(
            ModuleId::new(
                AccountAddress::ONE,
                Identifier::new("meridian_account").unwrap(),
            ),
            Identifier::new("transfer").unwrap(),
            vec![],
            vec![
                meridian_bcs::to_bytes(&AccountAddress::from_hex_literal("0xb0b").unwrap())
                    .unwrap(),
                meridian_bcs::to_bytes(&717u64).unwrap(),
            ],
        ))
    }

    fn raw_txn(sender: AccountAddress) -> RawTransaction {
        RawTransaction::new(
            sender,
            11,
            transfer_payload(),
            500_000,
            100,
            1_700_000_000,
            ChainId::test(),
        )
    }

    #[test]
    fn raw_transaction_layout_is_fixed_width_le() {
        let txn = raw_txn(AccountAddress::from_hex_literal("0xa11ce").unwrap());
        let bytes = meridian_bcs::to_bytes(&txn).unwrap();
        // sender (32 bytes) then sequence number 11 as 8-byte LE.
        assert_eq!(&bytes[32..40], &11u64.to_le_bytes());
        // chain id is the single final byte.
        assert_eq!(*bytes.last().unwrap(), ChainId::test().id());
        let decoded: RawTransaction = meridian_bcs::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, txn);
    }

    #[test]
    fn sign_and_check_single_sender() {
        let key = &test_keys(1)[0];
        let txn = raw_txn(AccountAddress::from_hex_literal("0xa11ce").unwrap());
        let signed = txn.sign(key, key.public_key()).unwrap().into_inner();
        signed.verify_signature().unwrap();
        assert!(!signed.is_multi_agent());

        // Envelope round-trips and still verifies.
        let bytes = meridian_bcs::to_bytes(&signed).unwrap();
        let decoded: SignedTransaction = meridian_bcs::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, signed);
        decoded.verify_signature().unwrap();
        assert_eq!(signed.txn_bytes_len(), bytes.len());
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let key = &test_keys(1)[0];
        let sender = AccountAddress::from_hex_literal("0xa11ce").unwrap();
        let signed = raw_txn(sender).sign(key, key.public_key()).unwrap();

        let tampered = RawTransaction::new(
            sender,
            12, // different sequence number
            transfer_payload(),
            500_000,
            100,
            1_700_000_000,
            ChainId::test(),
        );
        let forged =
            SignedTransaction::new_signed_transaction(tampered, signed.authenticator());
        assert!(forged.verify_signature().is_err());
    }

    #[test]
    fn multi_agent_signing_message_is_order_independent() {
        let keys = test_keys(3);
        let sender = AccountAddress::from_hex_literal("0xa11ce").unwrap();
        let secondary_addresses = vec![
            AccountAddress::from_hex_literal("0xb0b").unwrap(),
            AccountAddress::from_hex_literal("0xca401").unwrap(),
        ];

        // Two independently constructed signing messages over the same raw
        // transaction and participant set must be byte-identical.
        let message_a = signing_message(&RawTransactionWithData::new_multi_agent(
            raw_txn(sender),
            secondary_addresses.clone(),
        ))
        .unwrap();
        let message_b = signing_message(&RawTransactionWithData::new_multi_agent(
            raw_txn(sender),
            secondary_addresses.clone(),
        ))
        .unwrap();
        assert_eq!(message_a, message_b);

        let signed = raw_txn(sender)
            .sign_multi_agent(
                &keys[0],
                secondary_addresses,
                vec![&keys[1], &keys[2]],
            )
            .unwrap();
        signed.verify_signature().unwrap();
        assert!(signed.is_multi_agent());
        assert!(!signed.contains_duplicate_signers());
    }

    #[test]
    fn multi_agent_key_count_mismatch_is_rejected() {
        let keys = test_keys(2);
        let sender = AccountAddress::from_hex_literal("0xa11ce").unwrap();
        let result = raw_txn(sender).sign_multi_agent(
            &keys[0],
            vec![AccountAddress::from_hex_literal("0xb0b").unwrap()],
            vec![],
        );
        assert!(result.is_err());
    }

    #[test]
    fn fee_payer_flow_signs_and_verifies() {
        let keys = test_keys(2);
        let sender = AccountAddress::from_hex_literal("0xa11ce").unwrap();
        let fee_payer = AccountAddress::from_hex_literal("0xfee").unwrap();

        let signed = raw_txn(sender)
            .sign_fee_payer(&keys[0], vec![], vec![], fee_payer, &keys[1])
            .unwrap();
        signed.verify_signature().unwrap();
        assert_eq!(signed.authenticator().fee_payer_address(), Some(fee_payer));
    }

    #[test]
    fn fee_payer_message_differs_from_multi_agent_message() {
        let sender = AccountAddress::from_hex_literal("0xa11ce").unwrap();
        let multi_agent =
            signing_message(&RawTransactionWithData::new_multi_agent(raw_txn(sender), vec![]))
                .unwrap();
        let fee_payer = signing_message(&RawTransactionWithData::new_fee_payer(
            raw_txn(sender),
            vec![],
            AccountAddress::ZERO,
        ))
        .unwrap();
        assert_ne!(multi_agent, fee_payer);
    }

    #[test]
    fn secp256k1_single_sender_flow() {
        let mut rng = StdRng::from_seed([21u8; 32]);
        let key = secp256k1_ecdsa::PrivateKey::generate(&mut rng);
        let sender = AccountAddress::from_hex_literal("0x5ec").unwrap();
        let signed = raw_txn(sender).sign_secp256k1_ecdsa(&key).unwrap();
        signed.verify_signature().unwrap();
    }

    #[test]
    fn simulation_envelope_never_verifies() {
        let sender = AccountAddress::from_hex_literal("0xa11ce").unwrap();
        let simulated = SignedTransaction::new_for_simulation(raw_txn(sender));
        assert!(simulated.verify_signature().is_err());
    }

    #[test]
    fn retired_payload_variant_is_rejected() {
        // Hand-craft a raw transaction whose payload claims variant index 1.
        let sender = AccountAddress::from_hex_literal("0xa11ce").unwrap();
        let mut serializer = Serializer::new();
        sender.serialize(&mut serializer).unwrap();
        serializer.serialize_u64(0);
        serializer.serialize_variant_index(1);
        let err = meridian_bcs::from_bytes::<RawTransaction>(&serializer.into_bytes());
        assert!(err.is_err());
    }
}
