// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Signer capabilities. The SDK core only ever asks a signer for three
//! things: its address, its authentication key, and a signature over exact
//! bytes. Hardware and passkey wallets implement the same narrow trait; the
//! SDK never inspects their private key material.

use crate::error::BuilderError;
use meridian_types::{
    account_address::AccountAddress,
    transaction::{
        authenticator::{AccountAuthenticator, AuthenticationKey},
        RawTransaction, SignedTransaction,
    },
};
use meridian_crypto::{
    ed25519::{Ed25519PrivateKey, Ed25519PublicKey},
    traits::{SigningKey, Uniform},
};
use rand_core::{CryptoRng, RngCore};
use std::sync::atomic::{AtomicU64, Ordering};

/// An opaque signing capability: "produce an authenticator over these exact
/// bytes". Callers always pass a domain-separated signing message.
pub trait TransactionSigner {
    fn address(&self) -> AccountAddress;

    fn authentication_key(&self) -> AuthenticationKey;

    /// Signs `message` and wraps the result in the authenticator variant
    /// matching this signer's scheme. A signer that cannot produce a
    /// signature (unsupported scheme, aborted device ceremony) surfaces the
    /// failure here; nothing is retried internally.
    fn sign_message(&self, message: &[u8]) -> Result<AccountAuthenticator, BuilderError>;
}

/// An account whose Ed25519 key lives in this process.
///
/// The sequence-number counter is owned by this instance exclusively: one
/// `LocalAccount` per account per batch context. Two `LocalAccount`s for the
/// same on-chain account will hand out colliding sequence numbers.
#[derive(Debug)]
pub struct LocalAccount {
    address: AccountAddress,
    key: Ed25519PrivateKey,
    sequence_number: AtomicU64,
}

impl LocalAccount {
    pub fn new(address: AccountAddress, key: Ed25519PrivateKey, sequence_number: u64) -> Self {
        Self {
            address,
            key,
            sequence_number: AtomicU64::new(sequence_number),
        }
    }

    /// Generates a fresh account whose address is derived from its
    /// authentication key, as for a brand-new on-chain account.
    pub fn generate<R>(rng: &mut R) -> Self
    where
        R: RngCore + CryptoRng,
    {
        let key = Ed25519PrivateKey::generate(rng);
        let address = AuthenticationKey::ed25519(&key.public_key()).account_address();
        Self::new(address, key, 0)
    }

    pub fn address(&self) -> AccountAddress {
        self.address
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.key.public_key()
    }

    pub fn private_key(&self) -> &Ed25519PrivateKey {
        &self.key
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number.load(Ordering::SeqCst)
    }

    pub fn set_sequence_number(&mut self, sequence_number: u64) {
        *self.sequence_number.get_mut() = sequence_number;
    }

    /// Returns the current sequence number and advances the counter.
    pub fn increment_sequence_number(&mut self) -> u64 {
        self.sequence_number.fetch_add(1, Ordering::SeqCst)
    }

    /// Signs a raw transaction this account is the sender of.
    pub fn sign_transaction(&self, txn: RawTransaction) -> Result<SignedTransaction, BuilderError> {
        txn.sign(&self.key, self.public_key())
            .map(|checked| checked.into_inner())
            .map_err(|e| BuilderError::Signing(e.to_string()))
    }

    /// Builds with this account's address and next sequence number, then
    /// signs.
    pub fn sign_with_transaction_builder(
        &mut self,
        builder: crate::builder::TransactionBuilder,
    ) -> Result<SignedTransaction, BuilderError> {
        let sequence_number = self.increment_sequence_number();
        let raw_txn = builder
            .sender(self.address)
            .sequence_number(sequence_number)
            .build()?;
        self.sign_transaction(raw_txn)
    }
}

impl TransactionSigner for LocalAccount {
    fn address(&self) -> AccountAddress {
        self.address
    }

    fn authentication_key(&self) -> AuthenticationKey {
        AuthenticationKey::ed25519(&self.public_key())
    }

    fn sign_message(&self, message: &[u8]) -> Result<AccountAuthenticator, BuilderError> {
        let signature = self.key.sign_arbitrary_message(message);
        Ok(AccountAuthenticator::ed25519(self.public_key(), signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn generated_address_matches_auth_key() {
        let mut rng = StdRng::from_seed([1u8; 32]);
        let account = LocalAccount::generate(&mut rng);
        assert_eq!(
            account.address(),
            account.authentication_key().account_address()
        );
    }

    #[test]
    fn sequence_numbers_are_strictly_increasing() {
        let mut rng = StdRng::from_seed([2u8; 32]);
        let mut account = LocalAccount::generate(&mut rng);
        assert_eq!(account.increment_sequence_number(), 0);
        assert_eq!(account.increment_sequence_number(), 1);
        assert_eq!(account.sequence_number(), 2);
        account.set_sequence_number(10);
        assert_eq!(account.increment_sequence_number(), 10);
    }
}
