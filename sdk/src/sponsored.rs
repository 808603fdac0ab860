// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Two-phase sponsored transactions: the user side signs first, the fee
//! payer countersigns later (typically on a sponsorship service). The fee
//! payer's address is part of the message everyone signs, so it must be
//! known before the first signature is produced.

use crate::{account::TransactionSigner, error::BuilderError};
use meridian_types::{
    account_address::AccountAddress,
    transaction::{
        authenticator::AccountAuthenticator, RawTransaction, RawTransactionWithData,
        SignedTransaction,
    },
};
use meridian_crypto::traits::signing_message;

/// A sponsored transaction that has collected the sender's (and any
/// secondary signers') authenticators but not yet the fee payer's.
///
/// The only way to a submittable envelope is
/// [`into_signed_transaction`](Self::into_signed_transaction), which refuses
/// to produce one while the fee-payer authenticator is missing — the
/// precondition is enforced before any network interaction can happen.
#[derive(Clone, Debug)]
pub struct PartiallySignedFeePayerTransaction {
    raw_txn: RawTransaction,
    sender_authenticator: AccountAuthenticator,
    secondary_signer_addresses: Vec<AccountAddress>,
    secondary_signers: Vec<AccountAuthenticator>,
    fee_payer_address: AccountAddress,
    fee_payer_authenticator: Option<AccountAuthenticator>,
}

impl PartiallySignedFeePayerTransaction {
    /// Signs the user side of a sponsored transaction against the declared
    /// fee payer address.
    pub fn new(
        sender: &dyn TransactionSigner,
        secondary_signers: &[&dyn TransactionSigner],
        fee_payer_address: AccountAddress,
        raw_txn: RawTransaction,
    ) -> Result<Self, BuilderError> {
        let secondary_signer_addresses: Vec<_> = secondary_signers
            .iter()
            .map(|signer| signer.address())
            .collect();
        let message = signing_message(&RawTransactionWithData::new_fee_payer(
            raw_txn.clone(),
            secondary_signer_addresses.clone(),
            fee_payer_address,
        ))
        .map_err(|e| BuilderError::Signing(e.to_string()))?;

        let sender_authenticator = sender.sign_message(&message)?;
        let secondary_authenticators = secondary_signers
            .iter()
            .map(|signer| signer.sign_message(&message))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw_txn,
            sender_authenticator,
            secondary_signer_addresses,
            secondary_signers: secondary_authenticators,
            fee_payer_address,
            fee_payer_authenticator: None,
        })
    }

    pub fn raw_transaction(&self) -> &RawTransaction {
        &self.raw_txn
    }

    pub fn fee_payer_address(&self) -> AccountAddress {
        self.fee_payer_address
    }

    pub fn has_fee_payer_authenticator(&self) -> bool {
        self.fee_payer_authenticator.is_some()
    }

    /// The fee payer countersigns. Its address must be the one the user side
    /// already signed over; sponsoring from a different account would
    /// invalidate every collected signature.
    pub fn sign_as_fee_payer(
        &mut self,
        fee_payer: &dyn TransactionSigner,
    ) -> Result<(), BuilderError> {
        if fee_payer.address() != self.fee_payer_address {
            return Err(BuilderError::Signing(format!(
                "fee payer {} does not match the declared address {}",
                fee_payer.address(),
                self.fee_payer_address
            )));
        }
        let message = signing_message(&RawTransactionWithData::new_fee_payer(
            self.raw_txn.clone(),
            self.secondary_signer_addresses.clone(),
            self.fee_payer_address,
        ))
        .map_err(|e| BuilderError::Signing(e.to_string()))?;
        self.fee_payer_authenticator = Some(fee_payer.sign_message(&message)?);
        Ok(())
    }

    /// Assembles the submittable envelope, failing with
    /// [`BuilderError::FeePayerDataMissing`] when the fee payer has not
    /// signed yet.
    pub fn into_signed_transaction(self) -> Result<SignedTransaction, BuilderError> {
        let fee_payer_authenticator = self
            .fee_payer_authenticator
            .ok_or(BuilderError::FeePayerDataMissing(self.fee_payer_address))?;
        Ok(SignedTransaction::new_fee_payer(
            self.raw_txn,
            self.sender_authenticator,
            self.secondary_signer_addresses,
            self.secondary_signers,
            self.fee_payer_address,
            fee_payer_authenticator,
        ))
    }
}
