// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Batch signing for one account: many independent payloads, one exclusively
//! owned sequence-number counter.
//!
//! Sequence numbers must be strictly increasing and never reused per
//! account, so the batch takes `&mut LocalAccount` and drains numbers from
//! its counter. Running two batches concurrently for the *same* account is
//! not safe and must be synchronized by the caller; batches for different
//! accounts are fully independent.

use crate::{account::LocalAccount, builder::TransactionFactory, error::BuilderError};
use meridian_types::transaction::{SignedTransaction, TransactionPayload};
use tracing::debug;

/// Collects payloads, then signs them all with consecutive sequence numbers.
#[derive(Debug, Default)]
pub struct TransactionBatchBuilder {
    payloads: Vec<TransactionPayload>,
}

impl TransactionBatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_payload(mut self, payload: impl Into<TransactionPayload>) -> Self {
        self.payloads.push(payload.into());
        self
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Signs every payload with the account's next sequence numbers, in
    /// order. On any failure the whole batch is abandoned; the account's
    /// counter is not rolled back, which at worst skips numbers but never
    /// reuses one.
    pub fn build_and_sign(
        self,
        account: &mut LocalAccount,
        factory: &TransactionFactory,
    ) -> Result<Vec<SignedTransaction>, BuilderError> {
        debug!(
            sender = %account.address(),
            count = self.payloads.len(),
            starting_sequence_number = account.sequence_number(),
            "signing transaction batch"
        );
        self.payloads
            .into_iter()
            .map(|payload| {
                account.sign_with_transaction_builder(factory.payload(payload))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abi::EntryFunctionAbi, account::LocalAccount, builder::build_entry_function,
        convert::ArgValue,
    };
    use meridian_types::chain_id::ChainId;
    use rand::{rngs::StdRng, SeedableRng};

    fn transfer_payload(amount: u64) -> TransactionPayload {
        let abi = EntryFunctionAbi::from_strings(
            "0x1",
            "meridian_account",
            "transfer",
            0,
            &["&signer", "address", "u64"],
        )
        .unwrap();
        build_entry_function(&abi, vec![], &["0xb0b".into(), ArgValue::U64(amount)])
            .unwrap()
            .into()
    }

    #[test]
    fn batch_assigns_consecutive_sequence_numbers() {
        let mut rng = StdRng::from_seed([55u8; 32]);
        let mut account = LocalAccount::generate(&mut rng);
        account.set_sequence_number(7);
        let factory = TransactionFactory::new(ChainId::test());

        let batch = TransactionBatchBuilder::new()
            .add_payload(transfer_payload(1))
            .add_payload(transfer_payload(2))
            .add_payload(transfer_payload(3));
        assert_eq!(batch.len(), 3);

        let signed = batch.build_and_sign(&mut account, &factory).unwrap();
        let sequence_numbers: Vec<_> =
            signed.iter().map(|txn| txn.sequence_number()).collect();
        assert_eq!(sequence_numbers, vec![7, 8, 9]);
        assert_eq!(account.sequence_number(), 10);
        for txn in &signed {
            txn.verify_signature().unwrap();
        }
    }

    #[test]
    fn batches_for_different_accounts_are_independent() {
        let mut rng = StdRng::from_seed([56u8; 32]);
        let mut first = LocalAccount::generate(&mut rng);
        let mut second = LocalAccount::generate(&mut rng);
        let factory = TransactionFactory::new(ChainId::test());

        TransactionBatchBuilder::new()
            .add_payload(transfer_payload(1))
            .build_and_sign(&mut first, &factory)
            .unwrap();
        let signed = TransactionBatchBuilder::new()
            .add_payload(transfer_payload(2))
            .build_and_sign(&mut second, &factory)
            .unwrap();
        assert_eq!(signed[0].sequence_number(), 0);
    }
}
