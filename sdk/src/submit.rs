// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! The seam between the SDK and whatever moves bytes to a node. Transport is
//! deliberately out of scope; a REST client plugs in by implementing
//! [`TransactionSubmitter`].

use crate::{error::BuilderError, sponsored::PartiallySignedFeePayerTransaction};
use anyhow::Result;
use async_trait::async_trait;
use meridian_types::transaction::SignedTransaction;
use tracing::{debug, warn};

/// Accepts a fully serialized signed-transaction envelope for delivery.
#[async_trait]
pub trait TransactionSubmitter {
    async fn submit_signed(&self, txn_bytes: Vec<u8>) -> Result<()>;
}

/// Serializes `txn` once and hands the bytes to the submitter.
pub async fn submit_transaction<S>(submitter: &S, txn: &SignedTransaction) -> Result<()>
where
    S: TransactionSubmitter + ?Sized,
{
    let bytes = meridian_bcs::to_bytes(txn).map_err(BuilderError::Encode)?;
    debug!(
        sender = %txn.sender(),
        sequence_number = txn.sequence_number(),
        size = bytes.len(),
        "submitting transaction"
    );
    submitter.submit_signed(bytes).await
}

/// Completes and submits a sponsored transaction. The fee-payer precondition
/// runs before any submitter interaction: a partial transaction with no
/// fee-payer authenticator never costs a network round trip.
pub async fn submit_fee_payer_transaction<S>(
    submitter: &S,
    partial: PartiallySignedFeePayerTransaction,
) -> Result<()>
where
    S: TransactionSubmitter + ?Sized,
{
    let fee_payer_address = partial.fee_payer_address();
    let signed = partial.into_signed_transaction().map_err(|e| {
        warn!(
            fee_payer = %fee_payer_address,
            "refusing to submit sponsored transaction: {}",
            e
        );
        e
    })?;
    submit_transaction(submitter, &signed).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abi::EntryFunctionAbi,
        account::LocalAccount,
        builder::{build_entry_function, TransactionFactory},
        convert::ArgValue,
        signing::sign_transaction,
    };
    use meridian_types::chain_id::ChainId;
    use rand::{rngs::StdRng, SeedableRng};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingSubmitter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TransactionSubmitter for RecordingSubmitter {
        async fn submit_signed(&self, txn_bytes: Vec<u8>) -> Result<()> {
            assert!(!txn_bytes.is_empty());
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn setup() -> (LocalAccount, LocalAccount, meridian_types::RawTransaction) {
        let mut rng = StdRng::from_seed([66u8; 32]);
        let user = LocalAccount::generate(&mut rng);
        let sponsor = LocalAccount::generate(&mut rng);
        let abi = EntryFunctionAbi::from_strings(
            "0x1",
            "meridian_account",
            "transfer",
            0,
            &["&signer", "address", "u64"],
        )
        .unwrap();
        let entry =
            build_entry_function(&abi, vec![], &["0xb0b".into(), ArgValue::U64(4)]).unwrap();
        let raw_txn = TransactionFactory::new(ChainId::test())
            .entry_function(entry)
            .sender(user.address())
            .sequence_number(0)
            .build()
            .unwrap();
        (user, sponsor, raw_txn)
    }

    #[tokio::test]
    async fn complete_transaction_is_submitted_once() {
        let (user, _, raw_txn) = setup();
        let signed = sign_transaction(&user, raw_txn).unwrap();
        let submitter = RecordingSubmitter::default();
        submit_transaction(&submitter, &signed).await.unwrap();
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_fee_payer_fails_before_any_network_call() {
        let (user, sponsor, raw_txn) = setup();
        let partial = PartiallySignedFeePayerTransaction::new(
            &user,
            &[],
            sponsor.address(),
            raw_txn,
        )
        .unwrap();

        let submitter = RecordingSubmitter::default();
        let result = submit_fee_payer_transaction(&submitter, partial).await;
        assert!(result.is_err());
        // The submitter stub must never have been invoked.
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn countersigned_sponsorship_is_submitted() {
        let (user, sponsor, raw_txn) = setup();
        let mut partial = PartiallySignedFeePayerTransaction::new(
            &user,
            &[],
            sponsor.address(),
            raw_txn,
        )
        .unwrap();
        partial.sign_as_fee_payer(&sponsor).unwrap();

        let submitter = RecordingSubmitter::default();
        submit_fee_payer_transaction(&submitter, partial)
            .await
            .unwrap();
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
    }
}
