// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! The signing flows over opaque [`TransactionSigner`]s.
//!
//! Each flow is a straight line through the same three states — raw
//! transaction, computed signing message, signed envelope — and an error at
//! any step leaves nothing behind: there is no partially-signed object to
//! clean up, so an aborted hardware ceremony simply surfaces as the error it
//! returned.

use crate::{account::TransactionSigner, error::BuilderError};
use meridian_types::transaction::{RawTransaction, RawTransactionWithData, SignedTransaction};
use meridian_crypto::traits::signing_message;

/// Signs a single-sender transaction.
pub fn sign_transaction(
    signer: &dyn TransactionSigner,
    raw_txn: RawTransaction,
) -> Result<SignedTransaction, BuilderError> {
    let message = raw_txn
        .signing_message()
        .map_err(|e| BuilderError::Signing(e.to_string()))?;
    let authenticator = signer.sign_message(&message)?;
    Ok(SignedTransaction::new_single_sender(raw_txn, authenticator))
}

/// Signs a multi-agent transaction: primary and secondary signers all sign
/// the identical message, which binds the raw transaction to the ordered
/// secondary address list. The secondary signer order is therefore part of
/// what everyone signs.
pub fn sign_multi_agent_transaction(
    sender: &dyn TransactionSigner,
    secondary_signers: &[&dyn TransactionSigner],
    raw_txn: RawTransaction,
) -> Result<SignedTransaction, BuilderError> {
    let secondary_addresses: Vec<_> = secondary_signers
        .iter()
        .map(|signer| signer.address())
        .collect();
    let message = signing_message(&RawTransactionWithData::new_multi_agent(
        raw_txn.clone(),
        secondary_addresses.clone(),
    ))
    .map_err(|e| BuilderError::Signing(e.to_string()))?;

    let sender_authenticator = sender.sign_message(&message)?;
    let secondary_authenticators = secondary_signers
        .iter()
        .map(|signer| signer.sign_message(&message))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SignedTransaction::new_multi_agent(
        raw_txn,
        sender_authenticator,
        secondary_addresses,
        secondary_authenticators,
    ))
}

/// Signs a sponsored transaction where every participant, fee payer
/// included, is available up front. For the two-phase flow where the fee
/// payer signs later, see
/// [`PartiallySignedFeePayerTransaction`](crate::sponsored::PartiallySignedFeePayerTransaction).
pub fn sign_fee_payer_transaction(
    sender: &dyn TransactionSigner,
    secondary_signers: &[&dyn TransactionSigner],
    fee_payer: &dyn TransactionSigner,
    raw_txn: RawTransaction,
) -> Result<SignedTransaction, BuilderError> {
    let secondary_addresses: Vec<_> = secondary_signers
        .iter()
        .map(|signer| signer.address())
        .collect();
    let fee_payer_address = fee_payer.address();
    let message = signing_message(&RawTransactionWithData::new_fee_payer(
        raw_txn.clone(),
        secondary_addresses.clone(),
        fee_payer_address,
    ))
    .map_err(|e| BuilderError::Signing(e.to_string()))?;

    let sender_authenticator = sender.sign_message(&message)?;
    let secondary_authenticators = secondary_signers
        .iter()
        .map(|signer| signer.sign_message(&message))
        .collect::<Result<Vec<_>, _>>()?;
    let fee_payer_authenticator = fee_payer.sign_message(&message)?;

    Ok(SignedTransaction::new_fee_payer(
        raw_txn,
        sender_authenticator,
        secondary_addresses,
        secondary_authenticators,
        fee_payer_address,
        fee_payer_authenticator,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        account::LocalAccount,
        builder::{build_entry_function, TransactionFactory},
        convert::ArgValue,
        abi::EntryFunctionAbi,
    };
    use meridian_types::chain_id::ChainId;
    use rand::{rngs::StdRng, SeedableRng};

    fn accounts(count: usize) -> Vec<LocalAccount> {
        let mut rng = StdRng::from_seed([77u8; 32]);
        (0..count).map(|_| LocalAccount::generate(&mut rng)).collect()
    }

    fn raw_txn_for(sender: &LocalAccount) -> RawTransaction {
        let abi = EntryFunctionAbi::from_strings(
            "0x1",
            "meridian_account",
            "transfer",
            0,
            &["&signer", "address", "u64"],
        )
        .unwrap();
        let entry =
            build_entry_function(&abi, vec![], &["0xb0b".into(), ArgValue::U64(5)]).unwrap();
        TransactionFactory::new(ChainId::test())
            .entry_function(entry)
            .sender(sender.address())
            .sequence_number(0)
            .build()
            .unwrap()
    }

    #[test]
    fn single_signer_flow_verifies() {
        let accounts = accounts(1);
        let signed = sign_transaction(&accounts[0], raw_txn_for(&accounts[0])).unwrap();
        signed.verify_signature().unwrap();
    }

    #[test]
    fn multi_agent_flow_signs_identical_message_for_all() {
        let accounts = accounts(3);
        let raw_txn = raw_txn_for(&accounts[0]);
        let signers: Vec<&dyn TransactionSigner> = vec![&accounts[1], &accounts[2]];
        let signed =
            sign_multi_agent_transaction(&accounts[0], &signers, raw_txn.clone()).unwrap();
        signed.verify_signature().unwrap();

        // Signing again produces the same authenticator: the flow is
        // deterministic for deterministic signers.
        let again = sign_multi_agent_transaction(&accounts[0], &signers, raw_txn).unwrap();
        assert_eq!(signed, again);
    }

    #[test]
    fn fee_payer_flow_binds_the_payer_address() {
        let accounts = accounts(2);
        let raw_txn = raw_txn_for(&accounts[0]);
        let signed =
            sign_fee_payer_transaction(&accounts[0], &[], &accounts[1], raw_txn).unwrap();
        signed.verify_signature().unwrap();
        assert_eq!(
            signed.authenticator().fee_payer_address(),
            Some(accounts[1].address())
        );
    }
}
