// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Payload construction against a resolved ABI, and the factory that wraps
//! payloads into raw transactions with sane gas and expiration defaults.

use crate::{
    abi::EntryFunctionAbi,
    convert::{convert_arg, convert_json_arg, ArgValue},
    error::BuilderError,
};
use meridian_types::{
    account_address::AccountAddress,
    chain_id::ChainId,
    transaction::{EntryFunction, RawTransaction, TransactionPayload},
    type_tag::TypeTag,
};
use std::time::{SystemTime, UNIX_EPOCH};

/// Builds an entry-function payload from a resolved ABI and typed argument
/// values. Argument count and every per-argument conversion are validated
/// before anything is assembled; failure constructs nothing.
pub fn build_entry_function(
    abi: &EntryFunctionAbi,
    ty_args: Vec<TypeTag>,
    args: &[ArgValue],
) -> Result<EntryFunction, BuilderError> {
    check_counts(abi, ty_args.len(), args.len())?;
    let encoded = abi
        .value_params()
        .iter()
        .zip(args.iter())
        .enumerate()
        .map(|(index, (tag, value))| convert_arg(index, tag, value))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EntryFunction::new(
        abi.module().clone(),
        abi.name().clone(),
        ty_args,
        encoded,
    ))
}

/// JSON-path twin of [`build_entry_function`], sharing its coercion rules.
pub fn build_entry_function_json(
    abi: &EntryFunctionAbi,
    ty_args: Vec<TypeTag>,
    args: &[serde_json::Value],
) -> Result<EntryFunction, BuilderError> {
    check_counts(abi, ty_args.len(), args.len())?;
    let encoded = abi
        .value_params()
        .iter()
        .zip(args.iter())
        .enumerate()
        .map(|(index, (tag, value))| convert_json_arg(index, tag, value))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EntryFunction::new(
        abi.module().clone(),
        abi.name().clone(),
        ty_args,
        encoded,
    ))
}

fn check_counts(
    abi: &EntryFunctionAbi,
    ty_args: usize,
    args: usize,
) -> Result<(), BuilderError> {
    if ty_args != abi.type_arg_count() {
        return Err(BuilderError::TypeArgumentCountMismatch {
            expected: abi.type_arg_count(),
            found: ty_args,
        });
    }
    let expected = abi.value_params().len();
    if args != expected {
        return Err(BuilderError::ArgumentCountMismatch {
            expected,
            found: args,
        });
    }
    Ok(())
}

/// Assembles one raw transaction from a payload plus envelope metadata.
#[derive(Clone, Debug)]
pub struct TransactionBuilder {
    sender: Option<AccountAddress>,
    sequence_number: Option<u64>,
    payload: TransactionPayload,
    max_gas_amount: u64,
    gas_unit_price: u64,
    expiration_timestamp_secs: u64,
    chain_id: ChainId,
}

impl TransactionBuilder {
    pub fn new(
        payload: TransactionPayload,
        expiration_timestamp_secs: u64,
        chain_id: ChainId,
    ) -> Self {
        Self {
            sender: None,
            sequence_number: None,
            payload,
            max_gas_amount: TransactionFactory::DEFAULT_MAX_GAS_AMOUNT,
            gas_unit_price: TransactionFactory::DEFAULT_GAS_UNIT_PRICE,
            expiration_timestamp_secs,
            chain_id,
        }
    }

    pub fn sender(mut self, sender: AccountAddress) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn sequence_number(mut self, sequence_number: u64) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    pub fn max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.max_gas_amount = max_gas_amount;
        self
    }

    pub fn gas_unit_price(mut self, gas_unit_price: u64) -> Self {
        self.gas_unit_price = gas_unit_price;
        self
    }

    pub fn expiration_timestamp_secs(mut self, expiration_timestamp_secs: u64) -> Self {
        self.expiration_timestamp_secs = expiration_timestamp_secs;
        self
    }

    pub fn chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn build(self) -> Result<RawTransaction, BuilderError> {
        let sender = self.sender.ok_or(BuilderError::MissingField("sender"))?;
        let sequence_number = self
            .sequence_number
            .ok_or(BuilderError::MissingField("sequence_number"))?;
        Ok(RawTransaction::new(
            sender,
            sequence_number,
            self.payload,
            self.max_gas_amount,
            self.gas_unit_price,
            self.expiration_timestamp_secs,
            self.chain_id,
        ))
    }
}

/// Produces transaction builders pre-populated with per-network defaults.
#[derive(Clone, Debug)]
pub struct TransactionFactory {
    max_gas_amount: u64,
    gas_unit_price: u64,
    transaction_expiration_secs: u64,
    chain_id: ChainId,
}

impl TransactionFactory {
    pub const DEFAULT_EXPIRATION_SECS: u64 = 30;
    pub const DEFAULT_GAS_UNIT_PRICE: u64 = 100;
    pub const DEFAULT_MAX_GAS_AMOUNT: u64 = 100_000;

    pub fn new(chain_id: ChainId) -> Self {
        Self {
            max_gas_amount: Self::DEFAULT_MAX_GAS_AMOUNT,
            gas_unit_price: Self::DEFAULT_GAS_UNIT_PRICE,
            transaction_expiration_secs: Self::DEFAULT_EXPIRATION_SECS,
            chain_id,
        }
    }

    pub fn with_max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.max_gas_amount = max_gas_amount;
        self
    }

    pub fn with_gas_unit_price(mut self, gas_unit_price: u64) -> Self {
        self.gas_unit_price = gas_unit_price;
        self
    }

    pub fn with_transaction_expiration_secs(mut self, secs: u64) -> Self {
        self.transaction_expiration_secs = secs;
        self
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn payload(&self, payload: TransactionPayload) -> TransactionBuilder {
        TransactionBuilder::new(payload, self.expiration_timestamp(), self.chain_id)
            .max_gas_amount(self.max_gas_amount)
            .gas_unit_price(self.gas_unit_price)
    }

    pub fn entry_function(&self, entry_function: EntryFunction) -> TransactionBuilder {
        self.payload(TransactionPayload::EntryFunction(entry_function))
    }

    fn expiration_timestamp(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("the clock is after the Unix epoch")
            .as_secs();
        now + self.transaction_expiration_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};

    fn transfer_abi() -> EntryFunctionAbi {
        EntryFunctionAbi::from_strings(
            "0x1",
            "meridian_account",
            "transfer",
            0,
            &["&signer", "address", "u64"],
        )
        .unwrap()
    }

    #[test]
    fn builds_a_transfer_payload() {
        let abi = transfer_abi();
        let entry = build_entry_function(&abi, vec![], &["0xb0b".into(), ArgValue::U64(717)])
            .unwrap();
        assert_eq!(entry.args().len(), 2);
        assert_eq!(entry.args()[0].len(), 32);
        assert_eq!(entry.args()[1], 717u64.to_le_bytes());
    }

    #[test]
    fn argument_count_mismatch_constructs_nothing() {
        let abi = transfer_abi();
        match build_entry_function(&abi, vec![], &["0xb0b".into()]) {
            Err(BuilderError::ArgumentCountMismatch { expected, found }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected result {other:?}"),
        }
        // Too many fails the same way.
        assert_err!(build_entry_function(
            &abi,
            vec![],
            &["0xb0b".into(), ArgValue::U64(1), ArgValue::U64(2)]
        ));
    }

    #[test]
    fn wrongly_typed_argument_reports_its_index() {
        let abi = transfer_abi();
        match build_entry_function(&abi, vec![], &["0xb0b".into(), "not-a-number".into()]) {
            Err(BuilderError::ArgumentTypeMismatch { index, expected, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(expected, "u64");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn type_argument_count_is_checked() {
        let abi = EntryFunctionAbi::from_strings(
            "0x1",
            "coin",
            "transfer",
            1,
            &["&signer", "address", "u64"],
        )
        .unwrap();
        assert_err!(build_entry_function(
            &abi,
            vec![],
            &["0xb0b".into(), ArgValue::U64(1)]
        ));
        assert_ok!(build_entry_function(
            &abi,
            vec!["0x1::meridian_coin::MeridianCoin".parse().unwrap()],
            &["0xb0b".into(), ArgValue::U64(1)]
        ));
    }

    #[test]
    fn json_path_builds_the_same_payload() {
        let abi = transfer_abi();
        let typed =
            build_entry_function(&abi, vec![], &["0xb0b".into(), ArgValue::U64(717)]).unwrap();
        let json = build_entry_function_json(
            &abi,
            vec![],
            &[serde_json::json!("0xb0b"), serde_json::json!("717")],
        )
        .unwrap();
        assert_eq!(typed, json);
    }

    #[test]
    fn factory_populates_defaults() {
        let abi = transfer_abi();
        let entry =
            build_entry_function(&abi, vec![], &["0xb0b".into(), ArgValue::U64(1)]).unwrap();
        let txn = TransactionFactory::new(ChainId::test())
            .entry_function(entry)
            .sender(AccountAddress::from_hex_literal("0xa11ce").unwrap())
            .sequence_number(3)
            .build()
            .unwrap();
        assert_eq!(txn.chain_id(), ChainId::test());
        assert_eq!(txn.max_gas_amount(), TransactionFactory::DEFAULT_MAX_GAS_AMOUNT);
        assert!(txn.expiration_timestamp_secs() > 0);
    }

    #[test]
    fn builder_requires_sender_and_sequence_number() {
        let abi = transfer_abi();
        let entry =
            build_entry_function(&abi, vec![], &["0xb0b".into(), ArgValue::U64(1)]).unwrap();
        let result = TransactionFactory::new(ChainId::test())
            .entry_function(entry)
            .build();
        assert!(matches!(result, Err(BuilderError::MissingField("sender"))));
    }
}
