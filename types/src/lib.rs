// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Core data types of the Meridian chain as seen by clients: account
//! addresses, Move-style type tags, transaction payloads and envelopes, and
//! the authenticators that prove a transaction was authorized.

pub mod account_address;
pub mod chain_id;
pub mod identifier;
pub mod transaction;
pub mod type_tag;

pub use account_address::AccountAddress;
pub use chain_id::ChainId;
pub use identifier::Identifier;
pub use transaction::{
    EntryFunction, RawTransaction, RawTransactionWithData, Script, SignedTransaction,
    TransactionPayload,
};
pub use type_tag::{ModuleId, StructTag, TypeTag, TypeTagParseError};
