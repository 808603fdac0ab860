// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! The Meridian client SDK: build, sign, simulate, and hand off transactions.
//!
//! The flow runs leaf to root: a resolved function ABI plus caller arguments
//! become an entry-function payload ([`build_entry_function`]), a
//! [`TransactionFactory`] wraps the payload into a raw transaction, and a
//! signer (a [`LocalAccount`] or anything implementing [`TransactionSigner`])
//! turns it into a submittable signed envelope. Network transport stays
//! behind the [`TransactionSubmitter`] seam.

pub mod abi;
pub mod account;
pub mod batch;
pub mod builder;
pub mod convert;
pub mod error;
pub mod signing;
pub mod sponsored;
pub mod submit;
pub mod view;

pub use abi::{EntryFunctionAbi, MoveFunctionJson};
pub use account::{LocalAccount, TransactionSigner};
pub use batch::TransactionBatchBuilder;
pub use builder::{build_entry_function, build_entry_function_json, TransactionBuilder, TransactionFactory};
pub use convert::ArgValue;
pub use error::BuilderError;
pub use signing::{sign_fee_payer_transaction, sign_multi_agent_transaction, sign_transaction};
pub use sponsored::PartiallySignedFeePayerTransaction;
pub use submit::{submit_fee_payer_transaction, submit_transaction, TransactionSubmitter};
pub use view::{build_view_function, build_view_request, ViewFunction, ViewRequest};

// Re-exported so downstream users need only one crate in scope for the
// common path.
pub use meridian_types as types;
