// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

use meridian_types::{account_address::AccountAddress, type_tag::TypeTagParseError};
use thiserror::Error;

/// Failures while turning an ABI plus caller inputs into a payload or a
/// submittable transaction. Construction is all-or-nothing: no partial
/// payload survives any of these.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("expected {expected} arguments, found {found}")]
    ArgumentCountMismatch { expected: usize, found: usize },

    #[error("argument {index} is not convertible to `{expected}`: {reason}")]
    ArgumentTypeMismatch {
        index: usize,
        expected: String,
        reason: String,
    },

    #[error("expected {expected} type arguments, found {found}")]
    TypeArgumentCountMismatch { expected: usize, found: usize },

    #[error("signer parameters must form a prefix of the parameter list")]
    SignerNotPrefix,

    #[error("transaction declares fee payer {0} but carries no fee-payer authenticator")]
    FeePayerDataMissing(AccountAddress),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error(transparent)]
    MalformedTypeTag(#[from] TypeTagParseError),

    #[error(transparent)]
    Encode(#[from] meridian_bcs::EncodeError),

    #[error("signing failed: {0}")]
    Signing(String),
}

impl BuilderError {
    /// Shorthand for the per-argument conversion failure, tagging the
    /// offending parameter index and the expected kind.
    pub(crate) fn mismatch(
        index: usize,
        expected: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        BuilderError::ArgumentTypeMismatch {
            index,
            expected: expected.to_string(),
            reason: reason.into(),
        }
    }
}
