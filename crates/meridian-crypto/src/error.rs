// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Rejection reasons for cryptographic material and signing operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum CryptoMaterialError {
    /// The material failed to serialize.
    #[error("error serializing crypto material")]
    SerializationError,
    /// Raw bytes did not deserialize into valid material for the scheme.
    #[error("error deserializing crypto material")]
    DeserializationError,
    /// Material deserialized but failed scheme-specific validation.
    #[error("crypto material failed validation")]
    ValidationError,
    /// Raw bytes have the wrong length for the scheme.
    #[error("crypto material has the wrong length")]
    WrongLengthError,
    /// A signature was not in the canonical (low-S) form the chain accepts.
    #[error("signature is not in canonical form")]
    CanonicalRepresentationError,
}
