// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::MAX_SEQUENCE_LENGTH;
use thiserror::Error;

/// Failures while encoding a value.
///
/// Encoding only fails on precondition violations; well-formed values of the
/// supported types always serialize.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EncodeError {
    #[error("sequence of length {0} exceeds the maximum of {MAX_SEQUENCE_LENGTH} elements")]
    LengthTooLarge(usize),

    #[error("{0}")]
    Custom(String),
}

impl EncodeError {
    /// A free-form encode failure raised by a hand-written `Serializable`
    /// impl, e.g. for a marker value that has no wire representation.
    pub fn custom(message: impl Into<String>) -> Self {
        EncodeError::Custom(message.into())
    }
}

/// Failures while decoding a byte stream.
///
/// Every variant is fatal to the decode call: the deserializer never skips,
/// pads, or returns a partially-populated value.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input: needed {needed} more bytes but only {remaining} remain")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("invalid boolean byte {0:#04x}, expected 0x00 or 0x01")]
    InvalidBool(u8),

    #[error("byte sequence is not valid UTF-8")]
    InvalidUtf8,

    #[error("ULEB128 prefix does not terminate within 5 bytes")]
    UnterminatedUleb128,

    #[error("ULEB128 value does not fit in 32 bits")]
    Uleb128Overflow,

    #[error("ULEB128 encoding is not canonical")]
    NonCanonicalUleb128,

    #[error("declared sequence length {0} exceeds the maximum of {MAX_SEQUENCE_LENGTH} elements")]
    LengthTooLarge(usize),

    #[error("option prefix {0:#04x} is neither 0x00 nor 0x01")]
    InvalidOption(u8),

    #[error("{remaining} bytes of trailing input after a complete value")]
    TrailingData { remaining: usize },

    #[error("unknown variant index {index} for enum {type_name}")]
    UnknownVariant {
        type_name: &'static str,
        index: u32,
    },

    #[error("{0}")]
    Custom(String),
}

impl DecodeError {
    /// A free-form decode failure raised by a hand-written `Deserializable`
    /// impl, e.g. when a retired enum variant is encountered.
    pub fn custom(message: impl Into<String>) -> Self {
        DecodeError::Custom(message.into())
    }
}
