// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Binary Canonical Serialization (BCS) for Meridian on-chain data.
//!
//! BCS is the wire format for every structure the chain consumes:
//! transactions, entry-function arguments, authenticators. The encoding is
//! deterministic (one value, one byte string), little-endian for fixed-width
//! integers, and uses ULEB128 length prefixes for sequences and enum variant
//! indices. Validators deserialize these bytes bit-for-bit, so any deviation
//! here means rejected transactions.
//!
//! # The format is not self-describing
//!
//! Struct fields are written strictly in declared order with no tags, names,
//! or type markers in the byte stream. The reader must already know the exact
//! field order and types. A schema mismatch between writer and reader does
//! **not** reliably error: adjacent same-width fields that have been swapped,
//! for example, decode silently into wrong-but-plausible values. This is a
//! property of the chain's wire format and cannot be "fixed" by adding tags
//! without breaking compatibility. Keeping writer and reader schemas in
//! agreement is the caller's responsibility.
//!
//! # Usage
//!
//! Types implement [`Serializable`] and [`Deserializable`] by writing their
//! fields in order through a [`Serializer`] and reading them back through a
//! [`Deserializer`]. [`to_bytes`] and [`from_bytes`] are the entry points;
//! `from_bytes` rejects trailing input, so `to_bytes(&from_bytes(b)?)? == b`
//! for every well-formed `b`.

pub mod de;
pub mod error;
pub mod ser;

pub use de::{Deserializable, Deserializer};
pub use error::{DecodeError, EncodeError};
pub use ser::{Serializable, Serializer};

/// The 256-bit unsigned integer type of the `u256` wire kind.
pub use ethnum::U256;

/// Maximum number of elements a ULEB128 length prefix may declare.
///
/// Matches the chain-side deserializer cap of `2^31 - 1`.
pub const MAX_SEQUENCE_LENGTH: usize = (1 << 31) - 1;

/// Serializes `value` into a fresh byte vector.
pub fn to_bytes<T: Serializable + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    let mut serializer = Serializer::new();
    value.serialize(&mut serializer)?;
    Ok(serializer.into_bytes())
}

/// Deserializes a value of type `T` from `bytes`, requiring that the value's
/// encoding spans the entire input.
pub fn from_bytes<T: Deserializable>(bytes: &[u8]) -> Result<T, DecodeError> {
    let mut deserializer = Deserializer::new(bytes);
    let value = T::deserialize(&mut deserializer)?;
    let remaining = deserializer.remaining();
    if remaining != 0 {
        return Err(DecodeError::TrailingData { remaining });
    }
    Ok(value)
}

/// Returns the number of bytes `value` occupies when serialized.
pub fn serialized_size<T: Serializable + ?Sized>(value: &T) -> Result<usize, EncodeError> {
    to_bytes(value).map(|bytes| bytes.len())
}
