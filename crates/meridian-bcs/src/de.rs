// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! The decoding half of the codec: a cursor over an input slice plus the
//! [`Deserializable`] trait.

use crate::{error::DecodeError, MAX_SEQUENCE_LENGTH};
use ethnum::U256;
use std::collections::BTreeMap;

/// A cursor over a byte slice. Every read checks the remaining length first;
/// a successful `deserialize` leaves the cursor positioned exactly past the
/// value's encoding.
#[derive(Clone, Debug)]
pub struct Deserializer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Deserializer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    fn read(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(DecodeError::UnexpectedEof {
                needed: count - remaining,
                remaining,
            });
        }
        let bytes = &self.input[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    pub fn deserialize_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read(1)?[0])
    }

    pub fn deserialize_u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.read(2)?;
        Ok(u16::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn deserialize_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.read(4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn deserialize_u64(&mut self) -> Result<u64, DecodeError> {
        let bytes = self.read(8)?;
        Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn deserialize_u128(&mut self) -> Result<u128, DecodeError> {
        let bytes = self.read(16)?;
        Ok(u128::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn deserialize_u256(&mut self) -> Result<U256, DecodeError> {
        let bytes = self.read(32)?;
        Ok(U256::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn deserialize_bool(&mut self) -> Result<bool, DecodeError> {
        match self.deserialize_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(DecodeError::InvalidBool(byte)),
        }
    }

    /// Reads `count` raw bytes with no length prefix.
    pub fn deserialize_fixed_bytes(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        self.read(count)
    }

    /// Reads a ULEB128 length prefix followed by that many raw bytes.
    pub fn deserialize_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.deserialize_sequence_length()?;
        Ok(self.read(len)?.to_vec())
    }

    /// Reads a length-delimited byte sequence and validates it as UTF-8.
    pub fn deserialize_str(&mut self) -> Result<String, DecodeError> {
        let bytes = self.deserialize_bytes()?;
        String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
    }

    /// Reads a ULEB128-encoded u32, rejecting unterminated, overflowing, and
    /// non-canonical (overlong) encodings.
    pub fn deserialize_uleb128_as_u32(&mut self) -> Result<u32, DecodeError> {
        let mut value: u64 = 0;
        for shift in (0..32).step_by(7) {
            let byte = self.deserialize_u8()?;
            let digit = (byte & 0x7f) as u64;
            value |= digit << shift;
            if byte & 0x80 == 0 {
                if shift > 0 && digit == 0 {
                    return Err(DecodeError::NonCanonicalUleb128);
                }
                if value > u32::MAX as u64 {
                    return Err(DecodeError::Uleb128Overflow);
                }
                return Ok(value as u32);
            }
        }
        Err(DecodeError::UnterminatedUleb128)
    }

    /// Reads a sequence length and checks it against both the codec cap and
    /// the bytes actually remaining, so an impossible length fails before any
    /// element is decoded.
    pub fn deserialize_sequence_length(&mut self) -> Result<usize, DecodeError> {
        let len = self.deserialize_uleb128_as_u32()? as usize;
        if len > MAX_SEQUENCE_LENGTH {
            return Err(DecodeError::LengthTooLarge(len));
        }
        if len > self.remaining() {
            return Err(DecodeError::UnexpectedEof {
                needed: len - self.remaining(),
                remaining: self.remaining(),
            });
        }
        Ok(len)
    }

    pub fn deserialize_variant_index(&mut self) -> Result<u32, DecodeError> {
        self.deserialize_uleb128_as_u32()
    }

    /// Reads an option prefix byte, enforcing that it is 0 or 1.
    pub fn deserialize_option_tag(&mut self) -> Result<bool, DecodeError> {
        match self.deserialize_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(DecodeError::InvalidOption(byte)),
        }
    }
}

/// A value that knows how to read itself back from a [`Deserializer`].
pub trait Deserializable: Sized {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError>;
}

impl Deserializable for bool {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        deserializer.deserialize_bool()
    }
}

impl Deserializable for u8 {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        deserializer.deserialize_u8()
    }
}

impl Deserializable for u16 {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        deserializer.deserialize_u16()
    }
}

impl Deserializable for u32 {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        deserializer.deserialize_u32()
    }
}

impl Deserializable for u64 {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        deserializer.deserialize_u64()
    }
}

impl Deserializable for u128 {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        deserializer.deserialize_u128()
    }
}

impl Deserializable for U256 {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        deserializer.deserialize_u256()
    }
}

impl Deserializable for String {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        deserializer.deserialize_str()
    }
}

impl<T: Deserializable> Deserializable for Vec<T> {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        let len = deserializer.deserialize_sequence_length()?;
        let mut elements = Vec::with_capacity(len);
        for _ in 0..len {
            elements.push(T::deserialize(deserializer)?);
        }
        Ok(elements)
    }
}

impl<T: Deserializable> Deserializable for Option<T> {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        if deserializer.deserialize_option_tag()? {
            Ok(Some(T::deserialize(deserializer)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: Deserializable> Deserializable for Box<T> {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        Ok(Box::new(T::deserialize(deserializer)?))
    }
}

impl<T: Deserializable, const N: usize> Deserializable for [T; N] {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        let mut elements = Vec::with_capacity(N);
        for _ in 0..N {
            elements.push(T::deserialize(deserializer)?);
        }
        elements
            .try_into()
            .map_err(|_| DecodeError::custom("fixed-size array construction cannot fail"))
    }
}

impl<A: Deserializable, B: Deserializable> Deserializable for (A, B) {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        Ok((A::deserialize(deserializer)?, B::deserialize(deserializer)?))
    }
}

impl<A: Deserializable, B: Deserializable, C: Deserializable> Deserializable for (A, B, C) {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        Ok((
            A::deserialize(deserializer)?,
            B::deserialize(deserializer)?,
            C::deserialize(deserializer)?,
        ))
    }
}

impl<K: Deserializable + Ord, V: Deserializable> Deserializable for BTreeMap<K, V> {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        let len = deserializer.deserialize_sequence_length()?;
        let mut map = BTreeMap::new();
        for _ in 0..len {
            let key = K::deserialize(deserializer)?;
            let value = V::deserialize(deserializer)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}
