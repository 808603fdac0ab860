// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    account_address::AccountAddress,
    identifier::Identifier,
    type_tag::{ModuleId, TypeTag},
};
use meridian_bcs::{
    Deserializable, DecodeError, Deserializer, EncodeError, Serializable, Serializer, U256,
};
use std::fmt;

/// Call of an entry function published on chain. The `args` are each a
/// complete BCS encoding of the corresponding value parameter; signer
/// parameters are never part of the list.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct EntryFunction {
    module: ModuleId,
    function: Identifier,
    ty_args: Vec<TypeTag>,
    args: Vec<Vec<u8>>,
}

impl EntryFunction {
    pub fn new(
        module: ModuleId,
        function: Identifier,
        ty_args: Vec<TypeTag>,
        args: Vec<Vec<u8>>,
    ) -> Self {
        EntryFunction {
            module,
            function,
            ty_args,
            args,
        }
    }

    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    pub fn function(&self) -> &Identifier {
        &self.function
    }

    pub fn ty_args(&self) -> &[TypeTag] {
        &self.ty_args
    }

    pub fn args(&self) -> &[Vec<u8>] {
        &self.args
    }

    pub fn into_inner(self) -> (ModuleId, Identifier, Vec<TypeTag>, Vec<Vec<u8>>) {
        (self.module, self.function, self.ty_args, self.args)
    }
}

impl fmt::Display for EntryFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.function)
    }
}

impl Serializable for EntryFunction {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        self.module.serialize(serializer)?;
        self.function.serialize(serializer)?;
        self.ty_args.serialize(serializer)?;
        serializer.serialize_sequence_length(self.args.len())?;
        for arg in &self.args {
            serializer.serialize_bytes(arg)?;
        }
        Ok(())
    }
}

impl Deserializable for EntryFunction {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        let module = ModuleId::deserialize(deserializer)?;
        let function = Identifier::deserialize(deserializer)?;
        let ty_args = Vec::<TypeTag>::deserialize(deserializer)?;
        let count = deserializer.deserialize_sequence_length()?;
        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            args.push(deserializer.deserialize_bytes()?);
        }
        Ok(EntryFunction {
            module,
            function,
            ty_args,
            args,
        })
    }
}

/// A literal script argument. Unlike entry-function arguments these are typed
/// on the wire, since a script carries no ABI to decode against.
#[derive(Clone, Eq, Hash, PartialEq)]
pub enum TransactionArgument {
    U8(u8),
    U64(u64),
    U128(u128),
    Address(AccountAddress),
    U8Vector(Vec<u8>),
    Bool(bool),
    U16(u16),
    U32(u32),
    U256(U256),
}

impl fmt::Debug for TransactionArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionArgument::U8(value) => write!(f, "{{U8: {}}}", value),
            TransactionArgument::U16(value) => write!(f, "{{U16: {}}}", value),
            TransactionArgument::U32(value) => write!(f, "{{U32: {}}}", value),
            TransactionArgument::U64(value) => write!(f, "{{U64: {}}}", value),
            TransactionArgument::U128(value) => write!(f, "{{U128: {}}}", value),
            TransactionArgument::U256(value) => write!(f, "{{U256: {}}}", value),
            TransactionArgument::Bool(boolean) => write!(f, "{{BOOL: {}}}", boolean),
            TransactionArgument::Address(address) => write!(f, "{{ADDRESS: {:?}}}", address),
            TransactionArgument::U8Vector(vector) => {
                write!(f, "{{U8Vector: 0x{}}}", hex::encode(vector))
            }
        }
    }
}

impl Serializable for TransactionArgument {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        match self {
            TransactionArgument::U8(value) => {
                serializer.serialize_variant_index(0);
                serializer.serialize_u8(*value);
            }
            TransactionArgument::U64(value) => {
                serializer.serialize_variant_index(1);
                serializer.serialize_u64(*value);
            }
            TransactionArgument::U128(value) => {
                serializer.serialize_variant_index(2);
                serializer.serialize_u128(*value);
            }
            TransactionArgument::Address(address) => {
                serializer.serialize_variant_index(3);
                address.serialize(serializer)?;
            }
            TransactionArgument::U8Vector(bytes) => {
                serializer.serialize_variant_index(4);
                serializer.serialize_bytes(bytes)?;
            }
            TransactionArgument::Bool(value) => {
                serializer.serialize_variant_index(5);
                serializer.serialize_bool(*value);
            }
            TransactionArgument::U16(value) => {
                serializer.serialize_variant_index(6);
                serializer.serialize_u16(*value);
            }
            TransactionArgument::U32(value) => {
                serializer.serialize_variant_index(7);
                serializer.serialize_u32(*value);
            }
            TransactionArgument::U256(value) => {
                serializer.serialize_variant_index(8);
                serializer.serialize_u256(*value);
            }
        }
        Ok(())
    }
}

impl Deserializable for TransactionArgument {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        let arg = match deserializer.deserialize_variant_index()? {
            0 => TransactionArgument::U8(deserializer.deserialize_u8()?),
            1 => TransactionArgument::U64(deserializer.deserialize_u64()?),
            2 => TransactionArgument::U128(deserializer.deserialize_u128()?),
            3 => TransactionArgument::Address(AccountAddress::deserialize(deserializer)?),
            4 => TransactionArgument::U8Vector(deserializer.deserialize_bytes()?),
            5 => TransactionArgument::Bool(deserializer.deserialize_bool()?),
            6 => TransactionArgument::U16(deserializer.deserialize_u16()?),
            7 => TransactionArgument::U32(deserializer.deserialize_u32()?),
            8 => TransactionArgument::U256(deserializer.deserialize_u256()?),
            index => {
                return Err(DecodeError::UnknownVariant {
                    type_name: "TransactionArgument",
                    index,
                })
            }
        };
        Ok(arg)
    }
}

/// A transaction that executes compiled script bytes directly instead of a
/// published entry function.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Script {
    code: Vec<u8>,
    ty_args: Vec<TypeTag>,
    args: Vec<TransactionArgument>,
}

impl Script {
    pub fn new(code: Vec<u8>, ty_args: Vec<TypeTag>, args: Vec<TransactionArgument>) -> Self {
        Script {
            code,
            ty_args,
            args,
        }
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn ty_args(&self) -> &[TypeTag] {
        &self.ty_args
    }

    pub fn args(&self) -> &[TransactionArgument] {
        &self.args
    }
}

impl Serializable for Script {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        serializer.serialize_bytes(&self.code)?;
        self.ty_args.serialize(serializer)?;
        self.args.serialize(serializer)
    }
}

impl Deserializable for Script {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        Ok(Script {
            code: deserializer.deserialize_bytes()?,
            ty_args: Vec::<TypeTag>::deserialize(deserializer)?,
            args: Vec::<TransactionArgument>::deserialize(deserializer)?,
        })
    }
}
