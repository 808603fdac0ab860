// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Read-only function calls. A view call needs no signer and no transaction
//! envelope; it travels either as a fully BCS-encoded [`ViewFunction`] or as
//! the human-friendly JSON [`ViewRequest`]. Both forms run the caller's
//! arguments through the same coercion table as entry functions, so a value
//! that would be rejected in a transaction is rejected in a view call too.

use crate::{
    abi::EntryFunctionAbi,
    convert::{convert_json_arg, ArgValue},
    error::BuilderError,
};
use meridian_bcs::{
    Deserializable, DecodeError, Deserializer, EncodeError, Serializable, Serializer,
};
use meridian_types::{
    identifier::Identifier,
    type_tag::{ModuleId, TypeTag},
};
use serde::{Deserialize, Serialize};

/// A view call with fully BCS-encoded arguments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ViewFunction {
    module: ModuleId,
    function: Identifier,
    ty_args: Vec<TypeTag>,
    args: Vec<Vec<u8>>,
}

impl ViewFunction {
    pub fn new(
        module: ModuleId,
        function: Identifier,
        ty_args: Vec<TypeTag>,
        args: Vec<Vec<u8>>,
    ) -> Self {
        ViewFunction {
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
}

impl Serializable for ViewFunction {
    fn serialize(&self, serializer: &mut Serializer) -> Result<(), EncodeError> {
        self.module.serialize(serializer)?;
        Serializable::serialize(&self.function, serializer)?;
        self.ty_args.serialize(serializer)?;
        serializer.serialize_sequence_length(self.args.len())?;
        for arg in &self.args {
            serializer.serialize_bytes(arg)?;
        }
        Ok(())
    }
}

impl Deserializable for ViewFunction {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, DecodeError> {
        let module = ModuleId::deserialize(deserializer)?;
        let function = <Identifier as Deserializable>::deserialize(deserializer)?;
        let ty_args = Vec::<TypeTag>::deserialize(deserializer)?;
        let count = deserializer.deserialize_sequence_length()?;
        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            args.push(deserializer.deserialize_bytes()?);
        }
        Ok(ViewFunction {
            module,
            function,
            ty_args,
            args,
        })
    }
}

/// The JSON body of a view call as a node's view endpoint accepts it:
/// `"0x1::module::function"` plus stringified type arguments and simple
/// JSON argument values.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ViewRequest {
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<serde_json::Value>,
}

/// Builds a fully BCS-encoded view call from typed argument values.
pub fn build_view_function(
    abi: &EntryFunctionAbi,
    ty_args: Vec<TypeTag>,
    args: &[ArgValue],
) -> Result<ViewFunction, BuilderError> {
    check_view_abi(abi, ty_args.len(), args.len())?;
    let encoded = abi
        .value_params()
        .iter()
        .zip(args.iter())
        .enumerate()
        .map(|(index, (tag, value))| crate::convert::convert_arg(index, tag, value))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ViewFunction::new(
        abi.module().clone(),
        abi.name().clone(),
        ty_args,
        encoded,
    ))
}

/// Builds the simple JSON form of a view call. The arguments are validated
/// against the ABI — every value must convert under the shared coercion
/// rules — before being passed through verbatim.
pub fn build_view_request(
    abi: &EntryFunctionAbi,
    ty_args: Vec<TypeTag>,
    args: &[serde_json::Value],
) -> Result<ViewRequest, BuilderError> {
    check_view_abi(abi, ty_args.len(), args.len())?;
    for (index, (tag, value)) in abi.value_params().iter().zip(args.iter()).enumerate() {
        convert_json_arg(index, tag, value)?;
    }
    Ok(ViewRequest {
        function: format!("{}::{}", abi.module(), abi.name()),
        type_arguments: ty_args.iter().map(|tag| tag.to_string()).collect(),
        arguments: args.to_vec(),
    })
}

fn check_view_abi(
    abi: &EntryFunctionAbi,
    ty_args: usize,
    args: usize,
) -> Result<(), BuilderError> {
    // View functions are read-only; an ABI with signer parameters cannot be
    // a view.
    if !abi.signer_params().is_empty() {
        return Err(BuilderError::SignerNotPrefix);
    }
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
