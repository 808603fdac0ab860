// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Function ABIs: the resolved description of an on-chain function the
//! payload builder serializes against. An ABI comes either from
//! compile-time-known strings or from the JSON a node's module endpoint
//! serves; both funnel through the same [`TypeTag`] parsing.

use crate::error::BuilderError;
use meridian_types::{
    account_address::AccountAddress,
    identifier::Identifier,
    type_tag::{ModuleId, TypeTag},
};
use serde::{Deserialize, Serialize};

/// A resolved entry-function signature.
///
/// `params` holds the full declared parameter list; the derived
/// `signer_count` splits it into the leading signer parameters (consumed by
/// the authenticator, never serialized) and the trailing value parameters
/// (serialized into the payload). Signers not forming a prefix is a
/// malformed ABI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryFunctionAbi {
    module: ModuleId,
    name: Identifier,
    type_arg_count: usize,
    params: Vec<TypeTag>,
    signer_count: usize,
}

impl EntryFunctionAbi {
    pub fn new(
        module: ModuleId,
        name: Identifier,
        type_arg_count: usize,
        params: Vec<TypeTag>,
    ) -> Result<Self, BuilderError> {
        let signer_count = params.iter().take_while(|tag| tag.is_signer()).count();
        if params[signer_count..].iter().any(|tag| tag.is_signer()) {
            return Err(BuilderError::SignerNotPrefix);
        }
        Ok(EntryFunctionAbi {
            module,
            name,
            type_arg_count,
            params,
            signer_count,
        })
    }

    /// Resolves an ABI from its textual parts, e.g.
    /// `("0x1", "meridian_account", "transfer", 0, ["address", "u64"])`.
    pub fn from_strings(
        address: &str,
        module: &str,
        function: &str,
        type_arg_count: usize,
        params: &[&str],
    ) -> Result<Self, BuilderError> {
        let address = AccountAddress::from_hex_literal(address)
            .map_err(|e| BuilderError::mismatch(0, "address", e.to_string()))?;
        let module = Identifier::new(module)
            .map_err(|e| BuilderError::mismatch(0, "identifier", e.to_string()))?;
        let function = Identifier::new(function)
            .map_err(|e| BuilderError::mismatch(0, "identifier", e.to_string()))?;
        let params = params
            .iter()
            .map(|signature| signature.parse::<TypeTag>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(ModuleId::new(address, module), function, type_arg_count, params)
    }

    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    pub fn name(&self) -> &Identifier {
        &self.name
    }

    pub fn type_arg_count(&self) -> usize {
        self.type_arg_count
    }

    /// The full declared parameter list, signers included.
    pub fn params(&self) -> &[TypeTag] {
        &self.params
    }

    /// The leading signer parameters, supplied out-of-band by the signing
    /// step.
    pub fn signer_params(&self) -> &[TypeTag] {
        &self.params[..self.signer_count]
    }

    /// The parameters that are serialized into the payload.
    pub fn value_params(&self) -> &[TypeTag] {
        &self.params[self.signer_count..]
    }
}

/// A function entry as served by a node's module ABI endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoveFunctionJson {
    pub name: String,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub is_entry: bool,
    #[serde(default)]
    pub is_view: bool,
    #[serde(default)]
    pub generic_type_params: Vec<serde_json::Value>,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default, rename = "return")]
    pub return_types: Vec<String>,
}

impl MoveFunctionJson {
    /// Resolves this JSON entry into an [`EntryFunctionAbi`] for the module
    /// it was fetched from.
    pub fn into_abi(
        self,
        module_address: AccountAddress,
        module_name: &str,
    ) -> Result<EntryFunctionAbi, BuilderError> {
        let module = Identifier::new(module_name)
            .map_err(|e| BuilderError::mismatch(0, "identifier", e.to_string()))?;
        let name = Identifier::new(self.name.as_str())
            .map_err(|e| BuilderError::mismatch(0, "identifier", e.to_string()))?;
        let params = self
            .params
            .iter()
            .map(|signature| signature.parse::<TypeTag>())
            .collect::<Result<Vec<_>, _>>()?;
        EntryFunctionAbi::new(
            ModuleId::new(module_address, module),
            name,
            self.generic_type_params.len(),
            params,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signer_prefix_is_split_off() {
        let abi = EntryFunctionAbi::from_strings(
            "0x1",
            "meridian_account",
            "transfer",
            0,
            &["&signer", "address", "u64"],
        )
        .unwrap();
        assert_eq!(abi.signer_params().len(), 1);
        assert_eq!(
            abi.value_params(),
            &[TypeTag::Address, TypeTag::U64]
        );
    }

    #[test]
    fn non_prefix_signer_is_rejected() {
        let err = EntryFunctionAbi::from_strings(
            "0x1",
            "m",
            "f",
            0,
            &["address", "signer", "u64"],
        )
        .unwrap_err();
        assert!(matches!(err, BuilderError::SignerNotPrefix));
    }

    #[test]
    fn malformed_param_signature_propagates() {
        let err =
            EntryFunctionAbi::from_strings("0x1", "m", "f", 0, &["vector<u8"]).unwrap_err();
        assert!(matches!(err, BuilderError::MalformedTypeTag(_)));
    }

    #[test]
    fn json_abi_resolves() {
        let json = serde_json::json!({
            "name": "swap",
            "visibility": "public",
            "is_entry": true,
            "is_view": false,
            "generic_type_params": [{"constraints": []}, {"constraints": []}],
            "params": ["&signer", "u64", "u64"],
            "return": [],
        });
        let function: MoveFunctionJson = serde_json::from_value(json).unwrap();
        let abi = function
            .into_abi(AccountAddress::from_hex_literal("0xcafe").unwrap(), "amm")
            .unwrap();
        assert_eq!(abi.type_arg_count(), 2);
        assert_eq!(abi.signer_params().len(), 1);
        assert_eq!(abi.value_params().len(), 2);
    }
}
