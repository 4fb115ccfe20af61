// Craftsman - Solidity contracts compiled on construction
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Construction inputs of a contract handle.

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use craftsman_common::CompilerConfig;

/// Fixed unit name inline sources are compiled under.
pub const SYNTHETIC_UNIT_NAME: &str = "contract";

/// Options every contract handle carries. `json_interface` and `input` are
/// filled in by the handle itself once compilation succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractOptions {
    /// Deployed contract address
    pub address: Option<Address>,
    /// Default sender for transactions
    pub from: Option<Address>,
    /// Default gas limit
    pub gas: Option<u64>,
    /// Default gas price in wei
    pub gas_price: Option<u128>,
    /// Contract ABI
    pub json_interface: JsonAbi,
    /// Creation bytecode, hex without `0x`
    pub input: Option<String>,
}

impl ContractOptions {
    /// Set the contract address
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Set the default sender
    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the default gas limit
    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    /// Set the default gas price
    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }
}

/// Behaviour shared by handles created from the same context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractContext {
    /// Settings used when the handle compiles source
    pub compiler: CompilerConfig,
}

impl ContractContext {
    /// Context with the given compiler settings.
    pub fn new(compiler: CompilerConfig) -> Self {
        Self { compiler }
    }
}

/// What a handle is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractSpec {
    /// A pre-compiled ABI; no compilation happens.
    Interface(JsonAbi),
    /// Solidity source text, compiled under [`SYNTHETIC_UNIT_NAME`].
    Source(String),
    /// Solidity files under `dir`.
    Files {
        /// Directory containing the files
        dir: String,
        /// File names relative to `dir`
        files: Vec<String>,
    },
}

impl ContractSpec {
    /// Whether building from this spec triggers a compilation.
    pub fn compiles(&self) -> bool {
        !matches!(self, Self::Interface(_))
    }
}

/// Everything needed to build an [`ExtendedContract`](crate::ExtendedContract).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInit {
    /// ABI or source to build from
    pub spec: ContractSpec,
    /// Contract address; overrides `options.address` when set
    pub address: Option<Address>,
    /// Handle options
    pub options: ContractOptions,
    /// Context; `None` uses the default context
    pub context: Option<ContractContext>,
    /// Contract to pick when the compilation yields several
    pub contract_name: Option<String>,
}

impl ContractInit {
    fn from_spec(spec: ContractSpec) -> Self {
        Self {
            spec,
            address: None,
            options: Default::default(),
            context: None,
            contract_name: None,
        }
    }

    /// Build from a pre-compiled ABI.
    pub fn interface(abi: JsonAbi) -> Self {
        Self::from_spec(ContractSpec::Interface(abi))
    }

    /// Build from Solidity source text.
    pub fn source(source_code: impl Into<String>) -> Self {
        Self::from_spec(ContractSpec::Source(source_code.into()))
    }

    /// Build from Solidity files under `dir`.
    pub fn files<I, S>(dir: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_spec(ContractSpec::Files {
            dir: dir.into(),
            files: files.into_iter().map(Into::into).collect(),
        })
    }

    /// Set the contract address
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Set the handle options
    pub fn with_options(mut self, options: ContractOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the context
    pub fn with_context(mut self, context: ContractContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pick `name` out of a multi-contract compilation
    pub fn with_contract_name(mut self, name: impl Into<String>) -> Self {
        self.contract_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_builders() {
        let address = Address::repeat_byte(0x11);
        let init = ContractInit::source("contract A {}")
            .with_address(address)
            .with_options(ContractOptions::default().with_gas(100_000))
            .with_contract_name("A");

        assert!(init.spec.compiles());
        assert_eq!(init.address, Some(address));
        assert_eq!(init.options.gas, Some(100_000));
        assert_eq!(init.contract_name.as_deref(), Some("A"));
        assert!(init.context.is_none());
    }

    #[test]
    fn test_files_spec() {
        let init = ContractInit::files("contracts", ["A.sol", "B.sol"]);
        assert_eq!(
            init.spec,
            ContractSpec::Files {
                dir: "contracts".into(),
                files: vec!["A.sol".into(), "B.sol".into()]
            }
        );
    }

    #[test]
    fn test_interface_spec_does_not_compile() {
        assert!(!ContractInit::interface(JsonAbi::default()).spec.compiles());
    }
}
