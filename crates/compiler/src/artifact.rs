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

//! Compiled artifacts and the result set returned by the driver.

use std::{collections::BTreeMap, sync::Arc};

use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

/// Raw service output: unit name -> contract name -> artifact.
pub type UnitContracts = BTreeMap<String, BTreeMap<String, CompiledArtifact>>;

/// ABI and creation bytecode of one compiled contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledArtifact {
    /// Contract ABI
    pub abi: JsonAbi,
    /// Creation bytecode, hex without `0x` prefix
    pub bytecode: String,
}

impl CompiledArtifact {
    /// New artifact. A leading `0x` on `bytecode` is dropped.
    pub fn new(abi: JsonAbi, bytecode: impl Into<String>) -> Self {
        let bytecode = bytecode.into();
        let bytecode = match bytecode.strip_prefix("0x") {
            Some(stripped) => stripped.to_string(),
            None => bytecode,
        };
        Self { abi, bytecode }
    }

    /// Whether the contract has deployable code (interfaces and abstract contracts do not).
    pub fn has_bytecode(&self) -> bool {
        !self.bytecode.is_empty()
    }

    /// Decode the bytecode. Fails for unlinked bytecode with library placeholders.
    pub fn bytecode_bytes(&self) -> Result<Bytes, hex::FromHexError> {
        hex::decode(&self.bytecode).map(Bytes::from)
    }
}

/// Artifacts grouped by unit and contract name, plus top-level aliases.
///
/// When the whole set holds exactly one artifact, its contract name is also an
/// alias pointing at the same `Arc` as the fully-qualified entry.
///
/// Only `units` is read back when deserializing; aliases are rebuilt from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SerializedResultSet")]
pub struct CompilationResultSet {
    units: BTreeMap<String, BTreeMap<String, Arc<CompiledArtifact>>>,
    aliases: BTreeMap<String, Arc<CompiledArtifact>>,
}

#[derive(Deserialize)]
struct SerializedResultSet {
    #[serde(default)]
    units: UnitContracts,
}

impl From<SerializedResultSet> for CompilationResultSet {
    fn from(serialized: SerializedResultSet) -> Self {
        Self::from_units(serialized.units)
    }
}

impl CompilationResultSet {
    /// Build the set from raw service output.
    pub fn from_units(raw: UnitContracts) -> Self {
        let units: BTreeMap<_, BTreeMap<_, _>> = raw
            .into_iter()
            .map(|(unit, contracts)| {
                (unit, contracts.into_iter().map(|(name, a)| (name, Arc::new(a))).collect())
            })
            .collect();

        let mut aliases = BTreeMap::new();
        {
            let mut all = units.values().flat_map(|contracts| contracts.iter());
            if let (Some((name, artifact)), None) = (all.next(), all.next()) {
                aliases.insert(name.clone(), Arc::clone(artifact));
            }
        }

        Self { units, aliases }
    }

    /// Contracts of one unit.
    pub fn unit(&self, unit_name: &str) -> Option<&BTreeMap<String, Arc<CompiledArtifact>>> {
        self.units.get(unit_name)
    }

    /// All units.
    pub fn units(&self) -> &BTreeMap<String, BTreeMap<String, Arc<CompiledArtifact>>> {
        &self.units
    }

    /// Fully-qualified lookup.
    pub fn contract(&self, unit_name: &str, contract_name: &str) -> Option<&Arc<CompiledArtifact>> {
        self.units.get(unit_name)?.get(contract_name)
    }

    /// Top-level alias lookup.
    pub fn alias(&self, contract_name: &str) -> Option<&Arc<CompiledArtifact>> {
        self.aliases.get(contract_name)
    }

    /// All top-level aliases.
    pub fn aliases(&self) -> &BTreeMap<String, Arc<CompiledArtifact>> {
        &self.aliases
    }

    /// The only artifact in the set, if there is exactly one.
    pub fn single(&self) -> Option<(&str, &Arc<CompiledArtifact>)> {
        let mut iter = self.aliases.iter();
        match (iter.next(), iter.next()) {
            (Some((name, artifact)), None) => Some((name.as_str(), artifact)),
            _ => None,
        }
    }

    /// The only artifact named `contract_name` across all units.
    pub fn find(&self, contract_name: &str) -> Option<&Arc<CompiledArtifact>> {
        let mut matches = self.units.values().filter_map(|contracts| contracts.get(contract_name));
        match (matches.next(), matches.next()) {
            (Some(artifact), None) => Some(artifact),
            _ => None,
        }
    }

    /// `(unit, contract)` pairs in the set.
    pub fn contract_names(&self) -> Vec<(String, String)> {
        self.units
            .iter()
            .flat_map(|(unit, contracts)| {
                contracts.keys().map(move |name| (unit.clone(), name.clone()))
            })
            .collect()
    }

    /// Total number of artifacts.
    pub fn len(&self) -> usize {
        self.units.values().map(BTreeMap::len).sum()
    }

    /// Whether the set holds no artifact.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(code: &str) -> CompiledArtifact {
        CompiledArtifact::new(JsonAbi::default(), code)
    }

    fn raw(entries: &[(&str, &str, &str)]) -> UnitContracts {
        let mut units = UnitContracts::new();
        for (unit, name, code) in entries {
            units.entry(unit.to_string()).or_default().insert(name.to_string(), artifact(code));
        }
        units
    }

    #[test]
    fn test_single_artifact_is_aliased_by_reference() {
        let set = CompilationResultSet::from_units(raw(&[("contract", "MyContract", "6080")]));

        let qualified = set.contract("contract", "MyContract").unwrap();
        let alias = set.alias("MyContract").unwrap();
        assert!(Arc::ptr_eq(qualified, alias));
        assert_eq!(set.single().map(|(name, _)| name), Some("MyContract"));
    }

    #[test]
    fn test_multiple_artifacts_have_no_alias() {
        let set = CompilationResultSet::from_units(raw(&[
            ("contract", "A", "60"),
            ("contract", "B", "61"),
        ]));

        assert!(set.aliases().is_empty());
        assert!(set.single().is_none());
        assert_eq!(set.len(), 2);
        assert!(set.find("A").is_some());
    }

    #[test]
    fn test_same_name_in_two_units_is_not_found() {
        let set =
            CompilationResultSet::from_units(raw(&[("a.sol", "A", "60"), ("b.sol", "A", "61")]));

        assert!(set.find("A").is_none());
        assert!(set.alias("A").is_none());
        assert_eq!(
            set.contract_names(),
            vec![("a.sol".into(), "A".into()), ("b.sol".into(), "A".into())]
        );
    }

    #[test]
    fn test_deserialized_set_shares_alias() {
        let set = CompilationResultSet::from_units(raw(&[("contract", "MyContract", "6080")]));
        let json = serde_json::to_string(&set).unwrap();

        let restored: CompilationResultSet = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, set);
        assert!(Arc::ptr_eq(
            restored.contract("contract", "MyContract").unwrap(),
            restored.alias("MyContract").unwrap()
        ));
    }

    #[test]
    fn test_deserialized_aliases_are_rebuilt() {
        let json = serde_json::json!({
            "units": {
                "contract": {
                    "A": { "abi": [], "bytecode": "60" },
                    "B": { "abi": [], "bytecode": "61" }
                }
            },
            "aliases": {
                "A": { "abi": [], "bytecode": "60" },
                "Ghost": { "abi": [], "bytecode": "62" }
            }
        });

        let set: CompilationResultSet = serde_json::from_value(json).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.aliases().is_empty());
        assert!(set.alias("Ghost").is_none());
    }

    #[test]
    fn test_empty_set() {
        let set = CompilationResultSet::from_units(UnitContracts::new());
        assert!(set.is_empty());
        assert!(set.single().is_none());
    }

    #[test]
    fn test_artifact_bytecode() {
        let a = artifact("0x6080");
        assert_eq!(a.bytecode, "6080");
        assert!(a.has_bytecode());
        assert_eq!(a.bytecode_bytes().unwrap(), Bytes::from(vec![0x60, 0x80]));

        let unlinked = artifact("73__$abcdef$__63");
        assert!(unlinked.bytecode_bytes().is_err());
        assert!(!artifact("").has_bytecode());
    }
}
