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

//! Plugin surface exposing compiling handles under a namespace.
//!
//! Client code that aggregates extensions registers [`CraftsmanPlugin`] once and
//! later reaches it through its namespace instead of importing the handle type:
//!
//! ```ignore
//! let mut registry = PluginRegistry::new();
//! registry.register_plugin(CraftsmanPlugin::default());
//! let craftsman = registry.plugin::<CraftsmanPlugin>(CRAFTSMAN_NAMESPACE).unwrap();
//! let contract = craftsman.contract(ContractInit::source(source));
//! ```

use std::{any::Any, collections::HashMap, sync::Arc};

use craftsman_compiler::{
    try_compile, CompilationResultSet, CompileError, SolcService, SourceOrFile,
};
use tracing::{debug, warn};

use crate::{ContractContext, ContractInit, ExtendedContract};

/// Namespace [`CraftsmanPlugin`] registers under.
pub const CRAFTSMAN_NAMESPACE: &str = "craftsman";

/// An extension registrable in a [`PluginRegistry`].
pub trait Plugin: Any + Send + Sync {
    /// Namespace the plugin is reachable under.
    fn namespace(&self) -> &'static str;
}

/// Plugins keyed by namespace.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry").field("namespaces", &self.namespaces()).finish()
    }
}

impl PluginRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `plugin` under its namespace, replacing any previous one.
    pub fn register_plugin<P: Plugin>(&mut self, plugin: P) {
        let namespace = plugin.namespace();
        if self.plugins.insert(namespace, Box::new(plugin)).is_some() {
            warn!(namespace, "replacing previously registered plugin");
        } else {
            debug!(namespace, "plugin registered");
        }
    }

    /// The plugin under `namespace`, if it has type `P`.
    pub fn plugin<P: Plugin>(&self, namespace: &str) -> Option<&P> {
        self.plugins.get(namespace)?.downcast_ref::<P>()
    }

    /// Registered namespaces, sorted.
    pub fn namespaces(&self) -> Vec<&'static str> {
        let mut namespaces: Vec<_> = self.plugins.keys().copied().collect();
        namespaces.sort_unstable();
        namespaces
    }
}

/// Gives access to compiling contract handles and the compiler.
#[derive(Debug, Clone, Default)]
pub struct CraftsmanPlugin {
    context: ContractContext,
}

impl CraftsmanPlugin {
    /// Plugin whose handles default to `context`.
    pub fn new(context: ContractContext) -> Self {
        Self { context }
    }

    /// The default context for handles built through the plugin.
    pub fn context(&self) -> &ContractContext {
        &self.context
    }

    /// Build a handle; inits without a context get the plugin's.
    pub fn contract(&self, mut init: ContractInit) -> ExtendedContract {
        if init.context.is_none() {
            init.context = Some(self.context.clone());
        }
        ExtendedContract::new(init)
    }

    /// The compiler service configured by the plugin's context.
    pub fn compiler(&self) -> Arc<SolcService> {
        Arc::new(SolcService::new(self.context.compiler.clone()))
    }

    /// Compile inline source; compiler failures are logged and yield `None`.
    pub async fn compile_source(
        &self,
        unit_name: &str,
        source_code: &str,
    ) -> Result<Option<CompilationResultSet>, CompileError> {
        try_compile(&*self.compiler(), unit_name, source_code, SourceOrFile::Source).await
    }

    /// Compile files under `dir`; compiler failures are logged and yield `None`.
    pub async fn compile_files(
        &self,
        dir: &str,
        files: Vec<String>,
    ) -> Result<Option<CompilationResultSet>, CompileError> {
        try_compile(&*self.compiler(), files, dir, SourceOrFile::Path).await
    }
}

impl Plugin for CraftsmanPlugin {
    fn namespace(&self) -> &'static str {
        CRAFTSMAN_NAMESPACE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftsman_common::CompilerConfig;
    use craftsman_compiler::test_utils::my_contract_abi;

    #[derive(Debug)]
    struct OtherPlugin;

    impl Plugin for OtherPlugin {
        fn namespace(&self) -> &'static str {
            "other"
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = PluginRegistry::new();
        registry.register_plugin(CraftsmanPlugin::default());
        registry.register_plugin(OtherPlugin);

        assert_eq!(registry.namespaces(), vec!["craftsman", "other"]);
        assert!(registry.plugin::<CraftsmanPlugin>(CRAFTSMAN_NAMESPACE).is_some());
        assert!(registry.plugin::<OtherPlugin>("other").is_some());
        assert!(registry.plugin::<OtherPlugin>(CRAFTSMAN_NAMESPACE).is_none());
        assert!(registry.plugin::<CraftsmanPlugin>("missing").is_none());
    }

    #[test]
    fn test_reregistering_replaces() {
        let config = CompilerConfig::default().with_optimizer_runs(1);
        let mut registry = PluginRegistry::new();
        registry.register_plugin(CraftsmanPlugin::default());
        registry.register_plugin(CraftsmanPlugin::new(ContractContext::new(config.clone())));

        let plugin = registry.plugin::<CraftsmanPlugin>(CRAFTSMAN_NAMESPACE).unwrap();
        assert_eq!(plugin.context().compiler, config);
        assert_eq!(registry.namespaces().len(), 1);
    }

    #[test]
    fn test_plugin_fills_in_context() {
        let context = ContractContext::new(CompilerConfig::default().with_evm_version("paris"));
        let plugin = CraftsmanPlugin::new(context.clone());

        let contract = plugin.contract(ContractInit::interface(my_contract_abi()));
        assert_eq!(contract.context(), &context);
        assert_eq!(plugin.compiler().config(), &context.compiler);
    }

    #[tokio::test]
    async fn test_plugin_rejects_empty_file_list() {
        let plugin = CraftsmanPlugin::default();
        let result = plugin.compile_files("", Vec::new()).await;
        assert!(matches!(result, Err(CompileError::InvalidArguments(_))));
    }
}
