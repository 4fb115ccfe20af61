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

//! Contract handle that can be built from Solidity source.
//!
//! A handle built from source is returned immediately with an empty ABI while a
//! tokio task compiles the source. When the task succeeds it writes the ABI and
//! bytecode into the handle's options, after which the handle behaves exactly
//! like one built from a pre-compiled ABI.
//!
//! ```ignore
//! let contract = ExtendedContract::from_source(MY_CONTRACT);
//! let artifact = contract.wait_for_compilation().await?;
//! let deploy = contract.deploy_builder(provider, constructor_args)?;
//! ```

use std::sync::Arc;

use alloy_contract::{ContractInstance, Interface, RawCallBuilder};
use alloy_json_abi::JsonAbi;
use alloy_network::Network;
use alloy_primitives::Bytes;
use alloy_provider::Provider;
use craftsman_compiler::{
    compile, CompilationResultSet, CompiledArtifact, CompilerService, SolcService, SourceOrFile,
};
use parking_lot::RwLock;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::{
    CompilationOutcome, CompilationState, ContractContext, ContractError, ContractInit,
    ContractOptions, ContractSpec, OutcomeResult, OutcomeSender, SYNTHETIC_UNIT_NAME,
};

/// A contract handle, optionally compiled from source.
#[derive(Debug)]
pub struct ExtendedContract {
    options: Arc<RwLock<ContractOptions>>,
    context: ContractContext,
    compilation: Option<CompilationOutcome>,
}

/// What the background task compiles.
enum CompileJob {
    Source(String),
    Files { dir: String, files: Vec<String> },
}

impl ExtendedContract {
    /// Build a handle, compiling with solc when `init` carries source.
    pub fn new(init: ContractInit) -> Self {
        let compiler = init.context.clone().unwrap_or_default().compiler;
        Self::with_service(init, Arc::new(SolcService::new(compiler)))
    }

    /// Build a handle compiling through `service`.
    ///
    /// Outside a tokio runtime the outcome resolves to
    /// [`ContractError::RuntimeUnavailable`].
    pub fn with_service<S>(init: ContractInit, service: Arc<S>) -> Self
    where
        S: CompilerService + 'static,
    {
        let ContractInit { spec, address, mut options, context, contract_name } = init;
        if address.is_some() {
            options.address = address;
        }
        let context = context.unwrap_or_default();

        let job = match spec {
            ContractSpec::Interface(abi) => {
                options.json_interface = abi;
                return Self {
                    options: Arc::new(RwLock::new(options)),
                    context,
                    compilation: None,
                };
            }
            ContractSpec::Source(source) => CompileJob::Source(source),
            ContractSpec::Files { dir, files } => CompileJob::Files { dir, files },
        };

        // Placeholder until the compilation task fills it in.
        options.json_interface = JsonAbi::default();
        let options = Arc::new(RwLock::new(options));
        let (sender, outcome) = CompilationOutcome::channel();

        match Handle::try_current() {
            Ok(handle) => {
                let task =
                    run_compilation(service, job, contract_name, Arc::clone(&options), sender);
                handle.spawn(task);
                debug!("compilation scheduled");
            }
            Err(e) => {
                warn!("cannot schedule compilation: {e}");
                sender.resolve(Err(Arc::new(ContractError::RuntimeUnavailable)));
            }
        }

        Self { options, context, compilation: Some(outcome) }
    }

    /// Handle for a pre-compiled ABI.
    pub fn from_abi(abi: JsonAbi) -> Self {
        Self::new(ContractInit::interface(abi))
    }

    /// Handle compiled from `source_code` with default settings.
    pub fn from_source(source_code: impl Into<String>) -> Self {
        Self::new(ContractInit::source(source_code))
    }

    /// Snapshot of the current options.
    pub fn options(&self) -> ContractOptions {
        self.options.read().clone()
    }

    /// The context the handle was built with.
    pub fn context(&self) -> &ContractContext {
        &self.context
    }

    /// The compilation outcome.
    ///
    /// Fails with [`ContractError::NoCompilationPerformed`] for handles built from an ABI.
    pub fn compilation_result(&self) -> Result<&CompilationOutcome, ContractError> {
        self.compilation.as_ref().ok_or(ContractError::NoCompilationPerformed)
    }

    /// Wait for the compilation to finish.
    pub async fn wait_for_compilation(&self) -> OutcomeResult {
        match &self.compilation {
            Some(outcome) => outcome.wait().await,
            None => Err(Arc::new(ContractError::NoCompilationPerformed)),
        }
    }

    /// Whether compilation has finished; `None` when there is no compilation.
    pub fn had_finished_compilation(&self) -> Option<bool> {
        self.compilation.as_ref().map(CompilationOutcome::is_resolved)
    }

    /// Lifecycle state.
    pub fn state(&self) -> CompilationState {
        self.compilation.as_ref().map_or(CompilationState::Uncompiled, CompilationOutcome::state)
    }

    /// Whether on-chain operations may use the handle.
    pub fn is_ready(&self) -> bool {
        matches!(self.state(), CompilationState::Uncompiled | CompilationState::Ready)
    }

    fn ensure_ready(&self) -> Result<(), ContractError> {
        match self.state() {
            CompilationState::Uncompiled | CompilationState::Ready => Ok(()),
            state => Err(ContractError::NotReady(state)),
        }
    }

    /// An `alloy` contract instance at the configured address.
    pub fn instance<P, N>(&self, provider: P) -> Result<ContractInstance<P, N>, ContractError>
    where
        P: Provider<N>,
        N: Network,
    {
        self.ensure_ready()?;
        let options = self.options();
        let address = options.address.ok_or(ContractError::MissingAddress)?;
        Ok(ContractInstance::new(address, provider, Interface::new(options.json_interface)))
    }

    /// A deployment transaction builder for the compiled bytecode.
    ///
    /// `constructor_args` must already be ABI-encoded.
    pub fn deploy_builder<P, N>(
        &self,
        provider: P,
        constructor_args: Bytes,
    ) -> Result<RawCallBuilder<P, N>, ContractError>
    where
        P: Provider<N>,
        N: Network,
    {
        self.ensure_ready()?;
        let options = self.options();
        let code = match options.input.as_deref() {
            Some(code) if !code.is_empty() => hex::decode(code)?,
            _ => return Err(ContractError::MissingBytecode),
        };

        let mut input = code;
        input.extend_from_slice(&constructor_args);

        let mut builder = RawCallBuilder::new_raw_deploy(provider, Bytes::from(input));
        if let Some(from) = options.from {
            builder = builder.from(from);
        }
        if let Some(gas) = options.gas {
            builder = builder.gas(gas);
        }
        if let Some(gas_price) = options.gas_price {
            builder = builder.gas_price(gas_price);
        }
        Ok(builder)
    }
}

async fn run_compilation<S: CompilerService>(
    service: Arc<S>,
    job: CompileJob,
    contract_name: Option<String>,
    options: Arc<RwLock<ContractOptions>>,
    sender: OutcomeSender,
) {
    let compiled = match &job {
        CompileJob::Source(source) => {
            compile(&*service, SYNTHETIC_UNIT_NAME, source, SourceOrFile::Source).await
        }
        CompileJob::Files { dir, files } => {
            compile(&*service, files.clone(), dir, SourceOrFile::Path).await
        }
    };

    let result = match compiled {
        Ok(set) => match select_artifact(&set, &job, contract_name.as_deref()) {
            Some(artifact) => {
                let mut options = options.write();
                options.json_interface = artifact.abi.clone();
                options.input = Some(artifact.bytecode.clone());
                info!(bytecode_len = artifact.bytecode.len(), "contract compiled");
                Ok(artifact)
            }
            None => {
                let found = set.contract_names().into_iter().map(|(_, name)| name).collect();
                warn!(?found, "compilation did not yield a single contract");
                Err(Arc::new(ContractError::AmbiguousResult { found }))
            }
        },
        Err(err) => Err(Arc::new(ContractError::Compile(err))),
    };

    sender.resolve(result);
}

/// The artifact a handle should adopt, if exactly one qualifies.
fn select_artifact(
    set: &CompilationResultSet,
    job: &CompileJob,
    contract_name: Option<&str>,
) -> Option<Arc<CompiledArtifact>> {
    let artifact = match (job, contract_name) {
        (CompileJob::Source(_), Some(name)) => set.contract(SYNTHETIC_UNIT_NAME, name),
        (CompileJob::Source(_), None) => {
            let contracts = set.unit(SYNTHETIC_UNIT_NAME)?;
            let mut iter = contracts.values();
            match (iter.next(), iter.next()) {
                (Some(only), None) => Some(only),
                _ => None,
            }
        }
        (CompileJob::Files { .. }, Some(name)) => set.find(name),
        (CompileJob::Files { .. }, None) => set.single().map(|(_, artifact)| artifact),
    }?;

    artifact.has_bytecode().then(|| Arc::clone(artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use craftsman_compiler::test_utils::{my_contract_abi, MockCompiler, MY_CONTRACT, TWO_CONTRACTS};
    use tokio::sync::Notify;

    fn my_contract_compiler() -> MockCompiler {
        MockCompiler::new().with_artifact(
            SYNTHETIC_UNIT_NAME,
            "MyContract",
            CompiledArtifact::new(my_contract_abi(), "6080604052"),
        )
    }

    #[tokio::test]
    async fn test_source_handle_completes() {
        let service = Arc::new(my_contract_compiler());
        let contract =
            ExtendedContract::with_service(ContractInit::source(MY_CONTRACT), service.clone());

        let artifact = contract.wait_for_compilation().await.unwrap();
        assert_eq!(artifact.abi, my_contract_abi());
        assert_eq!(contract.options().json_interface, my_contract_abi());
        assert_eq!(contract.options().input.as_deref(), Some("6080604052"));
        assert_eq!(contract.had_finished_compilation(), Some(true));
        assert_eq!(contract.state(), CompilationState::Ready);
        assert_eq!(service.source_calls(), vec![SYNTHETIC_UNIT_NAME.to_string()]);
    }

    #[tokio::test]
    async fn test_constructor_returns_before_compilation() {
        let gate = Arc::new(Notify::new());
        let service = Arc::new(my_contract_compiler().with_gate(gate.clone()));
        let contract = ExtendedContract::with_service(ContractInit::source(MY_CONTRACT), service);

        assert_eq!(contract.had_finished_compilation(), Some(false));
        assert_eq!(contract.state(), CompilationState::Compiling);
        assert_eq!(contract.options().json_interface, JsonAbi::default());
        assert!(matches!(
            contract.deploy_builder::<_, alloy_network::Ethereum>(test_provider(), Bytes::new()),
            Err(ContractError::NotReady(CompilationState::Compiling))
        ));

        gate.notify_one();
        contract.wait_for_compilation().await.unwrap();
        assert_eq!(contract.had_finished_compilation(), Some(true));
    }

    #[tokio::test]
    async fn test_repeated_waits_do_not_recompile() {
        let service = Arc::new(my_contract_compiler());
        let contract =
            ExtendedContract::with_service(ContractInit::source(MY_CONTRACT), service.clone());

        let first = contract.wait_for_compilation().await.unwrap();
        let second = contract.compilation_result().unwrap().wait().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(service.invocations(), 1);
    }

    #[tokio::test]
    async fn test_rejected_source_fails_outcome() {
        let service = Arc::new(MockCompiler::new().rejecting("ParserError"));
        let contract = ExtendedContract::with_service(ContractInit::source("contract {"), service);

        let err = contract.wait_for_compilation().await.unwrap_err();
        assert!(matches!(&*err, ContractError::Compile(e) if e.is_rejected()));
        assert_eq!(contract.had_finished_compilation(), Some(true));
        assert_eq!(contract.state(), CompilationState::Failed);
        assert!(contract.options().input.is_none());
    }

    #[tokio::test]
    async fn test_two_contracts_are_ambiguous() {
        let service = Arc::new(
            MockCompiler::new()
                .with_contract(SYNTHETIC_UNIT_NAME, "First", "60")
                .with_contract(SYNTHETIC_UNIT_NAME, "Second", "61"),
        );
        let contract = ExtendedContract::with_service(ContractInit::source(TWO_CONTRACTS), service);

        let err = contract.wait_for_compilation().await.unwrap_err();
        match &*err {
            ContractError::AmbiguousResult { found } => {
                assert_eq!(found, &vec!["First".to_string(), "Second".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(contract.had_finished_compilation(), Some(true));
    }

    #[tokio::test]
    async fn test_contract_name_selects_one_of_many() {
        let service = Arc::new(
            MockCompiler::new()
                .with_contract(SYNTHETIC_UNIT_NAME, "First", "60")
                .with_contract(SYNTHETIC_UNIT_NAME, "Second", "61"),
        );
        let init = ContractInit::source(TWO_CONTRACTS).with_contract_name("Second");
        let contract = ExtendedContract::with_service(init, service);

        let artifact = contract.wait_for_compilation().await.unwrap();
        assert_eq!(artifact.bytecode, "61");
    }

    #[tokio::test]
    async fn test_interface_without_bytecode_is_ambiguous() {
        let service =
            Arc::new(MockCompiler::new().with_contract(SYNTHETIC_UNIT_NAME, "IToken", ""));
        let init = ContractInit::source("interface IToken {}");
        let contract = ExtendedContract::with_service(init, service);

        let err = contract.wait_for_compilation().await.unwrap_err();
        assert!(matches!(&*err, ContractError::AmbiguousResult { .. }));
    }

    #[tokio::test]
    async fn test_file_handle() {
        let service = Arc::new(MockCompiler::new().with_contract("contracts/A.sol", "A", "6080"));
        let init = ContractInit::files("contracts/", ["A.sol"]);
        let contract = ExtendedContract::with_service(init, service.clone());

        let artifact = contract.wait_for_compilation().await.unwrap();
        assert_eq!(artifact.bytecode, "6080");
        assert_eq!(service.file_calls(), vec!["contracts/A.sol".to_string()]);
    }

    #[tokio::test]
    async fn test_abi_handle_has_no_compilation() {
        let address = Address::repeat_byte(0xde);
        let contract = ExtendedContract::new(
            ContractInit::interface(my_contract_abi()).with_address(address),
        );

        assert!(matches!(
            contract.compilation_result(),
            Err(ContractError::NoCompilationPerformed)
        ));
        assert!(matches!(
            &*contract.wait_for_compilation().await.unwrap_err(),
            ContractError::NoCompilationPerformed
        ));
        assert_eq!(contract.had_finished_compilation(), None);
        assert_eq!(contract.state(), CompilationState::Uncompiled);

        let instance = contract.instance::<_, alloy_network::Ethereum>(test_provider()).unwrap();
        assert_eq!(*instance.address(), address);
    }

    #[tokio::test]
    async fn test_instance_needs_address() {
        let contract = ExtendedContract::from_abi(my_contract_abi());
        assert!(matches!(
            contract.instance::<_, alloy_network::Ethereum>(test_provider()),
            Err(ContractError::MissingAddress)
        ));
    }

    #[tokio::test]
    async fn test_deploy_builder_appends_constructor_args() {
        let service = Arc::new(my_contract_compiler());
        let contract = ExtendedContract::with_service(ContractInit::source(MY_CONTRACT), service);
        contract.wait_for_compilation().await.unwrap();

        let builder = contract
            .deploy_builder::<_, alloy_network::Ethereum>(test_provider(), Bytes::from(vec![0x2a]))
            .unwrap();
        assert_eq!(builder.calldata(), &Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52, 0x2a]));
    }

    #[tokio::test]
    async fn test_abi_handle_cannot_deploy() {
        let contract = ExtendedContract::from_abi(my_contract_abi());
        let result = contract
            .deploy_builder::<_, alloy_network::Ethereum>(test_provider(), Bytes::from(vec![0x2a]));
        assert!(matches!(result, Err(ContractError::MissingBytecode)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_options_snapshot_does_not_block_compilation() {
        let gate = Arc::new(Notify::new());
        let service = Arc::new(my_contract_compiler().with_gate(gate.clone()));
        let contract = ExtendedContract::with_service(ContractInit::source(MY_CONTRACT), service);

        let before = contract.options();
        gate.notify_one();
        contract.wait_for_compilation().await.unwrap();

        assert_eq!(before.json_interface, JsonAbi::default());
        assert_eq!(contract.options().json_interface, my_contract_abi());
    }

    #[test]
    fn test_source_handle_outside_runtime_fails_outcome() {
        let contract = ExtendedContract::with_service(
            ContractInit::source(MY_CONTRACT),
            Arc::new(my_contract_compiler()),
        );

        assert_eq!(contract.had_finished_compilation(), Some(true));
        assert_eq!(contract.state(), CompilationState::Failed);
        let err = contract.compilation_result().unwrap().peek().unwrap().unwrap_err();
        assert!(matches!(*err, ContractError::RuntimeUnavailable));
    }

    fn test_provider() -> impl Provider<alloy_network::Ethereum> + Clone {
        alloy_provider::ProviderBuilder::new()
            .connect_http("http://localhost:8545".parse().unwrap())
    }
}
