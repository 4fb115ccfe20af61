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

//! Single-resolution compilation outcome shared between a handle and its task.

use std::{fmt, sync::Arc};

use craftsman_compiler::CompiledArtifact;
use tokio::sync::watch;

use crate::ContractError;

/// Resolved value of a [`CompilationOutcome`].
pub type OutcomeResult = Result<Arc<CompiledArtifact>, Arc<ContractError>>;

/// Where a handle is in its compilation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilationState {
    /// Built from an ABI; never compiles.
    Uncompiled,
    /// Compilation is running.
    Compiling,
    /// Compilation succeeded and the handle carries ABI and bytecode.
    Ready,
    /// Compilation failed.
    Failed,
}

impl fmt::Display for CompilationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uncompiled => "uncompiled",
            Self::Compiling => "compiling",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Resolved(OutcomeResult),
}

/// Write side of a [`CompilationOutcome`]. Consumed by resolving.
#[derive(Debug)]
pub(crate) struct OutcomeSender(watch::Sender<Slot>);

impl OutcomeSender {
    pub(crate) fn resolve(self, result: OutcomeResult) {
        // Never fails, even when every handle has been dropped.
        self.0.send_replace(Slot::Resolved(result));
    }
}

/// The eventual result of a handle's compilation.
///
/// Resolves exactly once. Any number of callers may poll it with
/// [`peek`](Self::peek) or await it with [`wait`](Self::wait); all observe the
/// same value.
#[derive(Debug, Clone)]
pub struct CompilationOutcome {
    rx: watch::Receiver<Slot>,
}

impl CompilationOutcome {
    pub(crate) fn channel() -> (OutcomeSender, Self) {
        let (tx, rx) = watch::channel(Slot::Pending);
        (OutcomeSender(tx), Self { rx })
    }

    /// The resolved value, or `None` while compilation is running.
    ///
    /// A task that died without resolving reads as
    /// [`ContractError::CompilationAborted`].
    pub fn peek(&self) -> Option<OutcomeResult> {
        match &*self.rx.borrow() {
            Slot::Resolved(result) => Some(result.clone()),
            Slot::Pending if self.rx.has_changed().is_err() => {
                Some(Err(Arc::new(ContractError::CompilationAborted)))
            }
            Slot::Pending => None,
        }
    }

    /// Whether the outcome has resolved.
    pub fn is_resolved(&self) -> bool {
        self.peek().is_some()
    }

    /// Wait for the outcome.
    pub async fn wait(&self) -> OutcomeResult {
        let mut rx = self.rx.clone();
        let resolved = rx.wait_for(|slot| matches!(slot, Slot::Resolved(_))).await;
        match resolved.as_deref() {
            Ok(Slot::Resolved(result)) => result.clone(),
            _ => Err(Arc::new(ContractError::CompilationAborted)),
        }
    }

    /// Lifecycle state derived from the outcome.
    pub fn state(&self) -> CompilationState {
        match self.peek() {
            None => CompilationState::Compiling,
            Some(Ok(_)) => CompilationState::Ready,
            Some(Err(_)) => CompilationState::Failed,
        }
    }
}
