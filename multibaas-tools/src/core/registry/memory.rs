// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use alloy::primitives::Address;
use parking_lot::Mutex;

use super::{
    locks::{LabelLocks, ScopeGuard},
    AddressBinding, ChangeSet, Ledger, LinkRecord, LockScope, Registry, RegistryError, RegistryTxn,
    VersionRecord,
};

/// Registry kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    state: Mutex<Ledger>,
    locks: LabelLocks,
    fail_after: Mutex<Option<usize>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            state: Mutex::new(ledger),
            ..Default::default()
        }
    }

    /// Copy of the committed state.
    pub fn snapshot(&self) -> Ledger {
        self.state.lock().clone()
    }

    /// Makes the next commit abort once `applied` changes have been staged.
    pub fn fail_next_commit_after(&self, applied: usize) {
        *self.fail_after.lock() = Some(applied);
    }
}

impl Registry for MemoryRegistry {
    type Txn<'a> = MemoryTxn<'a>;

    async fn begin(&self, scope: &LockScope) -> Result<MemoryTxn<'_>, RegistryError> {
        let guard = self.locks.acquire(scope).await;
        Ok(MemoryTxn {
            registry: self,
            _guard: guard,
        })
    }
}

#[derive(Debug)]
pub struct MemoryTxn<'a> {
    registry: &'a MemoryRegistry,
    _guard: ScopeGuard,
}

impl RegistryTxn for MemoryTxn<'_> {
    async fn version(
        &mut self,
        contract_label: &str,
        version: &str,
    ) -> Result<Option<VersionRecord>, RegistryError> {
        Ok(self
            .registry
            .state
            .lock()
            .version(contract_label, version)
            .cloned())
    }

    async fn versions(
        &mut self,
        contract_label: &str,
    ) -> Result<Vec<VersionRecord>, RegistryError> {
        Ok(self
            .registry
            .state
            .lock()
            .versions(contract_label)
            .cloned()
            .collect())
    }

    async fn binding(
        &mut self,
        address_label: &str,
    ) -> Result<Option<AddressBinding>, RegistryError> {
        Ok(self.registry.state.lock().binding(address_label).cloned())
    }

    async fn address_owner(
        &mut self,
        address: Address,
    ) -> Result<Option<AddressBinding>, RegistryError> {
        Ok(self.registry.state.lock().address_owner(address).cloned())
    }

    async fn link(
        &mut self,
        address_label: &str,
        contract_label: &str,
        version: &str,
    ) -> Result<Option<LinkRecord>, RegistryError> {
        Ok(self
            .registry
            .state
            .lock()
            .link(address_label, contract_label, version)
            .cloned())
    }

    async fn commit(self, changes: ChangeSet) -> Result<(), RegistryError> {
        let fail_after = self.registry.fail_after.lock().take();
        let mut state = self.registry.state.lock();
        let mut staged = state.clone();
        for (applied, change) in changes.changes().iter().enumerate() {
            if fail_after == Some(applied) {
                return Err(RegistryError::Injected { applied });
            }
            staged.apply(change);
        }
        *state = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, B256};

    use super::*;
    use crate::core::{artifact::ContractArtifact, registry::Change};

    fn change_set() -> ChangeSet {
        let mut changes = ChangeSet::new(ContractArtifact::new("Counter", vec![0x60]));
        changes.push(Change::CreateVersion(VersionRecord {
            contract_label: "counter".into(),
            version: "1.0".into(),
            bytecode_hash: B256::repeat_byte(1),
        }));
        changes.push(Change::CreateBinding(AddressBinding {
            address_label: "counter".into(),
            address: address!("0x00000000000000000000000000000000000000aa"),
        }));
        changes
    }

    #[tokio::test]
    async fn commit_applies_all_changes() {
        let registry = MemoryRegistry::new();
        let txn = registry.begin(&LockScope::new("counter", "counter")).await.unwrap();
        txn.commit(change_set()).await.unwrap();

        let mut txn = registry.begin(&LockScope::new("counter", "counter")).await.unwrap();
        assert!(txn.version("counter", "1.0").await.unwrap().is_some());
        assert!(txn.binding("counter").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn injected_failure_leaves_state_untouched() {
        let registry = MemoryRegistry::new();
        registry.fail_next_commit_after(1);
        let txn = registry.begin(&LockScope::new("counter", "counter")).await.unwrap();
        let err = txn.commit(change_set()).await.unwrap_err();
        assert!(matches!(err, RegistryError::Injected { applied: 1 }));
        assert_eq!(registry.snapshot(), Ledger::default());

        // the hook only fires once
        let txn = registry.begin(&LockScope::new("counter", "counter")).await.unwrap();
        txn.commit(change_set()).await.unwrap();
        assert_ne!(registry.snapshot(), Ledger::default());
    }

    #[tokio::test]
    async fn dropped_transaction_discards_and_releases() {
        let registry = MemoryRegistry::new();
        let txn = registry.begin(&LockScope::new("counter", "counter")).await.unwrap();
        drop(txn);
        let mut txn = registry.begin(&LockScope::new("counter", "counter")).await.unwrap();
        assert!(txn.versions("counter").await.unwrap().is_empty());
    }
}
