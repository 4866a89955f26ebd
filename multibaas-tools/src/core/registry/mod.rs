// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Durable state behind the linking service.
//!
//! A [`Registry`] hands out transactions that hold an exclusive lock over a [`LockScope`]. Reads
//! go through the transaction; writes are collected in a [`ChangeSet`] and applied by
//! [`RegistryTxn::commit`] as a single unit. Dropping a transaction discards it.

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::core::{artifact::ContractArtifact, multibaas::ClientError};

pub use file::FileRegistry;
pub use ledger::Ledger;
pub use memory::MemoryRegistry;
pub use remote::MultiBaasRegistry;

mod file;
mod ledger;
mod locks;
mod memory;
mod remote;

/// A contract label at a specific version, identified by its bytecode hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub contract_label: String,
    pub version: String,
    pub bytecode_hash: B256,
}

/// An address label bound to an on-chain address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBinding {
    pub address_label: String,
    pub address: Address,
}

/// A contract version linked at an address label, with the block event sync starts from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub address_label: String,
    pub contract_label: String,
    pub version: String,
    pub address: Address,
    pub sync_cursor: u64,
}

impl LinkRecord {
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.address_label, &self.contract_label, &self.version)
    }
}

/// Labels a transaction locks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockScope {
    pub contract_label: String,
    pub address_label: String,
}

impl LockScope {
    pub fn new(contract_label: impl Into<String>, address_label: impl Into<String>) -> Self {
        Self {
            contract_label: contract_label.into(),
            address_label: address_label.into(),
        }
    }

    /// Lock keys in acquisition order.
    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys = vec![
            format!("contract:{}", self.contract_label),
            format!("address:{}", self.address_label),
        ];
        keys.sort();
        keys
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    CreateVersion(VersionRecord),
    /// Replace the bytecode stored under an existing version.
    ReplaceVersion(VersionRecord),
    CreateBinding(AddressBinding),
    /// Point an existing address label at a different address.
    ReplaceBinding(AddressBinding),
    PutLink(LinkRecord),
}

/// Writes applied together by [`RegistryTxn::commit`].
#[derive(Clone, Debug)]
pub struct ChangeSet {
    artifact: ContractArtifact,
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new(artifact: ContractArtifact) -> Self {
        Self {
            artifact,
            changes: Vec::new(),
        }
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// The artifact whose bytecode any version change refers to.
    pub fn artifact(&self) -> &ContractArtifact {
        &self.artifact
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[allow(async_fn_in_trait)]
pub trait Registry {
    type Txn<'a>: RegistryTxn
    where
        Self: 'a;

    /// Opens a transaction, waiting for the labels in `scope` to be free.
    async fn begin(&self, scope: &LockScope) -> Result<Self::Txn<'_>, RegistryError>;
}

#[allow(async_fn_in_trait)]
pub trait RegistryTxn {
    async fn version(
        &mut self,
        contract_label: &str,
        version: &str,
    ) -> Result<Option<VersionRecord>, RegistryError>;

    /// Known versions of a contract label, in no particular order.
    async fn versions(&mut self, contract_label: &str)
        -> Result<Vec<VersionRecord>, RegistryError>;

    async fn binding(&mut self, address_label: &str)
        -> Result<Option<AddressBinding>, RegistryError>;

    /// Binding that already holds `address`, whatever its label.
    async fn address_owner(&mut self, address: Address)
        -> Result<Option<AddressBinding>, RegistryError>;

    async fn link(
        &mut self,
        address_label: &str,
        contract_label: &str,
        version: &str,
    ) -> Result<Option<LinkRecord>, RegistryError>;

    /// Applies every change or none of them.
    async fn commit(self, changes: ChangeSet) -> Result<(), RegistryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("ledger {path} is locked by {}", holder_name(.pid))]
    Locked { path: String, pid: Option<u32> },
    #[error("ledger io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("ledger {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Client(#[from] ClientError),
    #[error("MultiBaas returned inconsistent data: {0}")]
    Inconsistent(String),
    #[error("commit aborted after {applied} change(s)")]
    Injected { applied: usize },
}

fn holder_name(pid: &Option<u32>) -> String {
    match pid {
        Some(pid) => format!("process {pid}"),
        None => "another process".to_string(),
    }
}

impl RegistryError {
    /// Whether the failure came from talking to a remote service.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Client(_))
    }
}
