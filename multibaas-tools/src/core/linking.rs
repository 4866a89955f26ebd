// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Linking a compiled contract to a deployed address.
//!
//! A link resolves the contract and address labels, decides which contract version the artifact
//! belongs to, checks the address binding, and fixes the block event sync starts from. All
//! resulting writes are committed in one registry transaction, so a failed link leaves nothing
//! behind.

use std::fmt;

use alloy::primitives::{Address, B256};
use serde::Serialize;

use crate::{
    config::ConfigError,
    core::{
        address::format_address,
        artifact::ContractArtifact,
        block::{BlockError, BlockSource, StartingBlock},
        multibaas::ClientError,
        options::{LinkOptions, OptionsError},
        registry::{
            AddressBinding, Change, ChangeSet, LinkRecord, LockScope, Registry, RegistryError,
            RegistryTxn, VersionRecord,
        },
        version,
    },
};

/// Which existing records a link may overwrite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkPolicy {
    /// Replace the bytecode stored under an existing contract version.
    pub allow_update_contract: bool,
    /// Point an existing address label at a different address.
    pub allow_update_address: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkOutcome {
    pub contract_label: String,
    pub address_label: String,
    pub contract_version: String,
    pub sync_cursor: u64,
    /// Any record was created.
    pub created: bool,
    /// Any existing record was overwritten.
    pub overridden: bool,
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match (self.created, self.overridden) {
            (_, true) => "updated",
            (true, false) => "linked",
            (false, false) => "already linked",
        };
        write!(
            f,
            "{state} {} {} at {} (syncing from block {})",
            self.contract_label, self.contract_version, self.address_label, self.sync_cursor
        )
    }
}

pub struct Linker<R, B> {
    registry: R,
    blocks: B,
    policy: LinkPolicy,
}

impl<R: Registry, B: BlockSource> Linker<R, B> {
    pub fn new(registry: R, blocks: B, policy: LinkPolicy) -> Self {
        Self {
            registry,
            blocks,
            policy,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn policy(&self) -> LinkPolicy {
        self.policy
    }

    /// Links `artifact` at `address`.
    ///
    /// Empty option fields fall back to their defaults: both labels default to the lowercased
    /// contract name, the version to the one already holding this bytecode (or the next free
    /// one), and the starting block to 100 blocks behind the chain head.
    pub async fn link_contract(
        &self,
        artifact: &ContractArtifact,
        address: Address,
        options: &LinkOptions,
    ) -> Result<LinkOutcome, LinkError> {
        options.validate()?;
        let starting_block = options
            .starting_block()
            .map(StartingBlock::parse)
            .transpose()?
            .unwrap_or_default();

        let default_label = artifact.name().to_lowercase();
        let contract_label = options.contract_label().unwrap_or(&default_label).to_owned();
        let address_label = options.address_label().unwrap_or(&default_label).to_owned();
        let bytecode_hash = artifact.bytecode_hash();

        let mut txn = self
            .registry
            .begin(&LockScope::new(&contract_label, &address_label))
            .await?;
        let mut changes = ChangeSet::new(artifact.clone());
        let mut created = false;
        let mut overridden = false;

        let contract_version = match options.contract_version() {
            Some(requested) => {
                let record = VersionRecord {
                    contract_label: contract_label.clone(),
                    version: requested.to_owned(),
                    bytecode_hash,
                };
                match txn.version(&contract_label, requested).await? {
                    None => {
                        changes.push(Change::CreateVersion(record));
                        created = true;
                    }
                    Some(existing) if existing.bytecode_hash == bytecode_hash => {}
                    Some(existing) => {
                        if !self.policy.allow_update_contract {
                            return Err(LinkError::VersionConflict {
                                label: contract_label,
                                version: requested.to_owned(),
                                existing: existing.bytecode_hash,
                                requested: bytecode_hash,
                            });
                        }
                        warn!(@yellow,
                            "overriding bytecode of {} {}: {} -> {}",
                            contract_label, requested, existing.bytecode_hash, bytecode_hash
                        );
                        changes.push(Change::ReplaceVersion(record));
                        overridden = true;
                    }
                }
                requested.to_owned()
            }
            None => {
                let versions = txn.versions(&contract_label).await?;
                let matching = versions
                    .iter()
                    .filter(|record| record.bytecode_hash == bytecode_hash)
                    .map(|record| record.version.as_str());
                match version::latest(matching) {
                    Some(existing) => existing.to_owned(),
                    None => {
                        let next =
                            version::next_version(versions.iter().map(|r| r.version.as_str()));
                        debug!(@grey, "minting version {} of {}", next, contract_label);
                        changes.push(Change::CreateVersion(VersionRecord {
                            contract_label: contract_label.clone(),
                            version: next.clone(),
                            bytecode_hash,
                        }));
                        created = true;
                        next
                    }
                }
            }
        };

        let binding = AddressBinding {
            address_label: address_label.clone(),
            address,
        };
        let existing = txn.binding(&address_label).await?;
        if existing.as_ref().map(|b| b.address) != Some(address) {
            if let Some(owner) = txn.address_owner(address).await? {
                if owner.address_label != address_label {
                    return Err(LinkError::AddressTaken {
                        address,
                        owner: owner.address_label,
                        label: address_label,
                    });
                }
            }
        }
        match existing {
            None => {
                changes.push(Change::CreateBinding(binding));
                created = true;
            }
            Some(existing) if existing.address == address => {}
            Some(existing) => {
                if !self.policy.allow_update_address {
                    return Err(LinkError::AddressConflict {
                        label: address_label,
                        existing: existing.address,
                        requested: address,
                    });
                }
                warn!(@yellow,
                    "rebinding address label {}: {} -> {}",
                    address_label,
                    format_address(&existing.address),
                    format_address(&address)
                );
                changes.push(Change::ReplaceBinding(binding));
                overridden = true;
            }
        }

        let sync_cursor = match txn
            .link(&address_label, &contract_label, &contract_version)
            .await?
        {
            Some(link) if link.address == address => link.sync_cursor,
            _ => {
                let head = self.blocks.block_number().await?;
                let cursor = starting_block.resolve(head)?;
                debug!(@grey,
                    "sync cursor {} resolved from {} at head {}",
                    cursor, starting_block, head
                );
                changes.push(Change::PutLink(LinkRecord {
                    address_label: address_label.clone(),
                    contract_label: contract_label.clone(),
                    version: contract_version.clone(),
                    address,
                    sync_cursor: cursor,
                }));
                created = true;
                cursor
            }
        };

        txn.commit(changes).await?;

        Ok(LinkOutcome {
            contract_label,
            address_label,
            contract_version,
            sync_cursor,
            created,
            overridden,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("missing credential: {variable} is not set")]
    MissingCredential { variable: &'static str },
    #[error(
        "version {version} of {label} already holds different bytecode \
         (stored {existing}, artifact {requested}); \
         set MULTIBAAS_ALLOW_UPDATE_CONTRACT=true to overwrite it"
    )]
    VersionConflict {
        label: String,
        version: String,
        existing: B256,
        requested: B256,
    },
    #[error(
        "address label {label} is bound to {}, not {}; \
         set MULTIBAAS_ALLOW_UPDATE_ADDRESS=true to rebind it",
        format_address(.existing),
        format_address(.requested)
    )]
    AddressConflict {
        label: String,
        existing: Address,
        requested: Address,
    },
    #[error(
        "address {} is already registered as {owner}, not {label}",
        format_address(.address)
    )]
    AddressTaken {
        address: Address,
        owner: String,
        label: String,
    },
    #[error("{0}")]
    InvalidStartingBlock(BlockError),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("registry error: {0}")]
    Registry(RegistryError),
    #[error("invalid link options: {0}")]
    Options(#[from] OptionsError),
}

impl LinkError {
    /// Whether existing records disagree with the requested link.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::VersionConflict { .. } | Self::AddressConflict { .. } | Self::AddressTaken { .. }
        )
    }
}

impl From<BlockError> for LinkError {
    fn from(err: BlockError) -> Self {
        match err {
            BlockError::Unavailable(message) => Self::Transport(message),
            err => Self::InvalidStartingBlock(err),
        }
    }
}

impl From<RegistryError> for LinkError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Client(err) => err.into(),
            err => Self::Registry(err),
        }
    }
}

impl From<ClientError> for LinkError {
    fn from(err: ClientError) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<ConfigError> for LinkError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingCredential { variable } => Self::MissingCredential { variable },
        }
    }
}
