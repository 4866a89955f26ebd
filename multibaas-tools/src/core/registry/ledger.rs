// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::collections::BTreeMap;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use super::{AddressBinding, Change, LinkRecord, VersionRecord};

/// Complete registry state, as kept in memory and in the ledger file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ledger {
    contracts: BTreeMap<String, BTreeMap<String, VersionRecord>>,
    addresses: BTreeMap<String, AddressBinding>,
    links: Vec<LinkRecord>,
}

impl Ledger {
    pub fn version(&self, contract_label: &str, version: &str) -> Option<&VersionRecord> {
        self.contracts.get(contract_label)?.get(version)
    }

    pub fn versions(&self, contract_label: &str) -> impl Iterator<Item = &VersionRecord> {
        self.contracts
            .get(contract_label)
            .into_iter()
            .flat_map(|versions| versions.values())
    }

    pub fn binding(&self, address_label: &str) -> Option<&AddressBinding> {
        self.addresses.get(address_label)
    }

    /// Binding that holds `address`, under whichever label.
    pub fn address_owner(&self, address: Address) -> Option<&AddressBinding> {
        self.addresses
            .values()
            .find(|binding| binding.address == address)
    }

    pub fn link(
        &self,
        address_label: &str,
        contract_label: &str,
        version: &str,
    ) -> Option<&LinkRecord> {
        self.links
            .iter()
            .find(|link| link.key() == (address_label, contract_label, version))
    }

    pub fn links(&self) -> &[LinkRecord] {
        &self.links
    }

    pub fn apply(&mut self, change: &Change) {
        match change {
            Change::CreateVersion(record) | Change::ReplaceVersion(record) => {
                self.contracts
                    .entry(record.contract_label.clone())
                    .or_default()
                    .insert(record.version.clone(), record.clone());
            }
            Change::CreateBinding(binding) | Change::ReplaceBinding(binding) => {
                self.addresses
                    .insert(binding.address_label.clone(), binding.clone());
            }
            Change::PutLink(record) => {
                match self.links.iter_mut().find(|link| link.key() == record.key()) {
                    Some(existing) => *existing = record.clone(),
                    None => self.links.push(record.clone()),
                }
            }
        }
    }
}
