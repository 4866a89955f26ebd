// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::collections::HashMap;

use alloy::primitives::{keccak256, Address};

use super::{
    locks::{LabelLocks, ScopeGuard},
    AddressBinding, Change, ChangeSet, LinkRecord, LockScope, Registry, RegistryError, RegistryTxn,
    VersionRecord,
};
use crate::core::{
    address::{format_address, parse_address},
    artifact::ContractArtifact,
    multibaas::{AddressInfo, Client, ContractInfo},
};

/// Registry backed by a MultiBaas deployment.
///
/// MultiBaas has no transactions, so a commit issues its writes in order and, when one fails,
/// deletes whatever it created earlier in the same commit, replacements included. Records deleted
/// to apply an override cannot be restored.
#[derive(Debug)]
pub struct MultiBaasRegistry {
    client: Client,
    locks: LabelLocks,
}

impl MultiBaasRegistry {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            locks: LabelLocks::default(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Registry for MultiBaasRegistry {
    type Txn<'a> = MultiBaasTxn<'a>;

    async fn begin(&self, scope: &LockScope) -> Result<MultiBaasTxn<'_>, RegistryError> {
        let guard = self.locks.acquire(scope).await;
        Ok(MultiBaasTxn {
            client: &self.client,
            addresses: HashMap::new(),
            _guard: guard,
        })
    }
}

#[derive(Debug)]
pub struct MultiBaasTxn<'a> {
    client: &'a Client,
    addresses: HashMap<String, Option<AddressInfo>>,
    _guard: ScopeGuard,
}

/// A resource created during a commit.
#[derive(Debug)]
enum Created {
    Contract { label: String, version: String },
    Address { label: String },
}

impl MultiBaasTxn<'_> {
    async fn address(&mut self, label: &str) -> Result<Option<AddressInfo>, RegistryError> {
        if let Some(info) = self.addresses.get(label) {
            return Ok(info.clone());
        }
        let info = self.client.get_address(label).await?;
        self.addresses.insert(label.to_owned(), info.clone());
        Ok(info)
    }

    async fn apply(
        &self,
        change: &Change,
        artifact: &ContractArtifact,
        created: &mut Vec<Created>,
    ) -> Result<(), RegistryError> {
        match change {
            Change::CreateVersion(record) => {
                self.client
                    .create_contract(&record.contract_label, &record.version, artifact)
                    .await?;
                created.push(Created::Contract {
                    label: record.contract_label.clone(),
                    version: record.version.clone(),
                });
            }
            Change::ReplaceVersion(record) => {
                self.client
                    .delete_contract(&record.contract_label, &record.version)
                    .await?;
                self.client
                    .create_contract(&record.contract_label, &record.version, artifact)
                    .await?;
                created.push(Created::Contract {
                    label: record.contract_label.clone(),
                    version: record.version.clone(),
                });
            }
            Change::CreateBinding(binding) => {
                self.client
                    .create_address(&binding.address_label, &format_address(&binding.address))
                    .await?;
                created.push(Created::Address {
                    label: binding.address_label.clone(),
                });
            }
            Change::ReplaceBinding(binding) => {
                self.client.delete_address(&binding.address_label).await?;
                self.client
                    .create_address(&binding.address_label, &format_address(&binding.address))
                    .await?;
                created.push(Created::Address {
                    label: binding.address_label.clone(),
                });
            }
            Change::PutLink(link) => {
                self.client
                    .link_contract(
                        &link.address_label,
                        &link.contract_label,
                        &link.version,
                        link.sync_cursor,
                    )
                    .await?;
            }
        }
        Ok(())
    }

    async fn roll_back(&self, created: Vec<Created>) {
        for resource in created.into_iter().rev() {
            let result = match &resource {
                Created::Contract { label, version } => {
                    self.client.delete_contract(label, version).await
                }
                Created::Address { label } => self.client.delete_address(label).await,
            };
            match result {
                Ok(()) => debug!(@grey, "rolled back {:?}", resource),
                Err(err) => warn!(@yellow, "failed to roll back {:?}: {}", resource, err),
            }
        }
    }
}

impl RegistryTxn for MultiBaasTxn<'_> {
    async fn version(
        &mut self,
        contract_label: &str,
        version: &str,
    ) -> Result<Option<VersionRecord>, RegistryError> {
        self.client
            .get_contract(contract_label, version)
            .await?
            .map(version_record)
            .transpose()
    }

    /// MultiBaas only reports the latest version of a label.
    async fn versions(
        &mut self,
        contract_label: &str,
    ) -> Result<Vec<VersionRecord>, RegistryError> {
        self.client
            .get_latest_contract(contract_label)
            .await?
            .map(version_record)
            .into_iter()
            .collect()
    }

    async fn binding(
        &mut self,
        address_label: &str,
    ) -> Result<Option<AddressBinding>, RegistryError> {
        let Some(info) = self.address(address_label).await? else {
            return Ok(None);
        };
        Ok(Some(AddressBinding {
            address_label: address_label.to_owned(),
            address: parse_info_address(&info)?,
        }))
    }

    /// Addresses registered without a label are treated as unowned.
    async fn address_owner(
        &mut self,
        address: Address,
    ) -> Result<Option<AddressBinding>, RegistryError> {
        let Some(info) = self.client.get_address(&format_address(&address)).await? else {
            return Ok(None);
        };
        if info.label.is_empty() {
            return Ok(None);
        }
        Ok(Some(AddressBinding {
            address_label: info.label,
            address,
        }))
    }

    async fn link(
        &mut self,
        address_label: &str,
        contract_label: &str,
        version: &str,
    ) -> Result<Option<LinkRecord>, RegistryError> {
        let Some(info) = self.address(address_label).await? else {
            return Ok(None);
        };
        let Some(sync_cursor) = info
            .contracts
            .iter()
            .find(|linked| linked.label == contract_label && linked.version == version)
            .and_then(|linked| linked.sync_cursor())
        else {
            return Ok(None);
        };
        Ok(Some(LinkRecord {
            address_label: address_label.to_owned(),
            contract_label: contract_label.to_owned(),
            version: version.to_owned(),
            address: parse_info_address(&info)?,
            sync_cursor,
        }))
    }

    async fn commit(self, changes: ChangeSet) -> Result<(), RegistryError> {
        let mut created = Vec::new();
        for change in changes.changes() {
            if let Err(err) = self.apply(change, changes.artifact(), &mut created).await {
                warn!(@yellow, "MultiBaas commit failed, rolling back: {}", err);
                self.roll_back(created).await;
                return Err(err);
            }
        }
        Ok(())
    }
}

fn version_record(info: ContractInfo) -> Result<VersionRecord, RegistryError> {
    let bin = info.bin.trim_start_matches("0x");
    let bytecode = hex::decode(bin).map_err(|e| {
        RegistryError::Inconsistent(format!(
            "bytecode of {} {} is not hex: {e}",
            info.label, info.version
        ))
    })?;
    Ok(VersionRecord {
        contract_label: info.label,
        version: info.version,
        bytecode_hash: keccak256(bytecode),
    })
}

fn parse_info_address(info: &AddressInfo) -> Result<Address, RegistryError> {
    parse_address(&info.address).map_err(|e| {
        RegistryError::Inconsistent(format!("address label {}: {e}", info.label))
    })
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, B256};
    use serde_json::{json, Value};
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::core::{
        block::FixedHead,
        linking::{LinkError, LinkPolicy, Linker},
        options::LinkOptions,
    };

    const COUNTER: Address = address!("0x00000000000000000000000000000000000000aa");
    const COUNTER_HEX: &str = "0x00000000000000000000000000000000000000aa";

    fn ok(result: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "message": "success",
            "result": result,
        }))
    }

    fn not_found() -> ResponseTemplate {
        ResponseTemplate::new(404).set_body_json(json!({ "status": 404, "message": "not found" }))
    }

    fn server_error() -> ResponseTemplate {
        ResponseTemplate::new(500).set_body_json(json!({ "status": 500, "message": "boom" }))
    }

    fn artifact() -> ContractArtifact {
        ContractArtifact::new("Counter", vec![0x60, 0x80])
    }

    fn scope() -> LockScope {
        LockScope::new("counter", "counter")
    }

    #[tokio::test]
    async fn reads_map_to_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v0/contracts/counter/1.0"))
            .respond_with(ok(json!({ "label": "counter", "version": "1.0", "bin": "0x6080" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v0/chains/ethereum/addresses/counter"))
            .respond_with(ok(json!({
                "label": "counter",
                "address": "0x00000000000000000000000000000000000000AA",
                "contracts": [{ "label": "counter", "version": "1.0", "startingBlock": "900" }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let registry = MultiBaasRegistry::new(Client::new(&server.uri(), "key").unwrap());
        let mut txn = registry.begin(&scope()).await.unwrap();

        let record = txn.version("counter", "1.0").await.unwrap().unwrap();
        assert_eq!(record.bytecode_hash, artifact().bytecode_hash());

        let binding = txn.binding("counter").await.unwrap().unwrap();
        assert_eq!(binding.address, COUNTER);

        let link = txn.link("counter", "counter", "1.0").await.unwrap().unwrap();
        assert_eq!(link.sync_cursor, 900);
        assert!(txn.link("counter", "counter", "1.1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_records_are_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(not_found()).mount(&server).await;

        let registry = MultiBaasRegistry::new(Client::new(&server.uri(), "key").unwrap());
        let mut txn = registry.begin(&scope()).await.unwrap();
        assert!(txn.version("counter", "1.0").await.unwrap().is_none());
        assert!(txn.versions("counter").await.unwrap().is_empty());
        assert!(txn.binding("counter").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_link_deletes_created_resources() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/contracts/counter"))
            .respond_with(ok(json!({ "label": "counter", "version": "1.0", "bin": "0x6080" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v0/chains/ethereum/addresses"))
            .respond_with(ok(json!({ "label": "counter", "address": COUNTER_HEX })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v0/chains/ethereum/addresses/counter/contracts"))
            .respond_with(server_error())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v0/chains/ethereum/addresses/counter"))
            .respond_with(ok(Value::Null))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v0/contracts/counter/1.0"))
            .respond_with(ok(Value::Null))
            .expect(1)
            .mount(&server)
            .await;

        let registry = MultiBaasRegistry::new(Client::new(&server.uri(), "key").unwrap());
        let txn = registry.begin(&scope()).await.unwrap();
        let mut changes = ChangeSet::new(artifact());
        changes.push(Change::CreateVersion(VersionRecord {
            contract_label: "counter".into(),
            version: "1.0".into(),
            bytecode_hash: B256::ZERO,
        }));
        changes.push(Change::CreateBinding(AddressBinding {
            address_label: "counter".into(),
            address: COUNTER,
        }));
        changes.push(Change::PutLink(LinkRecord {
            address_label: "counter".into(),
            contract_label: "counter".into(),
            version: "1.0".into(),
            address: COUNTER,
            sync_cursor: 900,
        }));

        let err = txn.commit(changes).await.unwrap_err();
        assert!(err.is_transport());
    }

    fn replacements() -> ChangeSet {
        let mut changes = ChangeSet::new(artifact());
        changes.push(Change::ReplaceVersion(VersionRecord {
            contract_label: "counter".into(),
            version: "1.0".into(),
            bytecode_hash: B256::ZERO,
        }));
        changes.push(Change::ReplaceBinding(AddressBinding {
            address_label: "counter".into(),
            address: COUNTER,
        }));
        changes
    }

    #[tokio::test]
    async fn overrides_delete_then_recreate() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v0/contracts/counter/1.0"))
            .respond_with(ok(Value::Null))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v0/contracts/counter"))
            .respond_with(ok(json!({ "label": "counter", "version": "1.0", "bin": "0x6080" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v0/chains/ethereum/addresses/counter"))
            .respond_with(ok(Value::Null))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v0/chains/ethereum/addresses"))
            .respond_with(ok(json!({ "label": "counter", "address": COUNTER_HEX })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v0/chains/ethereum/addresses/counter/contracts"))
            .respond_with(ok(Value::Null))
            .expect(1)
            .mount(&server)
            .await;

        let registry = MultiBaasRegistry::new(Client::new(&server.uri(), "key").unwrap());
        let txn = registry.begin(&scope()).await.unwrap();
        let mut changes = replacements();
        changes.push(Change::PutLink(LinkRecord {
            address_label: "counter".into(),
            contract_label: "counter".into(),
            version: "1.0".into(),
            address: COUNTER,
            sync_cursor: 900,
        }));
        txn.commit(changes).await.unwrap();
    }

    #[tokio::test]
    async fn failure_after_override_deletes_the_replacement() {
        let server = MockServer::start().await;
        // once for the override, once for the rollback
        Mock::given(method("DELETE"))
            .and(path("/api/v0/contracts/counter/1.0"))
            .respond_with(ok(Value::Null))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v0/contracts/counter"))
            .respond_with(ok(json!({ "label": "counter", "version": "1.0", "bin": "0x6080" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v0/chains/ethereum/addresses/counter"))
            .respond_with(server_error())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v0/chains/ethereum/addresses"))
            .respond_with(ok(json!({ "label": "counter", "address": COUNTER_HEX })))
            .expect(0)
            .mount(&server)
            .await;

        let registry = MultiBaasRegistry::new(Client::new(&server.uri(), "key").unwrap());
        let txn = registry.begin(&scope()).await.unwrap();
        let err = txn.commit(replacements()).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn address_owner_reads_label_by_hex() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/api/v0/chains/ethereum/addresses/{COUNTER_HEX}")))
            .respond_with(ok(json!({ "label": "legacy", "address": COUNTER_HEX })))
            .mount(&server)
            .await;
        let unlabeled = address!("0x00000000000000000000000000000000000000bb");
        let unlabeled_hex = format_address(&unlabeled);
        Mock::given(method("GET"))
            .and(path(format!("/api/v0/chains/ethereum/addresses/{unlabeled_hex}")))
            .respond_with(ok(json!({ "label": "", "address": unlabeled_hex })))
            .mount(&server)
            .await;

        let registry = MultiBaasRegistry::new(Client::new(&server.uri(), "key").unwrap());
        let mut txn = registry.begin(&scope()).await.unwrap();
        let owner = txn.address_owner(COUNTER).await.unwrap().unwrap();
        assert_eq!(owner.address_label, "legacy");
        assert!(txn.address_owner(unlabeled).await.unwrap().is_none());
        let unknown = address!("0x00000000000000000000000000000000000000cc");
        assert!(txn.address_owner(unknown).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn address_under_another_label_is_refused_before_any_write() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/api/v0/chains/ethereum/addresses/{COUNTER_HEX}")))
            .respond_with(ok(json!({ "label": "legacy", "address": COUNTER_HEX })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(not_found())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(server_error())
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(server_error())
            .expect(0)
            .mount(&server)
            .await;

        let registry = MultiBaasRegistry::new(Client::new(&server.uri(), "key").unwrap());
        let linker = Linker::new(registry, FixedHead(1000), LinkPolicy::default());
        let err = linker
            .link_contract(&artifact(), COUNTER, &LinkOptions::default())
            .await
            .unwrap_err();
        assert!(
            matches!(err, LinkError::AddressTaken { ref owner, .. } if owner == "legacy"),
            "{err}"
        );
        assert!(err.is_conflict());
    }
}
