// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Minimal client for the MultiBaas REST API.
//!
//! Every endpoint lives under `{url}/api/v0/` and answers with an envelope
//! `{"status": .., "message": .., "result": ..}`. A call only succeeds when the HTTP status is 2xx
//! and `message` is `"success"`; the unwrapped `result` is returned.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::core::{
    artifact::ContractArtifact,
    block::{BlockError, BlockSource},
};

pub const API_PREFIX: &str = "api/v0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Chain name used in MultiBaas address routes.
const CHAIN: &str = "ethereum";

#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Client {
    pub fn new(url: &str, api_key: &str) -> Result<Self, ClientError> {
        Self::with_timeout(url, api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: &str, api_key: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{API_PREFIX}/{}",
            self.base_url,
            path.trim_start_matches('/')
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        debug!(@grey, "{} {}", method, self.url(path));
        let mut request = self
            .http
            .request(method, self.url(path))
            .bearer_auth(&self.api_key);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let transport = |source| ClientError::Transport {
            path: path.to_owned(),
            source,
        };
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let text = response.text().await.map_err(transport)?;
        let envelope: Envelope = serde_json::from_str(&text).unwrap_or_else(|_| Envelope {
            message: status
                .canonical_reason()
                .unwrap_or("unreadable response")
                .to_owned(),
            result: Value::Null,
        });

        if !status.is_success() || envelope.message != "success" {
            let status = if status == StatusCode::OK {
                None
            } else {
                Some(status.as_u16())
            };
            return Err(ClientError::Api {
                path: path.to_owned(),
                status,
                message: envelope.message,
            });
        }
        serde_json::from_value(envelope.result).map_err(|source| ClientError::Decode {
            path: path.to_owned(),
            source,
        })
    }

    /// Fetches the user owning the API key; used to validate credentials up front.
    pub async fn current_user(&self) -> Result<Value, ClientError> {
        let user: Value = self.send(Method::GET, "currentuser", None).await?;
        if user.is_null() {
            return Err(ClientError::Api {
                path: "currentuser".to_owned(),
                status: None,
                message: "no user associated with the API key".to_owned(),
            });
        }
        Ok(user)
    }

    pub async fn get_contract(
        &self,
        label: &str,
        version: &str,
    ) -> Result<Option<ContractInfo>, ClientError> {
        optional(
            self.send(Method::GET, &format!("contracts/{label}/{version}"), None)
                .await,
        )
    }

    /// Fetches the most recent version uploaded under `label`.
    pub async fn get_latest_contract(
        &self,
        label: &str,
    ) -> Result<Option<ContractInfo>, ClientError> {
        optional(self.send(Method::GET, &format!("contracts/{label}"), None).await)
    }

    pub async fn create_contract(
        &self,
        label: &str,
        version: &str,
        artifact: &ContractArtifact,
    ) -> Result<ContractInfo, ClientError> {
        let payload = CreateContract {
            label,
            language: "solidity",
            bin: artifact.bytecode_hex(),
            raw_abi: artifact.abi().to_string(),
            contract_name: artifact.name(),
            developer_doc: artifact.developer_doc().to_string(),
            user_doc: artifact.user_doc().to_string(),
            version,
        };
        let body = serde_json::to_value(payload).map_err(|source| ClientError::Decode {
            path: format!("contracts/{label}"),
            source,
        })?;
        self.send(Method::POST, &format!("contracts/{label}"), Some(body))
            .await
    }

    pub async fn delete_contract(&self, label: &str, version: &str) -> Result<(), ClientError> {
        self.send::<Value>(Method::DELETE, &format!("contracts/{label}/{version}"), None)
            .await
            .map(drop)
    }

    /// Looks up an address by label or by hex address.
    pub async fn get_address(
        &self,
        label_or_address: &str,
    ) -> Result<Option<AddressInfo>, ClientError> {
        optional(
            self.send(
                Method::GET,
                &format!("chains/{CHAIN}/addresses/{label_or_address}"),
                None,
            )
            .await,
        )
    }

    pub async fn create_address(
        &self,
        label: &str,
        address: &str,
    ) -> Result<AddressInfo, ClientError> {
        let body = serde_json::json!({ "address": address, "label": label });
        self.send(Method::POST, &format!("chains/{CHAIN}/addresses"), Some(body))
            .await
    }

    pub async fn delete_address(&self, label: &str) -> Result<(), ClientError> {
        self.send::<Value>(
            Method::DELETE,
            &format!("chains/{CHAIN}/addresses/{label}"),
            None,
        )
        .await
        .map(drop)
    }

    /// Attaches a contract version to an address label, syncing events from `starting_block`.
    pub async fn link_contract(
        &self,
        address_label: &str,
        contract_label: &str,
        version: &str,
        starting_block: u64,
    ) -> Result<(), ClientError> {
        let body = serde_json::json!({
            "label": contract_label,
            "version": version,
            "startingBlock": starting_block.to_string(),
        });
        self.send::<Value>(
            Method::POST,
            &format!("chains/{CHAIN}/addresses/{address_label}/contracts"),
            Some(body),
        )
        .await
        .map(drop)
    }

    pub async fn chain_status(&self) -> Result<ChainStatus, ClientError> {
        self.send(Method::GET, &format!("chains/{CHAIN}/status"), None)
            .await
    }
}

impl BlockSource for Client {
    async fn block_number(&self) -> Result<u64, BlockError> {
        self.chain_status()
            .await
            .map(|status| status.block_number)
            .map_err(|e| BlockError::Unavailable(e.to_string()))
    }
}

/// Maps a 404 to `None`.
fn optional<T>(result: Result<T, ClientError>) -> Result<Option<T>, ClientError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateContract<'a> {
    label: &'a str,
    language: &'a str,
    bin: String,
    raw_abi: String,
    contract_name: &'a str,
    developer_doc: String,
    #[serde(rename = "userdoc")]
    user_doc: String,
    version: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub label: String,
    pub version: String,
    #[serde(default)]
    pub contract_name: String,
    #[serde(default)]
    pub bin: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    pub address: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub contracts: Vec<LinkedContract>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedContract {
    pub label: String,
    pub version: String,
    #[serde(default)]
    pub starting_block: Option<Value>,
}

impl LinkedContract {
    /// The block event sync started from, when MultiBaas reports a concrete number.
    pub fn sync_cursor(&self) -> Option<u64> {
        match self.starting_block.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatus {
    pub block_number: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(reqwest::Error),
    #[error("MultiBaas request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(
        "MultiBaas API error [{}] while calling {path}: {message}",
        .status.map_or_else(|| "200".to_owned(), |s| s.to_string())
    )]
    Api {
        path: String,
        status: Option<u16>,
        message: String,
    },
    #[error("unexpected MultiBaas response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: Some(404), .. })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{bearer_token, body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn ok(result: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "message": "success",
            "result": result,
        }))
    }

    fn not_found() -> ResponseTemplate {
        ResponseTemplate::new(404).set_body_json(json!({
            "status": 404,
            "message": "not found",
        }))
    }

    #[tokio::test]
    async fn unwraps_success_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v0/currentuser"))
            .and(bearer_token("secret"))
            .respond_with(ok(json!({ "id": 1, "email": "dev@example.com" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(&format!("{}/", server.uri()), "secret").unwrap();
        assert_eq!(client.base_url(), server.uri());
        let user = client.current_user().await.unwrap();
        assert_eq!(user["id"], 1);
    }

    #[tokio::test]
    async fn not_found_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v0/contracts/counter/1.0"))
            .respond_with(not_found())
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), "key").unwrap();
        assert!(client.get_contract("counter", "1.0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_success_message_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v0/currentuser"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "message": "token expired",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v0/chains/ethereum/status"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), "key").unwrap();
        let err = client.current_user().await.unwrap_err();
        assert!(matches!(
            &err,
            ClientError::Api { message, status: None, .. } if message == "token expired"
        ));
        assert!(!err.is_not_found());

        let err = client.chain_status().await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: Some(500), .. }));
    }

    #[tokio::test]
    async fn creates_contract_with_artifact_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/contracts/counter"))
            .and(body_json(json!({
                "label": "counter",
                "language": "solidity",
                "bin": "0x6080",
                "rawAbi": "[]",
                "contractName": "Counter",
                "developerDoc": "{}",
                "userdoc": "{}",
                "version": "1.0",
            })))
            .respond_with(ok(json!({
                "label": "counter",
                "version": "1.0",
                "contractName": "Counter",
                "bin": "0x6080",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), "key").unwrap();
        let artifact = ContractArtifact::new("Counter", vec![0x60, 0x80]);
        let created = client
            .create_contract("counter", "1.0", &artifact)
            .await
            .unwrap();
        assert_eq!(created.version, "1.0");
    }

    #[tokio::test]
    async fn links_and_reads_chain_head() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/chains/ethereum/addresses/counter/contracts"))
            .and(body_json(json!({
                "label": "counter",
                "version": "1.0",
                "startingBlock": "900",
            })))
            .respond_with(ok(Value::Null))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v0/chains/ethereum/status"))
            .respond_with(ok(json!({ "chainID": 1, "blockNumber": 1000 })))
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), "key").unwrap();
        client.link_contract("counter", "counter", "1.0", 900).await.unwrap();
        assert_eq!(client.block_number().await.unwrap(), 1000);
    }

    #[test]
    fn linked_contract_cursor_formats() {
        let parse = |v: Value| -> LinkedContract { serde_json::from_value(v).unwrap() };
        assert_eq!(
            parse(json!({"label":"a","version":"1","startingBlock":900})).sync_cursor(),
            Some(900)
        );
        assert_eq!(
            parse(json!({"label":"a","version":"1","startingBlock":"900"})).sync_cursor(),
            Some(900)
        );
        assert_eq!(
            parse(json!({"label":"a","version":"1","startingBlock":"-100"})).sync_cursor(),
            None
        );
        assert_eq!(parse(json!({"label":"a","version":"1"})).sync_cursor(), None);
    }
}
