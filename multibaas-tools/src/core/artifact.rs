// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Compiled contract artifacts as written by `forge build`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::{keccak256, Bytes, B256};
use serde::Deserialize;
use serde_json::{json, Value};

/// One compiled contract: its code and interface.
///
/// The bytecode is opaque; two artifacts are the same version exactly when their
/// [`bytecode_hash`](Self::bytecode_hash) matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractArtifact {
    name: String,
    bytecode: Bytes,
    abi: Value,
    developer_doc: Value,
    user_doc: Value,
}

impl ContractArtifact {
    pub fn new(name: impl Into<String>, bytecode: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytecode: bytecode.into(),
            abi: json!([]),
            developer_doc: json!({}),
            user_doc: json!({}),
        }
    }

    /// Path of the artifact for `name` inside a Forge output directory.
    pub fn path(out_dir: impl AsRef<Path>, name: &str) -> PathBuf {
        out_dir
            .as_ref()
            .join(format!("{name}.sol"))
            .join(format!("{name}.json"))
    }

    /// Loads `<out>/<Name>.sol/<Name>.json`.
    pub fn load(out_dir: impl AsRef<Path>, name: &str) -> Result<Self, ArtifactError> {
        let path = Self::path(out_dir, name);
        let contents = fs::read_to_string(&path).map_err(|e| ArtifactError::Read(path.clone(), e))?;
        Self::from_json(name, &contents).map_err(|e| match e {
            ArtifactError::Json(_, err) => ArtifactError::Json(path, err),
            other => other,
        })
    }

    pub fn from_json(name: &str, contents: &str) -> Result<Self, ArtifactError> {
        let raw: RawArtifact = serde_json::from_str(contents)
            .map_err(|e| ArtifactError::Json(PathBuf::from(name), e))?;
        let bytecode = match raw.bytecode {
            RawBytecode::Hex(hex) | RawBytecode::Object { object: hex } => hex,
        };
        let digits = bytecode.strip_prefix("0x").unwrap_or(&bytecode);
        if digits.is_empty() {
            return Err(ArtifactError::EmptyBytecode(name.to_owned()));
        }
        let bytecode =
            hex::decode(digits).map_err(|e| ArtifactError::InvalidBytecode(name.to_owned(), e))?;
        let output = raw.metadata.and_then(|m| m.output);
        let (developer_doc, user_doc) = match output {
            Some(output) => (output.devdoc, output.userdoc),
            None => (json!({}), json!({})),
        };
        Ok(Self {
            name: name.to_owned(),
            bytecode: bytecode.into(),
            abi: raw.abi,
            developer_doc,
            user_doc,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Bytecode as `0x`-prefixed lowercase hex, the form MultiBaas stores as `bin`.
    pub fn bytecode_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.bytecode))
    }

    pub fn bytecode_hash(&self) -> B256 {
        keccak256(&self.bytecode)
    }

    pub fn abi(&self) -> &Value {
        &self.abi
    }

    pub fn developer_doc(&self) -> &Value {
        &self.developer_doc
    }

    pub fn user_doc(&self) -> &Value {
        &self.user_doc
    }
}

#[derive(Deserialize)]
struct RawArtifact {
    #[serde(default)]
    abi: Value,
    bytecode: RawBytecode,
    metadata: Option<RawMetadata>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(String),
    Object { object: String },
}

#[derive(Deserialize)]
struct RawMetadata {
    output: Option<RawOutput>,
}

#[derive(Deserialize)]
struct RawOutput {
    #[serde(default = "empty_object")]
    devdoc: Value,
    #[serde(default = "empty_object")]
    userdoc: Value,
}

fn empty_object() -> Value {
    json!({})
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {1}", path = .0.display())]
    Read(PathBuf, std::io::Error),
    #[error("invalid artifact {path}: {1}", path = .0.display())]
    Json(PathBuf, serde_json::Error),
    #[error("artifact for {0} has no bytecode (abstract contract or interface?)")]
    EmptyBytecode(String),
    #[error("artifact for {0} has invalid bytecode: {1}")]
    InvalidBytecode(String, hex::FromHexError),
}
