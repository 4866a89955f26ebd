// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Link options as exchanged with the deployment script.
//!
//! The script serializes four string fields into a fixed-shape JSON object:
//!
//! ```text
//! {"contractLabel":"<s>","addressLabel":"<s>","contractVersion":"<s>","startingBlock":"<s>"}
//! ```
//!
//! All four keys are always present in this order and an empty string means "use the default".
//! The encoder does no escaping, so field values are validated instead: quotes, backslashes and
//! control characters are rejected.

use serde::{Deserialize, Serialize};

/// Wire names of the option fields, in encoding order.
pub const FIELDS: [&str; 4] = [
    "contractLabel",
    "addressLabel",
    "contractVersion",
    "startingBlock",
];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkOptions {
    pub contract_label: String,
    pub address_label: String,
    pub contract_version: String,
    pub starting_block: String,
}

impl LinkOptions {
    pub fn new(
        contract_label: impl Into<String>,
        address_label: impl Into<String>,
        contract_version: impl Into<String>,
        starting_block: impl Into<String>,
    ) -> Self {
        Self {
            contract_label: contract_label.into(),
            address_label: address_label.into(),
            contract_version: contract_version.into(),
            starting_block: starting_block.into(),
        }
    }

    pub fn contract_label(&self) -> Option<&str> {
        non_empty(&self.contract_label)
    }

    pub fn address_label(&self) -> Option<&str> {
        non_empty(&self.address_label)
    }

    pub fn contract_version(&self) -> Option<&str> {
        non_empty(&self.contract_version)
    }

    pub fn starting_block(&self) -> Option<&str> {
        non_empty(&self.starting_block)
    }

    fn values(&self) -> [&str; 4] {
        [
            &self.contract_label,
            &self.address_label,
            &self.contract_version,
            &self.starting_block,
        ]
    }

    /// Rejects field values that would break the textual encoding.
    pub fn validate(&self) -> Result<(), OptionsError> {
        for (field, value) in FIELDS.into_iter().zip(self.values()) {
            if let Some(ch) = value
                .chars()
                .find(|c| *c == '"' || *c == '\\' || c.is_control())
            {
                return Err(OptionsError::StructuralCharacter { field, ch });
            }
        }
        Ok(())
    }

    /// Encodes the options into the fixed-shape blob passed to the linking backend.
    pub fn encode(&self) -> Result<String, OptionsError> {
        self.validate()?;
        let body = FIELDS
            .iter()
            .zip(self.values())
            .map(|(field, value)| format!("\"{field}\":\"{value}\""))
            .collect::<Vec<_>>()
            .join(",");
        Ok(format!("{{{body}}}"))
    }

    /// Decodes an options blob. Unknown keys are ignored and missing keys read as empty.
    pub fn decode(bytes: impl AsRef<[u8]>) -> Result<Self, OptionsError> {
        let bytes = bytes.as_ref();
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let options: Self = serde_json::from_slice(bytes)?;
        options.validate()?;
        Ok(options)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("option {field} contains the structural character {ch:?}")]
    StructuralCharacter { field: &'static str, ch: char },
    #[error("malformed options: {0}")]
    Malformed(#[from] serde_json::Error),
}
