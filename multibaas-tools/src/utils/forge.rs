// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Queries against the local Foundry installation.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use serde::Deserialize;

use crate::core::message::ProcessOutput;

/// Artifact directory used by Forge when the project does not override it.
pub const DEFAULT_OUT_DIR: &str = "out";

#[derive(Debug, Deserialize)]
struct ForgeConfig {
    out: Option<String>,
}

/// Resolves the artifact directory of the Foundry project rooted at `root` by running
/// `forge config --json`.
pub fn out_dir(root: impl AsRef<Path>) -> crate::Result<PathBuf> {
    let root = root.as_ref();
    debug!(@grey, "running forge config in {}", root.display());
    let output = Command::new("forge")
        .args(["config", "--json"])
        .current_dir(root)
        .output()?;
    let stdout = ProcessOutput::check("forge", output)?;
    Ok(root.join(parse_out_dir(&stdout)?))
}

fn parse_out_dir(config_json: &str) -> Result<String, serde_json::Error> {
    let config: ForgeConfig = serde_json::from_str(config_json)?;
    Ok(config.out.unwrap_or_else(|| DEFAULT_OUT_DIR.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_dir_from_config() {
        let json = r#"{"src":"src","out":"artifacts","libs":["lib"]}"#;
        assert_eq!(parse_out_dir(json).unwrap(), "artifacts");
    }

    #[test]
    fn out_dir_defaults() {
        assert_eq!(parse_out_dir(r#"{"src":"src"}"#).unwrap(), DEFAULT_OUT_DIR);
        assert!(parse_out_dir("not json").is_err());
    }
}
