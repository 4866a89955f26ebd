// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::{path::PathBuf, time::Duration};

use multibaas_tools::{
    config::{ALLOW_UPDATE_ADDRESS_VAR, ALLOW_UPDATE_CONTRACT_VAR, API_KEY_VAR, URL_VAR},
    Config, LinkOutcome, LinkPolicy,
};

use crate::{constants::DEFAULT_TIMEOUT_SECS, utils::env_flag};

#[derive(Debug, clap::Args)]
pub struct MultiBaasArgs {
    /// MultiBaas deployment URL
    #[arg(long, env = URL_VAR)]
    url: Option<String>,
    /// MultiBaas API key
    #[arg(long, env = API_KEY_VAR, hide_env_values = true)]
    api_key: Option<String>,
    /// Seconds to wait for each MultiBaas request
    #[arg(long, default_value = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
}

impl MultiBaasArgs {
    pub fn config(&self, policy: LinkPolicy) -> Config {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());
        Config::builder()
            .url(non_empty(&self.url))
            .api_key(non_empty(&self.api_key))
            .policy(policy)
            .timeout(Duration::from_secs(self.timeout))
            .build()
    }
}

#[derive(Debug, clap::Args)]
pub struct PolicyArgs {
    /// Allow replacing the bytecode stored under an existing contract version
    #[arg(
        long,
        env = ALLOW_UPDATE_CONTRACT_VAR,
        action = clap::ArgAction::SetTrue,
        value_parser = env_flag
    )]
    allow_update_contract: bool,
    /// Allow pointing an existing address label at a different address
    #[arg(
        long,
        env = ALLOW_UPDATE_ADDRESS_VAR,
        action = clap::ArgAction::SetTrue,
        value_parser = env_flag
    )]
    allow_update_address: bool,
}

impl PolicyArgs {
    pub fn policy(&self) -> LinkPolicy {
        LinkPolicy {
            allow_update_contract: self.allow_update_contract,
            allow_update_address: self.allow_update_address,
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct BackendArgs {
    /// Record links in a local JSON ledger instead of MultiBaas
    #[arg(long)]
    pub ledger: Option<PathBuf>,
    /// Read the chain head from this JSON-RPC endpoint instead of MultiBaas
    #[arg(long, conflicts_with = "chain_head")]
    pub rpc_url: Option<String>,
    /// Use a fixed chain head
    #[arg(long)]
    pub chain_head: Option<u64>,
}

#[derive(Debug, clap::Args)]
pub struct OutputArgs {
    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

impl OutputArgs {
    pub fn print_outcome(&self, outcome: &LinkOutcome) -> eyre::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(outcome)?);
        } else {
            println!("{outcome}");
        }
        Ok(())
    }

    pub fn print_json(&self, value: &serde_json::Value) -> eyre::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(value)?);
        }
        Ok(())
    }
}
