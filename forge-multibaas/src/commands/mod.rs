// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use crate::error::ForgeMultiBaasResult;

mod check_credentials;
mod encode_options;
mod link_contract;

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Upload a compiled contract and link it to a deployed address
    #[clap(visible_alias = "linkContract")]
    LinkContract(link_contract::Args),
    /// Print the options blob a deployment script passes to link-contract
    EncodeOptions(encode_options::Args),
    /// Validate the configured MultiBaas API key
    CheckCredentials(check_credentials::Args),
}

pub async fn exec(cmd: Command) -> ForgeMultiBaasResult {
    match cmd {
        Command::LinkContract(args) => link_contract::exec(args).await,
        Command::EncodeOptions(args) => encode_options::exec(args),
        Command::CheckCredentials(args) => check_credentials::exec(args).await,
    }
}
