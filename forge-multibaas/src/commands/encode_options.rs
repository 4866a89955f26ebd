// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use multibaas_tools::LinkOptions;

use crate::error::ForgeMultiBaasResult;

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Label to upload the contract under (defaults to the lowercased contract name)
    #[arg(long, default_value = "")]
    contract_label: String,
    /// Label for the deployed address (defaults to the lowercased contract name)
    #[arg(long, default_value = "")]
    address_label: String,
    /// Contract version (defaults to an existing or newly minted version)
    #[arg(long, default_value = "")]
    contract_version: String,
    /// Block to start syncing events from: `latest`, `N` or `-N` (defaults to `-100`)
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    starting_block: String,
}

pub fn exec(args: Args) -> ForgeMultiBaasResult {
    let options = LinkOptions::new(
        args.contract_label,
        args.address_label,
        args.contract_version,
        args.starting_block,
    );
    println!("{}", options.encode()?);
    Ok(())
}
