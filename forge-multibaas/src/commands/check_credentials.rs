// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use multibaas_tools::{ops, LinkPolicy};

use crate::{
    common_args::{MultiBaasArgs, OutputArgs},
    error::ForgeMultiBaasResult,
};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[command(flatten)]
    multibaas: MultiBaasArgs,
    #[command(flatten)]
    output: OutputArgs,
}

pub async fn exec(args: Args) -> ForgeMultiBaasResult {
    let client = args.multibaas.config(LinkPolicy::default()).client()?;
    let user = ops::check_credentials(&client).await?;
    args.output.print_json(&user)?;
    Ok(())
}
