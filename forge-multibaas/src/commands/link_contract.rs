// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::path::PathBuf;

use multibaas_tools::{
    core::{
        artifact::ContractArtifact,
        block::{BlockSource, FixedHead, RpcBlockSource},
        registry::{FileRegistry, MultiBaasRegistry, Registry},
    },
    ops, Config, LinkOutcome, Linker,
};

use crate::{
    common_args::{BackendArgs, MultiBaasArgs, OutputArgs, PolicyArgs},
    constants::DEFAULT_PROJECT_ROOT,
    error::{ForgeMultiBaasError, ForgeMultiBaasResult},
};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Contract name, as compiled by forge (e.g. `Counter`)
    name: String,
    /// Address the contract is deployed at
    address: String,
    /// Options blob produced by the deployment script
    #[arg(default_value = "")]
    options: String,
    /// Forge output directory (defaults to the `out` setting of `forge config`)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Foundry project root
    #[arg(long, default_value = DEFAULT_PROJECT_ROOT)]
    root: PathBuf,

    #[command(flatten)]
    backend: BackendArgs,
    #[command(flatten)]
    multibaas: MultiBaasArgs,
    #[command(flatten)]
    policy: PolicyArgs,
    #[command(flatten)]
    output: OutputArgs,
}

pub async fn exec(args: Args) -> ForgeMultiBaasResult {
    let config = args.multibaas.config(args.policy.policy());
    let artifact = ops::load_artifact(&args.name, args.out.as_deref(), &args.root)?;

    let outcome = match &args.backend.ledger {
        Some(path) => link_with(FileRegistry::new(path), &args, &config, &artifact).await?,
        None => {
            let client = ops::link_client(&config)?;
            ops::check_credentials(&client).await?;
            link_with(MultiBaasRegistry::new(client), &args, &config, &artifact).await?
        }
    };
    args.output.print_outcome(&outcome)?;
    Ok(())
}

/// Picks the chain head source for `registry`.
async fn link_with<R: Registry>(
    registry: R,
    args: &Args,
    config: &Config,
    artifact: &ContractArtifact,
) -> Result<LinkOutcome, ForgeMultiBaasError> {
    if let Some(head) = args.backend.chain_head {
        link(registry, FixedHead(head), args, config, artifact).await
    } else if let Some(url) = &args.backend.rpc_url {
        let blocks = RpcBlockSource::<()>::connect_http(url)?;
        link(registry, blocks, args, config, artifact).await
    } else {
        link(registry, ops::link_client(config)?, args, config, artifact).await
    }
}

async fn link<R: Registry, B: BlockSource>(
    registry: R,
    blocks: B,
    args: &Args,
    config: &Config,
    artifact: &ContractArtifact,
) -> Result<LinkOutcome, ForgeMultiBaasError> {
    let linker = Linker::new(registry, blocks, config.policy());
    Ok(ops::link_contract(&linker, artifact, &args.address, &args.options).await?)
}
