// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Linking a Forge build output to a deployed address.

use std::path::Path;

use crate::{
    config::Config,
    core::{
        address::parse_address,
        artifact::ContractArtifact,
        block::BlockSource,
        linking::{LinkError, LinkOutcome, Linker},
        multibaas::Client,
        options::LinkOptions,
        registry::Registry,
    },
    utils::{color::DebugColor, forge},
};

/// Loads `name` from `out_dir`, or from the output directory `forge config` reports for
/// `project_root`.
pub fn load_artifact(
    name: &str,
    out_dir: Option<&Path>,
    project_root: impl AsRef<Path>,
) -> crate::Result<ContractArtifact> {
    let out_dir = match out_dir {
        Some(dir) => dir.to_owned(),
        None => forge::out_dir(project_root)?,
    };
    debug!(@grey, "loading {} from {}", name, out_dir.display());
    Ok(ContractArtifact::load(&out_dir, name)?)
}

/// Links an artifact at the address and encoded options received from a deployment script.
pub async fn link_contract<R: Registry, B: BlockSource>(
    linker: &Linker<R, B>,
    artifact: &ContractArtifact,
    address: &str,
    encoded_options: &str,
) -> crate::Result<LinkOutcome> {
    let address = parse_address(address)?;
    let options = LinkOptions::decode(encoded_options)?;
    debug!(@grey, "link options {}", options.debug_lavender());
    let outcome = linker.link_contract(artifact, address, &options).await?;
    info!(@grey, "{}", outcome);
    Ok(outcome)
}

/// MultiBaas client for linking; missing credentials fail the link before any request.
pub fn link_client(config: &Config) -> crate::Result<Client> {
    let (url, api_key) = config.credentials().map_err(LinkError::from)?;
    Ok(Client::with_timeout(url, api_key, config.timeout())?)
}
