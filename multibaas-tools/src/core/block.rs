// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Starting block specifiers and the chain head they are resolved against.

use std::{fmt, str::FromStr};

use alloy::providers::{Provider, ProviderBuilder};

/// Blocks behind the chain head that event sync starts from when no starting block is given.
pub const DEFAULT_BLOCKS_BEHIND: u64 = 100;

/// Where event ingestion for a newly linked contract begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartingBlock {
    /// The chain head at link time.
    Latest,
    /// This many blocks behind the chain head, floored at genesis.
    Relative(u64),
    /// A fixed block number.
    Absolute(u64),
}

impl Default for StartingBlock {
    fn default() -> Self {
        Self::Relative(DEFAULT_BLOCKS_BEHIND)
    }
}

impl StartingBlock {
    /// Parses the option value: empty for the default, `latest`, `-N` or `N`.
    pub fn parse(text: &str) -> Result<Self, BlockError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        if trimmed.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(behind) => (true, behind),
            None => (false, trimmed),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BlockError::InvalidStartingBlock(text.to_owned()));
        }
        match (negative, digits.parse::<u64>()) {
            (true, Ok(behind)) => Ok(Self::Relative(behind)),
            // further back than any chain reaches, floors at genesis
            (true, Err(_)) => Ok(Self::Relative(u64::MAX)),
            (false, Ok(block)) => Ok(Self::Absolute(block)),
            (false, Err(_)) => Err(BlockError::InvalidStartingBlock(text.to_owned())),
        }
    }

    /// Resolves to a block number given the current chain head.
    pub fn resolve(self, head: u64) -> Result<u64, BlockError> {
        match self {
            Self::Latest => Ok(head),
            Self::Relative(behind) => Ok(head.saturating_sub(behind)),
            Self::Absolute(block) if block > head => {
                Err(BlockError::BeyondHead { block, head })
            }
            Self::Absolute(block) => Ok(block),
        }
    }
}

impl FromStr for StartingBlock {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StartingBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Relative(behind) => write!(f, "-{behind}"),
            Self::Absolute(block) => write!(f, "{block}"),
        }
    }
}

/// Source of the current chain head.
#[allow(async_fn_in_trait)]
pub trait BlockSource {
    async fn block_number(&self) -> Result<u64, BlockError>;
}

/// A chain head that never moves.
#[derive(Clone, Copy, Debug)]
pub struct FixedHead(pub u64);

impl BlockSource for FixedHead {
    async fn block_number(&self) -> Result<u64, BlockError> {
        Ok(self.0)
    }
}

/// Reads the chain head from a JSON-RPC endpoint.
#[derive(Clone, Debug)]
pub struct RpcBlockSource<P> {
    provider: P,
}

impl RpcBlockSource<()> {
    pub fn connect_http(url: &str) -> Result<RpcBlockSource<impl Provider + Clone>, BlockError> {
        let url = url
            .parse::<alloy::transports::http::reqwest::Url>()
            .map_err(|e| BlockError::Unavailable(format!("invalid RPC url {url:?}: {e}")))?;
        Ok(RpcBlockSource {
            provider: ProviderBuilder::new().connect_http(url),
        })
    }
}

impl<P: Provider> RpcBlockSource<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: Provider> BlockSource for RpcBlockSource<P> {
    async fn block_number(&self) -> Result<u64, BlockError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| BlockError::Unavailable(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error("invalid starting block {0:?}: expected \"latest\", a block number or a negative offset")]
    InvalidStartingBlock(String),
    #[error("starting block {block} is beyond the current chain head {head}")]
    BeyondHead { block: u64, head: u64 },
    #[error("failed to read chain head: {0}")]
    Unavailable(String),
}
