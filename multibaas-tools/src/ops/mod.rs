// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

pub use credentials::check_credentials;
pub use link::{link_client, link_contract, load_artifact};

mod credentials;
mod link;
