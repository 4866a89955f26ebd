// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

pub mod address;
pub mod artifact;
pub mod block;
pub mod linking;
pub mod message;
pub mod multibaas;
pub mod options;
pub mod registry;
pub mod version;
