// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Tools for registering Forge-built contracts and their deployments with MultiBaas.
#![doc = include_str!("../../README.md")]

#[macro_use]
mod macros;

pub mod config;
pub mod core;
pub(crate) mod error;
pub mod ops;
pub mod utils;

pub use config::Config;
pub use crate::core::{
    linking::{LinkError, LinkOutcome, LinkPolicy, Linker},
    options::LinkOptions,
};
pub use error::{Error, Result};
