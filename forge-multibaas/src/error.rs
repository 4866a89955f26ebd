// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::fmt;
use std::process::ExitCode;

use multibaas_tools::core::{block::BlockError, options::OptionsError};

pub type ForgeMultiBaasResult = Result<(), ForgeMultiBaasError>;

#[derive(Debug)]
pub struct ForgeMultiBaasError {
    error: eyre::Error,
    exit_code: ExitCode,
}

impl ForgeMultiBaasError {
    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }
}

impl fmt::Display for ForgeMultiBaasError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl From<std::io::Error> for ForgeMultiBaasError {
    fn from(err: std::io::Error) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<eyre::Error> for ForgeMultiBaasError {
    fn from(error: eyre::Error) -> Self {
        Self {
            error,
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<multibaas_tools::Error> for ForgeMultiBaasError {
    fn from(err: multibaas_tools::Error) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<OptionsError> for ForgeMultiBaasError {
    fn from(err: OptionsError) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<BlockError> for ForgeMultiBaasError {
    fn from(err: BlockError) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}
