// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("from utf8 error: {0}")]
    FromUtf8(#[from] std::string::FromUtf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "{name} failed (exit code: {code:?}): {stderr}",
        name = .0.process_name,
        code = .0.exit_code,
        stderr = .0.stderr.trim(),
    )]
    CommandFailure(crate::core::message::ProcessOutput),

    #[error("{0}")]
    Options(#[from] crate::core::options::OptionsError),
    #[error("{0}")]
    Address(#[from] crate::core::address::AddressError),
    #[error("{0}")]
    Artifact(#[from] crate::core::artifact::ArtifactError),
    #[error("{0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("{0}")]
    Client(#[from] crate::core::multibaas::ClientError),
    #[error("{0}")]
    Link(#[from] crate::core::linking::LinkError),
}
