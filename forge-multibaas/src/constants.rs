// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

/// Seconds to wait for a MultiBaas response.
pub const DEFAULT_TIMEOUT_SECS: &str = "30";

/// Foundry project root used to locate build output.
pub const DEFAULT_PROJECT_ROOT: &str = ".";
