// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Canonical rendering of deployed addresses.
//!
//! MultiBaas keys addresses by their lowercase hex form, while Solidity scripts usually hand over
//! checksummed strings. Everything entering the linker goes through [`parse_address`] and
//! everything leaving it through [`format_address`].

use alloy::primitives::Address;

/// Renders `0x` followed by 40 lowercase hex characters, most significant byte first.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

/// Parses a `0x`-prefixed, 40 hex digit address in any letter case.
pub fn parse_address(text: &str) -> Result<Address, AddressError> {
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| AddressError::MissingPrefix(text.to_owned()))?;
    if digits.len() != 40 {
        return Err(AddressError::Length(text.to_owned()));
    }
    let bytes = hex::decode(digits).map_err(|_| AddressError::InvalidHex(text.to_owned()))?;
    Ok(Address::from_slice(&bytes))
}

#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("address {0:?} must start with 0x")]
    MissingPrefix(String),
    #[error("address {0:?} must have exactly 40 hex digits")]
    Length(String),
    #[error("address {0:?} is not valid hex")]
    InvalidHex(String),
}
