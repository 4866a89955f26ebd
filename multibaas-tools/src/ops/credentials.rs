// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use serde_json::Value;

use crate::core::multibaas::Client;

/// Validates the client's API key against the deployment, returning the authenticated user.
pub async fn check_credentials(client: &Client) -> crate::Result<Value> {
    let user = client.current_user().await?;
    let who = user
        .get("email")
        .or_else(|| user.get("username"))
        .and_then(Value::as_str)
        .unwrap_or("unknown user");
    info!(@grey, "authenticated to {} as {}", client.base_url(), who.mint());
    Ok(user)
}
