// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! MultiBaas connection settings and update safeguards.

use std::{env, time::Duration};

use typed_builder::TypedBuilder;

use crate::{
    core::{
        linking::LinkPolicy,
        multibaas::{Client, DEFAULT_TIMEOUT},
    },
    utils::parse_flag,
};

pub const URL_VAR: &str = "MULTIBAAS_URL";
pub const API_KEY_VAR: &str = "MULTIBAAS_API_KEY";
pub const ALLOW_UPDATE_CONTRACT_VAR: &str = "MULTIBAAS_ALLOW_UPDATE_CONTRACT";
pub const ALLOW_UPDATE_ADDRESS_VAR: &str = "MULTIBAAS_ALLOW_UPDATE_ADDRESS";

/// Defines how to reach MultiBaas and which overrides a link may apply.
/// Build one with [`Config::builder`] or read it from the environment with [`Config::from_env`].
#[derive(Clone, Debug, PartialEq, Eq, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
pub struct Config {
    url: Option<String>,

    api_key: Option<String>,

    policy: LinkPolicy,

    #[builder(default = DEFAULT_TIMEOUT)]
    timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Reads settings through `lookup`; empty values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let flag = |name: &str| var(name).is_some_and(|value| parse_flag(&value));
        Self {
            url: var(URL_VAR),
            api_key: var(API_KEY_VAR),
            policy: LinkPolicy {
                allow_update_contract: flag(ALLOW_UPDATE_CONTRACT_VAR),
                allow_update_address: flag(ALLOW_UPDATE_ADDRESS_VAR),
            },
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Deployment URL without a trailing slash.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(|url| url.trim_end_matches('/'))
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn policy(&self) -> LinkPolicy {
        self.policy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// URL and API key, failing on whichever is missing first.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let url = self.url().ok_or(ConfigError::MissingCredential { variable: URL_VAR })?;
        let api_key = self
            .api_key()
            .ok_or(ConfigError::MissingCredential { variable: API_KEY_VAR })?;
        Ok((url, api_key))
    }

    /// Builds a MultiBaas client; fails before any network call when credentials are missing.
    pub fn client(&self) -> crate::Result<Client> {
        let (url, api_key) = self.credentials()?;
        Ok(Client::with_timeout(url, api_key, self.timeout)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing credential: {variable} is not set")]
    MissingCredential { variable: &'static str },
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_map(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn reads_variables() {
        let config = from_map(&[
            (URL_VAR, "https://example.multibaas.com/"),
            (API_KEY_VAR, "secret"),
            (ALLOW_UPDATE_CONTRACT_VAR, "TRUE"),
            (ALLOW_UPDATE_ADDRESS_VAR, "0"),
        ]);
        assert_eq!(config.url(), Some("https://example.multibaas.com"));
        assert_eq!(config.credentials().unwrap(), ("https://example.multibaas.com", "secret"));
        assert_eq!(
            config.policy(),
            LinkPolicy {
                allow_update_contract: true,
                allow_update_address: false,
            }
        );
    }

    #[test]
    fn missing_credentials() {
        let cases = vec![
            (vec![], URL_VAR),
            (vec![(URL_VAR, "http://localhost:8080")], API_KEY_VAR),
            (vec![(URL_VAR, "http://localhost:8080"), (API_KEY_VAR, "  ")], API_KEY_VAR),
        ];
        for (vars, expected) in cases {
            let config = from_map(&vars);
            match config.credentials() {
                Err(ConfigError::MissingCredential { variable }) => assert_eq!(variable, expected),
                Ok(_) => panic!("expected {expected} to be missing"),
            }
            assert!(matches!(
                config.client(),
                Err(crate::Error::Config(ConfigError::MissingCredential { .. }))
            ));
        }
    }

    #[test]
    fn builder_defaults() {
        let config = Config::builder()
            .url(Some("http://localhost:8080".to_owned()))
            .api_key(Some("key".to_owned()))
            .build();
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.policy(), LinkPolicy::default());
        assert!(config.client().is_ok());
    }
}
