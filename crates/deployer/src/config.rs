//! Network and signer configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! explicit [`Overrides`] (command line flags and environment variables).

use alloy::{
    signers::local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English},
    transports::http::reqwest::Url,
};
use jiff::SignedDuration;
use serde::Deserialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::ConfigError;

/// Network used when nothing else is selected.
pub const LOCALHOST: &str = "localhost";

/// RPC endpoint of a development node on this machine.
pub const LOCALHOST_RPC_URL: &str = "http://127.0.0.1:8545";

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "deploy.toml";

/// Directory scanned for compiled contracts when none is given.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

const DEFAULT_CONFIRMATIONS: u64 = 1;

/// Contents of a deployment config file.
///
/// ```toml
/// default_network = "sepolia"
/// artifacts = "artifacts"
///
/// [networks.sepolia]
/// url = "https://rpc.sepolia.org"
/// chain_id = 11155111
/// private_key = "0x..."
/// confirmations = 2
/// timeout = "5m"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    pub default_network: Option<String>,
    pub artifacts: Option<PathBuf>,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkSettings>,
}

/// One `[networks.<name>]` table.
///
/// Without `private_key` or `mnemonic` the node's own unlocked accounts sign.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSettings {
    pub url: Option<String>,
    pub chain_id: Option<u64>,
    pub private_key: Option<String>,
    pub mnemonic: Option<String>,
    pub account_index: Option<u32>,
    pub confirmations: Option<u64>,
    pub timeout: Option<SignedDuration>,
}

/// Settings given explicitly for this run. Each one wins over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub network: Option<String>,
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
    pub artifacts: Option<PathBuf>,
    pub confirmations: Option<u64>,
    pub timeout: Option<SignedDuration>,
}

/// Fully resolved settings for the selected network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: Url,
    /// Chain the node must report, when pinned.
    pub chain_id: Option<u64>,
    /// Local signer; `None` delegates signing to the node.
    pub signer: Option<PrivateKeySigner>,
    pub confirmations: u64,
    pub timeout: Option<Duration>,
}

impl DeployConfig {
    /// Reads and parses the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` when given, otherwise [`DEFAULT_CONFIG_FILE`] if it
    /// exists in the working directory, otherwise the built-in defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn artifacts_dir(&self, overrides: &Overrides) -> PathBuf {
        overrides
            .artifacts
            .clone()
            .or_else(|| self.artifacts.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR))
    }

    /// Resolves the selected network, applying `overrides` on top.
    pub fn network(&self, overrides: &Overrides) -> Result<NetworkConfig, ConfigError> {
        let name = overrides
            .network
            .clone()
            .or_else(|| self.default_network.clone())
            .unwrap_or_else(|| LOCALHOST.to_string());

        let mut settings = match (self.networks.get(&name), name == LOCALHOST) {
            (Some(settings), true) => NetworkSettings {
                url: settings
                    .url
                    .clone()
                    .or_else(|| Some(LOCALHOST_RPC_URL.to_string())),
                ..settings.clone()
            },
            (Some(settings), false) => settings.clone(),
            (None, true) => NetworkSettings {
                url: Some(LOCALHOST_RPC_URL.to_string()),
                ..Default::default()
            },
            (None, false) => {
                let known = std::iter::once(LOCALHOST)
                    .chain(self.networks.keys().map(String::as_str))
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(ConfigError::UnknownNetwork { name, known });
            }
        };

        if let Some(url) = &overrides.rpc_url {
            settings.url = Some(url.clone());
        }
        if let Some(key) = &overrides.private_key {
            settings.private_key = Some(key.clone());
            settings.mnemonic = None;
        }
        if let Some(confirmations) = overrides.confirmations {
            settings.confirmations = Some(confirmations);
        }
        if let Some(timeout) = overrides.timeout {
            settings.timeout = Some(timeout);
        }

        settings.resolve(name)
    }
}

impl NetworkSettings {
    fn resolve(self, network: String) -> Result<NetworkConfig, ConfigError> {
        let url = self.url.ok_or_else(|| ConfigError::MissingUrl {
            network: network.clone(),
        })?;
        let rpc_url = Url::parse(&url).map_err(|source| ConfigError::InvalidUrl {
            network: network.clone(),
            url: url.clone(),
            source,
        })?;

        let signer = match (self.private_key, self.mnemonic) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingAccounts { network }),
            (Some(key), None) => Some(key.trim().parse::<PrivateKeySigner>().map_err(
                |source| ConfigError::InvalidPrivateKey {
                    network: network.clone(),
                    source,
                },
            )?),
            (None, Some(phrase)) => Some(
                MnemonicBuilder::<English>::default()
                    .phrase(phrase.trim())
                    .index(self.account_index.unwrap_or_default())
                    .and_then(|builder| builder.build())
                    .map_err(|source| ConfigError::InvalidMnemonic {
                        network: network.clone(),
                        source,
                    })?,
            ),
            (None, None) => None,
        };

        let confirmations = self.confirmations.unwrap_or(DEFAULT_CONFIRMATIONS);
        if confirmations == 0 {
            return Err(ConfigError::ZeroConfirmations { network });
        }

        let timeout = self
            .timeout
            .map(Duration::try_from)
            .transpose()
            .map_err(|_| ConfigError::InvalidTimeout {
                network: network.clone(),
            })?;

        Ok(NetworkConfig {
            name: network,
            rpc_url,
            chain_id: self.chain_id,
            signer,
            confirmations,
            timeout,
        })
    }
}
