//! Error taxonomy for a deployment run.
//!
//! Every stage of the deploy chain maps onto exactly one [`DeployError`]
//! variant. Stage-specific causes are kept as boxed sources so that any
//! [`Deployer`](crate::Deployer) implementation can surface its own errors
//! without the procedure knowing their concrete types.

use alloy::{
    primitives::{Address, TxHash},
    transports::http::reqwest::Url,
};
use std::{path::PathBuf, str::FromStr};

/// Boxed cause attached to a [`DeployError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

type UrlParseError = <Url as FromStr>::Err;

/// Error returned by any step of the deploy chain.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The deployment configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The contract identifier is unknown to the artifact registry, or its
    /// artifact cannot produce a factory.
    #[error("failed to resolve contract factory for `{name}`")]
    FactoryResolution {
        name: String,
        #[source]
        source: BoxError,
    },

    /// The deployment transaction could not be submitted.
    #[error("failed to submit deployment of `{name}`")]
    DeploymentSubmission {
        name: String,
        #[source]
        source: BoxError,
    },

    /// The deployment transaction was submitted but never confirmed.
    #[error("deployment of `{name}` in transaction {tx_hash} was not confirmed")]
    DeploymentConfirmation {
        name: String,
        tx_hash: TxHash,
        #[source]
        source: BoxError,
    },
}

impl DeployError {
    pub fn factory_resolution(name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::FactoryResolution {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn submission(name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::DeploymentSubmission {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn confirmation(
        name: impl Into<String>,
        tx_hash: TxHash,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::DeploymentConfirmation {
            name: name.into(),
            tx_hash,
            source: source.into(),
        }
    }
}

/// Invalid or unreadable deployment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("network `{name}` is not defined (known networks: {known})")]
    UnknownNetwork { name: String, known: String },

    #[error("network `{network}` has no RPC URL")]
    MissingUrl { network: String },

    #[error("network `{network}` has an invalid RPC URL `{url}`")]
    InvalidUrl {
        network: String,
        url: String,
        #[source]
        source: UrlParseError,
    },

    #[error("network `{network}` configures both a private key and a mnemonic")]
    ConflictingAccounts { network: String },

    #[error("network `{network}` has an invalid private key")]
    InvalidPrivateKey {
        network: String,
        #[source]
        source: alloy::signers::local::LocalSignerError,
    },

    #[error("network `{network}` has an invalid mnemonic or account index")]
    InvalidMnemonic {
        network: String,
        #[source]
        source: alloy::signers::local::LocalSignerError,
    },

    #[error("network `{network}` requires at least one confirmation")]
    ZeroConfirmations { network: String },

    #[error("network `{network}` has a negative confirmation timeout")]
    InvalidTimeout { network: String },
}

/// Failure to turn a compiled artifact into a [`ContractFactory`](crate::ContractFactory).
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact for contract `{name}` not found in {dir:?}")]
    NotFound { name: String, dir: PathBuf },

    #[error(
        "contract name `{name}` is ambiguous, use a fully qualified name instead: {}",
        candidates.join(", ")
    )]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },

    #[error("contract `{name}` is abstract or an interface and cannot be deployed")]
    Abstract { name: String },

    #[error("contract `{name}` is missing links for libraries: {}", libraries.join(", "))]
    UnlinkedLibraries {
        name: String,
        libraries: Vec<String>,
    },

    #[error("failed to read artifact {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {path:?}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact {path:?} has invalid creation bytecode")]
    InvalidBytecode {
        path: PathBuf,
        #[source]
        source: alloy::primitives::hex::FromHexError,
    },
}

/// Failure to put a deployment transaction on the wire.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("no signer configured and the node exposes no unlocked accounts")]
    NoSigner,

    #[error("constructor expects {expected} argument(s) but none are supplied")]
    ConstructorArguments { expected: usize },

    #[error("connected to chain {actual}, but the network is configured for chain {expected}")]
    ChainIdMismatch { expected: u64, actual: u64 },
}

/// Failure to confirm a submitted deployment.
#[derive(Debug, thiserror::Error)]
pub enum ConfirmationError {
    #[error("transaction reverted in block {block_number:?}")]
    Reverted { block_number: Option<u64> },

    #[error("receipt carries no contract address")]
    MissingContractAddress,

    #[error("no code found at deployed address {address}")]
    EmptyCode { address: Address },
}
