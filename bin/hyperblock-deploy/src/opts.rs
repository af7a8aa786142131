use clap::Parser;
use hyperblock_deployer::{DeployConfig, DeployError, Overrides, RpcDeployer, procedure};
use jiff::SignedDuration;
use std::{io::Write, path::PathBuf};

/// Every option is optional: without any, the contract is deployed to a node
/// on `localhost:8545` from the `artifacts/` directory.
#[derive(Parser, Debug)]
#[command(name = "hyperblock-deploy")]
#[command(version, about = "Deploy the HyperBlockLabs contract and print its address", long_about = None)]
pub(crate) struct DeployCli {
    /// Path to the deployment config file [default: ./deploy.toml if present]
    #[arg(short, long, env = "HYPERBLOCK_CONFIG")]
    config: Option<PathBuf>,

    /// Network to deploy to, as named in the config file
    #[arg(short, long, env = "HYPERBLOCK_NETWORK")]
    network: Option<String>,

    /// RPC URL (overrides the network's URL)
    #[arg(long, env = "HYPERBLOCK_RPC_URL")]
    rpc_url: Option<String>,

    /// Hex-encoded private key of the deploying account
    #[arg(long, env = "HYPERBLOCK_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Directory holding compiled contract artifacts
    #[arg(long, env = "HYPERBLOCK_ARTIFACTS")]
    artifacts: Option<PathBuf>,

    /// Number of blocks the deployment must be buried under
    #[arg(long, env = "HYPERBLOCK_CONFIRMATIONS")]
    confirmations: Option<u64>,

    /// Maximum time to wait for confirmation, e.g. `90s` or `5m`
    #[arg(long, env = "HYPERBLOCK_TIMEOUT")]
    timeout: Option<SignedDuration>,
}

impl DeployCli {
    fn overrides(&self) -> Overrides {
        Overrides {
            network: self.network.clone(),
            rpc_url: self.rpc_url.clone(),
            private_key: self.private_key.clone(),
            artifacts: self.artifacts.clone(),
            confirmations: self.confirmations,
            timeout: self.timeout,
        }
    }

    /// Exit status for a command line that did not parse.
    ///
    /// `--help` and `--version` print to stdout and succeed, usage errors fail
    /// like any other run.
    pub(crate) fn usage_exit_status<E: Write>(err: clap::Error, stderr: &mut E) -> u8 {
        if err.exit_code() == 0 {
            // Nowhere left to report a failed help write.
            let _ = err.print();
            return procedure::EXIT_SUCCESS;
        }
        procedure::write_error(stderr, eyre::Report::new(err))
    }

    /// Loads the config file and builds the deployer it describes.
    pub(crate) fn deployer(&self) -> Result<RpcDeployer, DeployError> {
        let config = DeployConfig::discover(self.config.as_deref())?;
        RpcDeployer::from_config(&config, &self.overrides())
    }
}
