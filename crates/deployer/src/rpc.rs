//! [`Deployer`] backed by a JSON-RPC node.

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use tracing::{debug, info, warn};

use crate::{
    artifacts::{ArtifactRegistry, ContractFactory},
    config::{DeployConfig, NetworkConfig, Overrides},
    deployment::{ConfirmedDeployment, PendingDeployment},
    error::{BoxError, ConfirmationError, DeployError, SubmissionError},
    framework::Deployer,
};

/// Deploys contracts from an [`ArtifactRegistry`] to the configured network.
///
/// Transactions are signed by the configured local signer, or by the node's
/// first unlocked account when no signer is configured.
pub struct RpcDeployer {
    network: NetworkConfig,
    registry: ArtifactRegistry,
    provider: DynProvider,
}

impl RpcDeployer {
    pub fn new(network: NetworkConfig, registry: ArtifactRegistry) -> Self {
        let provider = match network.signer.clone() {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(network.rpc_url.clone())
                .erased(),
            None => ProviderBuilder::new()
                .connect_http(network.rpc_url.clone())
                .erased(),
        };

        Self {
            network,
            registry,
            provider,
        }
    }

    /// Builds a deployer for the network and artifacts selected by `config`
    /// and `overrides`.
    pub fn from_config(
        config: &DeployConfig,
        overrides: &Overrides,
    ) -> Result<Self, DeployError> {
        let network = config.network(overrides)?;
        let registry = ArtifactRegistry::new(config.artifacts_dir(overrides));
        debug!(
            network = %network.name,
            rpc_url = %network.rpc_url,
            artifacts = %registry.root().display(),
            local_signer = network.signer.is_some(),
            "configured deployer"
        );
        Ok(Self::new(network, registry))
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn registry(&self) -> &ArtifactRegistry {
        &self.registry
    }

    /// Account the deployment is sent from.
    async fn sender(&self) -> Result<Address, BoxError> {
        if let Some(signer) = &self.network.signer {
            return Ok(signer.address());
        }

        let accounts = self.provider.get_accounts().await?;
        let account = accounts.first().copied().ok_or(SubmissionError::NoSigner)?;
        debug!(%account, "using node account");
        Ok(account)
    }

    async fn ensure_chain_id(&self) -> Result<(), BoxError> {
        let Some(expected) = self.network.chain_id else {
            return Ok(());
        };

        let actual = self.provider.get_chain_id().await?;
        if actual != expected {
            return Err(SubmissionError::ChainIdMismatch { expected, actual }.into());
        }
        Ok(())
    }

    async fn submit(&self, factory: &ContractFactory) -> Result<PendingDeployment, BoxError> {
        let code = factory.deploy_code()?;
        self.ensure_chain_id().await?;

        let from = self.sender().await?;
        let nonce = self.provider.get_transaction_count(from).pending().await?;

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_nonce(nonce)
            .with_deploy_code(code);
        let pending = self.provider.send_transaction(tx).await?;

        let tx_hash = *pending.tx_hash();
        let expected_address = from.create(nonce);
        info!(
            contract = %factory.fully_qualified_name(),
            network = %self.network.name,
            %tx_hash,
            %from,
            nonce,
            %expected_address,
            "submitted deployment transaction"
        );

        Ok(PendingDeployment::new(
            factory.name(),
            tx_hash,
            from,
            expected_address,
        ))
    }

    /// Returns the confirmed address, block number and gas used.
    async fn confirm(
        &self,
        pending: &PendingDeployment,
    ) -> Result<(Address, Option<u64>, u64), BoxError> {
        debug!(
            tx_hash = %pending.tx_hash(),
            confirmations = self.network.confirmations,
            timeout = ?self.network.timeout,
            "waiting for deployment confirmation"
        );

        let receipt =
            PendingTransactionBuilder::new(self.provider.root().clone(), pending.tx_hash())
                .with_required_confirmations(self.network.confirmations)
                .with_timeout(self.network.timeout)
                .get_receipt()
                .await?;

        let address = deployed_address(&receipt)?;
        if address != pending.expected_address() {
            warn!(
                %address,
                expected = %pending.expected_address(),
                "deployed address differs from the expected address"
            );
        }

        let code = self.provider.get_code_at(address).await?;
        ensure_code(address, &code)?;

        Ok((address, receipt.block_number, receipt.gas_used))
    }
}

/// Address of the contract created by a mined deployment transaction.
pub(crate) fn deployed_address(
    receipt: &TransactionReceipt,
) -> Result<Address, ConfirmationError> {
    if !receipt.status() {
        return Err(ConfirmationError::Reverted {
            block_number: receipt.block_number,
        });
    }

    receipt
        .contract_address
        .ok_or(ConfirmationError::MissingContractAddress)
}

/// A deployment only counts once its address holds runtime code.
pub(crate) fn ensure_code(address: Address, code: &Bytes) -> Result<(), ConfirmationError> {
    if code.is_empty() {
        return Err(ConfirmationError::EmptyCode { address });
    }
    Ok(())
}

#[async_trait::async_trait]
impl Deployer for RpcDeployer {
    async fn resolve(&self, name: &str) -> Result<ContractFactory, DeployError> {
        self.registry
            .resolve(name)
            .map_err(|err| DeployError::factory_resolution(name, err))
    }

    async fn deploy(&self, factory: &ContractFactory) -> Result<PendingDeployment, DeployError> {
        self.submit(factory)
            .await
            .map_err(|err| DeployError::submission(factory.name(), err))
    }

    async fn wait_for_confirmation(
        &self,
        pending: PendingDeployment,
    ) -> Result<ConfirmedDeployment, DeployError> {
        match self.confirm(&pending).await {
            Ok((address, block_number, gas_used)) => {
                let confirmed = pending.confirm(address, block_number, gas_used);
                info!(
                    contract = confirmed.contract(),
                    address = %confirmed.address(),
                    tx_hash = %confirmed.tx_hash(),
                    block_number = ?confirmed.block_number(),
                    gas_used = confirmed.gas_used(),
                    "deployment confirmed"
                );
                Ok(confirmed)
            }
            Err(err) => Err(DeployError::confirmation(
                pending.contract(),
                pending.tx_hash(),
                err,
            )),
        }
    }
}
