//! The capability the deploy procedure needs from a blockchain framework.

use crate::{
    artifacts::ContractFactory,
    deployment::{ConfirmedDeployment, PendingDeployment},
    error::DeployError,
};

/// Resolves, submits and confirms contract deployments.
///
/// [`RpcDeployer`](crate::RpcDeployer) talks to a JSON-RPC node; tests
/// substitute scripted implementations.
#[async_trait::async_trait]
pub trait Deployer: Send + Sync {
    /// Looks up the compiled contract `name`.
    ///
    /// Fails with [`DeployError::FactoryResolution`].
    async fn resolve(&self, name: &str) -> Result<ContractFactory, DeployError>;

    /// Submits a deployment of `factory` without constructor arguments.
    ///
    /// Fails with [`DeployError::DeploymentSubmission`].
    async fn deploy(&self, factory: &ContractFactory) -> Result<PendingDeployment, DeployError>;

    /// Waits until the deployment transaction is mined.
    ///
    /// Fails with [`DeployError::DeploymentConfirmation`].
    async fn wait_for_confirmation(
        &self,
        pending: PendingDeployment,
    ) -> Result<ConfirmedDeployment, DeployError>;
}
