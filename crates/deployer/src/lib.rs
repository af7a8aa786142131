//! Deployment of the HyperBlockLabs contract.
//!
//! The deploy chain is: resolve a [`ContractFactory`] from compiled
//! artifacts, submit a deployment transaction, wait for it to be mined and
//! report the deployed address. [`procedure::execute`] runs the chain against
//! any [`Deployer`]; [`RpcDeployer`] is the implementation that talks to a
//! JSON-RPC node.

pub mod artifacts;
pub mod config;
pub mod deployment;
pub mod error;
pub mod framework;
pub mod procedure;
pub mod rpc;

pub use artifacts::{ArtifactRegistry, ContractFactory};
pub use config::{DeployConfig, NetworkConfig, Overrides};
pub use deployment::{ConfirmedDeployment, PendingDeployment};
pub use error::DeployError;
pub use framework::Deployer;
pub use rpc::RpcDeployer;

/// Contract deployed by the `hyperblock-deploy` binary.
pub const CONTRACT_NAME: &str = "HyperBlockLabs";

#[cfg(test)]
mod tests;
