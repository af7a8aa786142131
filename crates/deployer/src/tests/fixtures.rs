//! Test fixtures: artifact builders and a scripted deployer.

use alloy::{
    json_abi::JsonAbi,
    primitives::{Address, B256, Bytes, U256, address, hex},
    rpc::types::TransactionReceipt,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    ArtifactRegistry, ConfirmedDeployment, ContractFactory, DeployError, Deployer,
    PendingDeployment, config::NetworkConfig,
};

/// Creation code returning a runtime that answers every call with `42`.
pub(crate) const COUNTER_BYTECODE: &str = "600a600c600039600a6000f3602a60005260206000f3";

/// Runtime part of [`COUNTER_BYTECODE`].
pub(crate) const COUNTER_RUNTIME: &str = "602a60005260206000f3";

/// Account every scripted deployment is sent from.
pub(crate) const DEPLOYER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Placeholder the scripted deployer reports before confirmation.
pub(crate) const PENDING_ADDRESS: Address = address!("0000000000000000000000000000000000000bad");

pub(crate) fn hardhat_artifact(name: &str, source: &str) -> Value {
    json!({
        "_format": "hh-sol-artifact-1",
        "contractName": name,
        "sourceName": source,
        "abi": [],
        "bytecode": format!("0x{COUNTER_BYTECODE}"),
        "deployedBytecode": format!("0x{COUNTER_RUNTIME}"),
        "linkReferences": {},
        "deployedLinkReferences": {}
    })
}

pub(crate) fn foundry_artifact() -> Value {
    json!({
        "abi": [],
        "bytecode": {
            "object": format!("0x{COUNTER_BYTECODE}"),
            "sourceMap": "",
            "linkReferences": {}
        },
        "deployedBytecode": {
            "object": format!("0x{COUNTER_RUNTIME}"),
            "sourceMap": "",
            "linkReferences": {}
        }
    })
}

pub(crate) fn write_artifact(root: &Path, relative: &str, artifact: &Value) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(artifact).unwrap()).unwrap();
}

/// Registry rooted in a fresh directory holding a Hardhat `HyperBlockLabs` artifact.
pub(crate) fn hyperblock_registry() -> (tempfile::TempDir, ArtifactRegistry) {
    let dir = tempfile::tempdir().unwrap();
    write_artifact(
        dir.path(),
        "contracts/HyperBlockLabs.sol/HyperBlockLabs.json",
        &hardhat_artifact("HyperBlockLabs", "contracts/HyperBlockLabs.sol"),
    );
    let registry = ArtifactRegistry::new(dir.path());
    (dir, registry)
}

/// Block every fixture receipt is mined in.
pub(crate) const RECEIPT_BLOCK: u64 = 7;

/// Receipt of a deployment sent by [`DEPLOYER`], as a node returns it.
pub(crate) fn deployment_receipt(
    success: bool,
    contract_address: Option<Address>,
) -> TransactionReceipt {
    serde_json::from_value(json!({
        "type": "0x2",
        "status": if success { "0x1" } else { "0x0" },
        "cumulativeGasUsed": "0xcf08",
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "transactionHash": B256::repeat_byte(0x11),
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0x22),
        "blockNumber": format!("{RECEIPT_BLOCK:#x}"),
        "gasUsed": "0xcf08",
        "effectiveGasPrice": "0x3b9aca00",
        "from": DEPLOYER,
        "to": null,
        "contractAddress": contract_address
    }))
    .unwrap()
}

/// Network pointing at a port nothing listens on.
pub(crate) fn unreachable_network() -> NetworkConfig {
    NetworkConfig {
        name: "unreachable".into(),
        rpc_url: "http://127.0.0.1:1".parse().unwrap(),
        chain_id: None,
        signer: None,
        confirmations: 1,
        timeout: None,
    }
}

/// Step of the deploy chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Resolve,
    Deploy,
    Confirm,
}

/// [`Deployer`] that follows a script instead of talking to a node.
///
/// Each deployment gets a fresh nonce, so repeated runs land at distinct
/// addresses unless a fixed confirmed address is scripted.
#[derive(Debug, Default)]
pub(crate) struct ScriptedDeployer {
    failure: Option<(Step, &'static str)>,
    confirmed_address: Option<Address>,
    nonce: AtomicU64,
    calls: Mutex<Vec<Step>>,
}

impl ScriptedDeployer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_at(step: Step, message: &'static str) -> Self {
        Self {
            failure: Some((step, message)),
            ..Self::default()
        }
    }

    pub(crate) fn confirming_at(mut self, address: Address) -> Self {
        self.confirmed_address = Some(address);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Step> {
        self.calls.lock().clone()
    }

    fn enter(&self, step: Step) -> Option<&'static str> {
        self.calls.lock().push(step);
        self.failure
            .and_then(|(failing, message)| (failing == step).then_some(message))
    }
}

#[async_trait::async_trait]
impl Deployer for ScriptedDeployer {
    async fn resolve(&self, name: &str) -> Result<ContractFactory, DeployError> {
        if let Some(message) = self.enter(Step::Resolve) {
            return Err(DeployError::factory_resolution(name, message));
        }
        let bytecode = Bytes::from(hex::decode(COUNTER_BYTECODE).unwrap());
        Ok(ContractFactory::new(name, JsonAbi::default(), bytecode))
    }

    async fn deploy(&self, factory: &ContractFactory) -> Result<PendingDeployment, DeployError> {
        if let Some(message) = self.enter(Step::Deploy) {
            return Err(DeployError::submission(factory.name(), message));
        }
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let tx_hash = B256::from(U256::from(nonce));
        Ok(PendingDeployment::new(
            factory.name(),
            tx_hash,
            DEPLOYER,
            PENDING_ADDRESS,
        ))
    }

    async fn wait_for_confirmation(
        &self,
        pending: PendingDeployment,
    ) -> Result<ConfirmedDeployment, DeployError> {
        if let Some(message) = self.enter(Step::Confirm) {
            return Err(DeployError::confirmation(
                pending.contract(),
                pending.tx_hash(),
                message,
            ));
        }
        let nonce = U256::from_be_bytes(pending.tx_hash().0).to::<u64>();
        let address = self
            .confirmed_address
            .unwrap_or_else(|| pending.deployer().create(nonce));
        Ok(pending.confirm(address, Some(nonce + 1), 53_000))
    }
}
