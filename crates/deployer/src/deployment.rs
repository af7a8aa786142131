//! Handles for a single in-flight or confirmed deployment.

use alloy::primitives::{Address, TxHash};

/// A deployment whose transaction has been submitted but not yet mined.
///
/// The expected address is derived from the sender and its nonce before the
/// transaction is mined. It is informational: only
/// [`ConfirmedDeployment::address`] is the address of a deployed contract.
#[derive(Debug, Clone)]
pub struct PendingDeployment {
    contract: String,
    tx_hash: TxHash,
    deployer: Address,
    expected_address: Address,
}

impl PendingDeployment {
    pub fn new(
        contract: impl Into<String>,
        tx_hash: TxHash,
        deployer: Address,
        expected_address: Address,
    ) -> Self {
        Self {
            contract: contract.into(),
            tx_hash,
            deployer,
            expected_address,
        }
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Account that sent the deployment transaction.
    pub fn deployer(&self) -> Address {
        self.deployer
    }

    pub fn expected_address(&self) -> Address {
        self.expected_address
    }

    /// Marks the deployment as mined at `address`.
    pub fn confirm(
        self,
        address: Address,
        block_number: Option<u64>,
        gas_used: u64,
    ) -> ConfirmedDeployment {
        ConfirmedDeployment {
            contract: self.contract,
            address,
            tx_hash: self.tx_hash,
            block_number,
            gas_used,
        }
    }
}

/// A deployment whose transaction has been mined and whose contract exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedDeployment {
    contract: String,
    address: Address,
    tx_hash: TxHash,
    block_number: Option<u64>,
    gas_used: u64,
}

impl ConfirmedDeployment {
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// On-chain address of the deployed contract.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn block_number(&self) -> Option<u64> {
        self.block_number
    }

    pub fn gas_used(&self) -> u64 {
        self.gas_used
    }
}
