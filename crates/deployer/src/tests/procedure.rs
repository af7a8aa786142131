use alloy::primitives::{Address, address};
use std::io::{self, Write};
use test_case::test_case;

use super::fixtures::{PENDING_ADDRESS, ScriptedDeployer, Step};
use crate::{
    CONTRACT_NAME, DeployError,
    procedure::{EXIT_FAILURE, EXIT_SUCCESS, deploy, execute},
};

const CONFIRMED: Address = address!("abc1230000000000000000000000000000000001");

async fn run(deployer: &ScriptedDeployer) -> (u8, String, String) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = execute(deployer, CONTRACT_NAME, &mut stdout, &mut stderr).await;
    (
        code,
        String::from_utf8(stdout).unwrap(),
        String::from_utf8(stderr).unwrap(),
    )
}

#[tokio::test]
async fn test_success_reports_confirmed_address() {
    let deployer = ScriptedDeployer::new().confirming_at(CONFIRMED);

    let (code, stdout, stderr) = run(&deployer).await;

    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(stdout, format!("HyperBlockLabs deployed to: {CONFIRMED}\n"));
    assert!(!stdout.contains(&PENDING_ADDRESS.to_string()));
    assert!(stderr.is_empty());
    assert_eq!(deployer.calls(), [Step::Resolve, Step::Deploy, Step::Confirm]);
}

#[tokio::test]
async fn test_missing_contract_prints_error_and_fails() {
    let deployer = ScriptedDeployer::failing_at(Step::Resolve, "contract not found");

    let (code, stdout, stderr) = run(&deployer).await;

    assert_eq!(code, EXIT_FAILURE);
    assert!(stdout.is_empty());
    assert!(stderr.contains("contract not found"), "stderr: {stderr}");
    assert!(stderr.contains("failed to resolve contract factory for `HyperBlockLabs`"));
    assert_eq!(deployer.calls(), [Step::Resolve]);
}

#[test_case(Step::Resolve, "contract not found", &[Step::Resolve] ; "resolution")]
#[test_case(Step::Deploy, "insufficient funds for gas", &[Step::Resolve, Step::Deploy] ; "submission")]
#[test_case(Step::Confirm, "transaction reverted", &[Step::Resolve, Step::Deploy, Step::Confirm] ; "confirmation")]
#[tokio::test]
async fn test_failure_prints_nothing_on_stdout(step: Step, message: &'static str, calls: &[Step]) {
    let deployer = ScriptedDeployer::failing_at(step, message);

    let (code, stdout, stderr) = run(&deployer).await;

    assert_eq!(code, EXIT_FAILURE);
    assert!(stdout.is_empty(), "unexpected stdout: {stdout}");
    assert!(stderr.contains(message), "stderr: {stderr}");
    assert_eq!(deployer.calls(), calls);
}

#[tokio::test]
async fn test_failures_map_to_their_step() {
    let err = deploy(
        &ScriptedDeployer::failing_at(Step::Resolve, "unknown"),
        CONTRACT_NAME,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DeployError::FactoryResolution { .. }));

    let err = deploy(
        &ScriptedDeployer::failing_at(Step::Deploy, "no signer"),
        CONTRACT_NAME,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DeployError::DeploymentSubmission { .. }));

    let err = deploy(
        &ScriptedDeployer::failing_at(Step::Confirm, "reverted"),
        CONTRACT_NAME,
    )
    .await
    .unwrap_err();
    match err {
        DeployError::DeploymentConfirmation { name, tx_hash, .. } => {
            assert_eq!(name, CONTRACT_NAME);
            assert!(tx_hash.is_zero(), "first scripted deployment uses nonce 0");
        }
        other => panic!("expected confirmation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_repeated_runs_deploy_new_instances() {
    let deployer = ScriptedDeployer::new();

    let first = deploy(&deployer, CONTRACT_NAME).await.unwrap();
    let second = deploy(&deployer, CONTRACT_NAME).await.unwrap();

    assert_ne!(first.address(), second.address());
    assert_ne!(first.tx_hash(), second.tx_hash());
    assert_eq!(first.contract(), CONTRACT_NAME);
}

/// Writer whose every write fails.
struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_unwritable_stdout_fails_the_run() {
    let deployer = ScriptedDeployer::new();
    let mut stderr = Vec::new();

    let code = execute(&deployer, CONTRACT_NAME, &mut ClosedPipe, &mut stderr).await;

    assert_eq!(code, EXIT_FAILURE);
    assert!(!stderr.is_empty());
}
