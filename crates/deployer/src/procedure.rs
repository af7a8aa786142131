//! Deploy one contract and report where it landed.

use eyre::WrapErr as _;
use std::io::Write;
use tracing::{debug, info};

use crate::{deployment::ConfirmedDeployment, error::DeployError, framework::Deployer};

/// Exit status of a successful run.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status of a run that failed at any step.
pub const EXIT_FAILURE: u8 = 1;

/// Resolves `contract`, deploys it without constructor arguments and waits
/// for the deployment to be confirmed.
pub async fn deploy<D>(deployer: &D, contract: &str) -> Result<ConfirmedDeployment, DeployError>
where
    D: Deployer + ?Sized,
{
    let factory = deployer.resolve(contract).await?;
    debug!(contract = %factory.fully_qualified_name(), "acquired contract factory");

    let pending = deployer.deploy(&factory).await?;
    debug!(tx_hash = %pending.tx_hash(), "deployment submitted");

    deployer.wait_for_confirmation(pending).await
}

/// The single line printed for a confirmed deployment.
pub fn report_line(contract: &str, deployment: &ConfirmedDeployment) -> String {
    format!("{contract} deployed to: {}", deployment.address())
}

/// Runs the whole deploy chain and returns the process exit status.
///
/// On success exactly one [`report_line`] is written to `stdout`. On failure
/// nothing is written to `stdout` and the error, with its causes, is written
/// to `stderr`.
pub async fn execute<D, O, E>(
    deployer: &D,
    contract: &str,
    stdout: &mut O,
    stderr: &mut E,
) -> u8
where
    D: Deployer + ?Sized,
    O: Write,
    E: Write,
{
    let result = match deploy(deployer, contract).await {
        Ok(deployment) => writeln!(stdout, "{}", report_line(contract, &deployment))
            .and_then(|()| stdout.flush())
            .map(|()| deployment)
            .wrap_err("failed to write deployment report"),
        Err(err) => Err(eyre::Report::new(err)),
    };

    match result {
        Ok(deployment) => {
            info!(
                contract,
                address = %deployment.address(),
                "deployment reported"
            );
            EXIT_SUCCESS
        }
        Err(report) => write_error(stderr, report),
    }
}

/// Writes `report` with its cause chain to `stderr` and returns
/// [`EXIT_FAILURE`].
pub fn write_error<E: Write>(stderr: &mut E, report: eyre::Report) -> u8 {
    debug!(error = %report, "deployment failed");
    // Nothing sensible is left to do if stderr is gone too.
    let _ = writeln!(stderr, "{report:?}");
    EXIT_FAILURE
}
