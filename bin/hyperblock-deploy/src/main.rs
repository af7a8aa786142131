use clap::Parser;
use hyperblock_deployer::{CONTRACT_NAME, procedure};
use opts::DeployCli;
use std::{io, process::ExitCode};

mod opts;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr, stdout carries only the deployment report.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = match DeployCli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            return ExitCode::from(DeployCli::usage_exit_status(err, &mut io::stderr()));
        }
    };

    let code = match args.deployer() {
        Ok(deployer) => {
            procedure::execute(&deployer, CONTRACT_NAME, &mut io::stdout(), &mut io::stderr())
                .await
        }
        Err(err) => procedure::write_error(&mut io::stderr(), eyre::Report::new(err)),
    };

    ExitCode::from(code)
}
