//! driveup - upload a file to Google Drive from a GitHub Actions step.
//!
//! Reads the action inputs, uploads the file with a service-account key and
//! publishes the viewer link as the `link` step output.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use driveup_cli::{logging, run, Cli, Outcome, Workflow};
use driveup_common::SecretSet;
use driveup_storage::ServiceAccountConnector;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let mut cli = Cli::parse();
    let secrets = SecretSet::new();
    let mut workflow = Workflow::stdout(secrets.clone(), None);

    match execute(&mut cli, secrets, &mut workflow).await {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            if let Some(e) = err.downcast_ref::<driveup_common::Error>() {
                tracing::error!(kind = e.kind(), "Upload run failed");
            }
            workflow.fatal(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

async fn execute(
    cli: &mut Cli,
    secrets: SecretSet,
    workflow: &mut Workflow<std::io::Stdout>,
) -> Result<Outcome> {
    let settings = cli.settings()?;
    workflow.set_output_file(settings.github_output.clone());
    logging::init(&settings, secrets).context("Failed to initialise logging")?;

    let connector = ServiceAccountConnector::new(settings.upload_endpoint.clone())?;
    let outcome = run(cli.take_inputs(), &connector, workflow).await?;

    Ok(outcome)
}
