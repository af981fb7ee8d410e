mod cli;
mod error;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use veracount_core::{refresh, RefreshReport, ReqwestHttpClient};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    logging::init_logging(cli.log_level)?;

    let config = cli.to_config()?;
    debug!(?config, "resolved configuration");
    let client = Arc::new(ReqwestHttpClient::new(&config.user_agent)?);

    let report = refresh(&config, client).await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", summary_line(&report));
    }

    Ok(())
}

fn summary_line(report: &RefreshReport) -> String {
    format!(
        "Wrote {} using '{}' as the timestamp column ({} daily rows).",
        report.output_path.display(),
        report.timestamp_column,
        report.rows_written
    )
}
