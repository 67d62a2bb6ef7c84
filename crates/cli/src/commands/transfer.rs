//! transfer command - Copy one local file
//!
//! Copies a local file to another local path or uploads it to S3.

use clap::Parser;
use objmove_core::{TransferOutcome, transfer_file};
use objmove_s3::S3Connector;
use serde::Serialize;

use super::{AuthArgs, GlobalArgs, load_config, usage_error};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Transfer a file from a local source to either a local destination or an S3 bucket.
#[derive(Parser, Debug)]
#[command(name = "transfer", version)]
pub struct TransferCli {
    /// The local source file path
    pub source: String,

    /// The destination file path (local) or S3 path (e.g. 's3://bucket/key')
    pub destination: String,

    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Debug, Serialize)]
struct TransferOutput {
    status: &'static str,
    source: String,
    destination: String,
    size_bytes: u64,
    size_human: String,
}

impl TransferOutput {
    fn new(outcome: &TransferOutcome) -> Self {
        Self {
            status: "success",
            source: outcome.source.display().to_string(),
            destination: outcome.destination.clone(),
            size_bytes: outcome.size_bytes,
            size_human: humansize::format_size(outcome.size_bytes, humansize::BINARY),
        }
    }
}

/// Execute the transfer command
pub async fn execute(cli: TransferCli) -> ExitCode {
    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let formatter = Formatter::new(cli.global.output_config(&config.defaults));

    let flags = cli.auth.access_flags(&config.defaults);
    if let Err(e) = flags.validate(&cli.destination) {
        return usage_error::<TransferCli>(&e);
    }

    let connector = S3Connector::new(flags.auth_config(), flags.endpoint_config());
    match transfer_file(&cli.source, &cli.destination, &connector).await {
        Ok(outcome) => {
            let output = TransferOutput::new(&outcome);
            if formatter.is_json() {
                formatter.json(&output);
            } else {
                let verb = if objmove_core::path::is_remote(&output.destination) {
                    "uploaded"
                } else {
                    "copied"
                };
                formatter.println(&format!(
                    "File {} {verb} successfully to {} ({})",
                    output.source, output.destination, output.size_human
                ));
            }
            formatter.success("Transfer completed successfully.");
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Error transferring {}: {e}", cli.source));
            formatter.error("Transfer failed.");
            ExitCode::from_error(&e)
        }
    }
}
