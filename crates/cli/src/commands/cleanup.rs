//! cleanup command - Remove a directory tree
//!
//! Removes a local directory recursively, or every object under an S3 prefix.

use clap::Parser;
use objmove_core::{DeleteOutcome, delete_recursive};
use objmove_s3::S3Connector;
use serde::Serialize;

use super::{AuthArgs, GlobalArgs, load_config, usage_error};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Remove a directory recursively, either local or in an S3 bucket.
#[derive(Parser, Debug)]
#[command(name = "cleanup", version)]
pub struct CleanupCli {
    /// The directory path (local) or S3 path (e.g. 's3://bucket/prefix') to remove
    pub destination: String,

    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Debug, Serialize)]
struct CleanupOutput<'a> {
    status: &'static str,
    #[serde(flatten)]
    outcome: &'a DeleteOutcome,
}

/// Execute the cleanup command
pub async fn execute(cli: CleanupCli) -> ExitCode {
    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let formatter = Formatter::new(cli.global.output_config(&config.defaults));

    let flags = cli.auth.access_flags(&config.defaults);
    if let Err(e) = flags.validate(&cli.destination) {
        return usage_error::<CleanupCli>(&e);
    }

    let connector = S3Connector::new(flags.auth_config(), flags.endpoint_config());
    match delete_recursive(&cli.destination, &connector).await {
        Ok(outcome) => {
            report(&outcome, &formatter);
            formatter.success("Cleanup completed successfully.");
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Error removing directory {}: {e}", cli.destination));
            formatter.error("Cleanup failed.");
            ExitCode::from_error(&e)
        }
    }
}

fn report(outcome: &DeleteOutcome, formatter: &Formatter) {
    if formatter.is_json() {
        formatter.json(&CleanupOutput {
            status: "success",
            outcome,
        });
        return;
    }

    match outcome {
        DeleteOutcome::Remote { target, deleted: 0 } => {
            formatter.warning(&format!("No objects found under {target}"));
        }
        DeleteOutcome::Remote { target, deleted } => {
            formatter.println(&format!(
                "Directory {target} removed successfully from S3 ({deleted} object(s))"
            ));
        }
        DeleteOutcome::LocalRemoved { path } => {
            formatter.println(&format!("Directory {} removed successfully", path.display()));
        }
        DeleteOutcome::LocalMissing { path } => {
            formatter.println(&format!("Directory {} does not exist", path.display()));
        }
    }
}
