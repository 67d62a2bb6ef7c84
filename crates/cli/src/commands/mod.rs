//! CLI command definitions and execution
//!
//! Both binaries share the authentication and output flags defined here.
//! Each command validates its flags, loads the optional configuration file,
//! runs one operation and maps the result to an exit code.

use clap::error::ErrorKind;
use clap::{Args, CommandFactory};
use objmove_core::config::Defaults;
use objmove_core::{AccessFlags, Config, ConfigManager, Error};

use crate::exit_code::ExitCode;
use crate::output::{ColorMode, Formatter, OutputConfig};

pub mod cleanup;
pub mod transfer;

/// Authentication and endpoint flags for S3 destinations
#[derive(Args, Debug, Clone, Default)]
pub struct AuthArgs {
    /// Use IAM role for authentication
    #[arg(long = "use_role")]
    pub use_role: bool,

    /// The name of the IAM role to assume
    #[arg(long = "role_name", value_name = "NAME")]
    pub role_name: Option<String>,

    /// AWS access key ID
    #[arg(long = "aws_access_key_id", value_name = "ID")]
    pub aws_access_key_id: Option<String>,

    /// AWS secret access key
    #[arg(long = "aws_secret_access_key", value_name = "SECRET")]
    pub aws_secret_access_key: Option<String>,

    /// S3-compatible endpoint URL
    #[arg(long = "endpoint_url", value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// AWS region (ignored for routing if --endpoint_url is specified)
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,
}

impl AuthArgs {
    /// Merge with the configuration file defaults
    pub fn access_flags(&self, defaults: &Defaults) -> AccessFlags {
        AccessFlags {
            use_role: self.use_role,
            role_name: self.role_name.clone(),
            access_key_id: self.aws_access_key_id.clone(),
            secret_access_key: self.aws_secret_access_key.clone(),
            endpoint_url: self.endpoint_url.clone(),
            region: self.region.clone().or_else(|| defaults.region.clone()),
        }
    }
}

/// Output and logging flags
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl GlobalArgs {
    pub fn output_config(&self, defaults: &Defaults) -> OutputConfig {
        OutputConfig {
            json: self.json,
            color: if self.no_color {
                ColorMode::Never
            } else {
                ColorMode::from_config(&defaults.color)
            },
            quiet: self.quiet || defaults.quiet,
        }
    }
}

/// Load the configuration file, reporting failures the way commands do
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config, ExitCode> {
    match ConfigManager::new().load() {
        Ok(config) => Ok(config),
        Err(e) => {
            let formatter = Formatter::new(OutputConfig {
                json: global.json,
                ..Default::default()
            });
            formatter.error(&e.to_string());
            Err(ExitCode::from_error(&e))
        }
    }
}

/// Render a rejected flag combination as a clap usage error
pub fn render_usage_error<C: CommandFactory>(err: &Error) -> String {
    C::command()
        .error(ErrorKind::ArgumentConflict, err)
        .render()
        .to_string()
}

/// Print a usage error to stderr and return the failure exit code
pub(crate) fn usage_error<C: CommandFactory>(err: &Error) -> ExitCode {
    eprint!("{}", render_usage_error::<C>(err));
    ExitCode::from_error(err)
}
