//! Output formatting utilities
//!
//! Human-readable lines or a single JSON document per run. Errors and
//! warnings always go to stderr.

mod formatter;

pub use formatter::Formatter;

/// Whether to color human-readable output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Color when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Parse the `color` value of the configuration file; unknown values mean auto
    pub fn from_config(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "always" => Self::Always,
            "never" => Self::Never,
            _ => Self::Auto,
        }
    }
}

/// Output configuration derived from CLI flags and the config file
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Color mode
    pub color: ColorMode,
    /// Suppress non-error output
    pub quiet: bool,
}
