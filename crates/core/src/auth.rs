//! Authentication and endpoint configuration
//!
//! Raw command-line flags are collected into [`AccessFlags`], validated once
//! against the destination, and then turned into the [`AuthConfig`] and
//! [`EndpointConfig`] values the credential resolver consumes.

use crate::error::{Error, Result};
use crate::path::is_remote;

/// How the storage client authenticates
#[derive(Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// Use the ambient credential chain, optionally assuming a named role
    AssumeRole {
        /// Role to assume in the caller's own account
        role_name: Option<String>,
    },
    /// Use a fixed access key pair
    Static {
        access_key_id: String,
        secret_access_key: String,
    },
    /// Neither a role nor a complete key pair was supplied
    Missing,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthConfig::AssumeRole { role_name } => f
                .debug_struct("AssumeRole")
                .field("role_name", role_name)
                .finish(),
            AuthConfig::Static { access_key_id, .. } => f
                .debug_struct("Static")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<redacted>")
                .finish(),
            AuthConfig::Missing => f.write_str("Missing"),
        }
    }
}

/// Where the storage client sends requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Custom S3-compatible endpoint; takes precedence over the region
    pub endpoint_url: Option<String>,
    /// Region name
    pub region: Option<String>,
}

impl EndpointConfig {
    /// Region to route requests to. `None` when a custom endpoint is set.
    pub fn routing_region(&self) -> Option<&str> {
        if self.endpoint_url.is_some() {
            None
        } else {
            self.region.as_deref()
        }
    }
}

/// Authentication flags as given on the command line
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AccessFlags {
    pub use_role: bool,
    pub role_name: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

impl std::fmt::Debug for AccessFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessFlags")
            .field("use_role", &self.use_role)
            .field("role_name", &self.role_name)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .finish()
    }
}

/// Treat empty flag values the same as absent ones
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl AccessFlags {
    /// Check the flag combination for a destination.
    ///
    /// Local destinations accept any combination. Remote destinations must
    /// pick exactly one authentication method.
    pub fn validate(&self, destination: &str) -> Result<()> {
        if !is_remote(destination) {
            return Ok(());
        }

        let key = present(&self.access_key_id);
        let secret = present(&self.secret_access_key);
        let endpoint = present(&self.endpoint_url);

        if self.use_role && (key.is_some() || secret.is_some() || endpoint.is_some()) {
            return Err(Error::Usage(
                "When using IAM role (--use_role), access key, secret, and endpoint URL should not be specified."
                    .into(),
            ));
        }

        if key.is_some() != secret.is_some() {
            return Err(Error::Usage(
                "Both --aws_access_key_id and --aws_secret_access_key must be provided when using access key authentication."
                    .into(),
            ));
        }

        if !self.use_role && key.is_none() {
            return Err(Error::Usage(
                "Either --use_role or both --aws_access_key_id and --aws_secret_access_key must be provided for S3 operations."
                    .into(),
            ));
        }

        if self.use_role
            && present(&self.role_name).is_some()
            && (key.is_some() || secret.is_some())
        {
            return Err(Error::Usage(
                "When using a specific role (--role_name), access key and secret should not be specified."
                    .into(),
            ));
        }

        if let Some(endpoint) = endpoint {
            url::Url::parse(endpoint)?;
        }

        Ok(())
    }

    /// Select the authentication method
    pub fn auth_config(&self) -> AuthConfig {
        if self.use_role {
            return AuthConfig::AssumeRole {
                role_name: present(&self.role_name).map(str::to_string),
            };
        }

        match (present(&self.access_key_id), present(&self.secret_access_key)) {
            (Some(key), Some(secret)) => AuthConfig::Static {
                access_key_id: key.to_string(),
                secret_access_key: secret.to_string(),
            },
            _ => AuthConfig::Missing,
        }
    }

    /// Endpoint and region settings
    pub fn endpoint_config(&self) -> EndpointConfig {
        EndpointConfig {
            endpoint_url: present(&self.endpoint_url).map(str::to_string),
            region: present(&self.region).map(str::to_string),
        }
    }
}
