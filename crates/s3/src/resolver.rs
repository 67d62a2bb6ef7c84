//! Credential resolution
//!
//! Turns an [`AuthConfig`] and [`EndpointConfig`] into a ready [`S3Client`].
//! Role assumption talks to STS through the ambient credential chain; the
//! custom endpoint is applied to the S3 client only, never to STS.

use std::time::SystemTime;

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, ConfigLoader, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_sts::error::DisplayErrorContext;

use objmove_core::{AuthConfig, Connector, EndpointConfig, Error, ObjectStore, Result};

use crate::client::S3Client;

/// Session name sent with AssumeRole
pub const ROLE_SESSION_NAME: &str = "AssumeRoleSession";

/// Signing region for custom endpoints when nothing else is configured
const FALLBACK_REGION: &str = "us-east-1";

/// Build the ARN of a role in the given account
pub fn role_arn(account_id: &str, role_name: &str) -> String {
    format!("arn:aws:iam::{account_id}:role/{role_name}")
}

/// Build an S3 client for one invocation
pub async fn resolve(auth: &AuthConfig, endpoint: &EndpointConfig) -> Result<S3Client> {
    let sdk_config = match auth {
        AuthConfig::Missing => {
            return Err(Error::Config(
                "no valid authentication method supplied".into(),
            ));
        }
        AuthConfig::Static {
            access_key_id,
            secret_access_key,
        } => {
            tracing::debug!("using static credentials");
            let credentials = Credentials::new(
                access_key_id,
                secret_access_key,
                None, // session token
                None, // expiry
                "objmove-static-credentials",
            );
            base_loader(endpoint)
                .credentials_provider(credentials)
                .load()
                .await
        }
        AuthConfig::AssumeRole { role_name: None } => {
            tracing::debug!("using ambient credential chain");
            base_loader(endpoint).load().await
        }
        AuthConfig::AssumeRole {
            role_name: Some(role_name),
        } => {
            let ambient = base_loader(endpoint).load().await;
            let credentials = assume_role(&ambient, role_name).await?;
            base_loader(endpoint)
                .credentials_provider(credentials)
                .load()
                .await
        }
    };

    Ok(S3Client::from_conf(s3_config(&sdk_config, endpoint)))
}

/// Shared loader carrying the region choice
fn base_loader(endpoint: &EndpointConfig) -> ConfigLoader {
    let loader = aws_config::defaults(BehaviorVersion::latest());
    match (&endpoint.region, &endpoint.endpoint_url) {
        (Some(region), _) => loader.region(Region::new(region.clone())),
        (None, Some(_)) => {
            loader.region(RegionProviderChain::default_provider().or_else(FALLBACK_REGION))
        }
        (None, None) => loader,
    }
}

fn s3_config(sdk_config: &SdkConfig, endpoint: &EndpointConfig) -> aws_sdk_s3::Config {
    let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
    if let Some(url) = &endpoint.endpoint_url {
        tracing::debug!(endpoint = %url, "using custom endpoint with path-style addressing");
        builder = builder.endpoint_url(url).force_path_style(true);
    }
    builder.build()
}

/// Exchange the ambient identity for temporary credentials of `role_name`.
///
/// The caller identity is looked up once and reused for the ARN.
async fn assume_role(ambient: &SdkConfig, role_name: &str) -> Result<Credentials> {
    let sts = aws_sdk_sts::Client::new(ambient);

    let identity = sts.get_caller_identity().send().await.map_err(|e| {
        Error::Resolution(format!(
            "caller identity lookup failed: {}",
            DisplayErrorContext(e)
        ))
    })?;
    let account = identity
        .account()
        .ok_or_else(|| Error::Resolution("caller identity has no account id".into()))?;

    let arn = role_arn(account, role_name);
    tracing::debug!(%arn, "assuming role");

    let response = sts
        .assume_role()
        .role_arn(&arn)
        .role_session_name(ROLE_SESSION_NAME)
        .send()
        .await
        .map_err(|e| {
            Error::Resolution(format!(
                "assuming role {arn} failed: {}",
                DisplayErrorContext(e)
            ))
        })?;
    let issued = response
        .credentials()
        .ok_or_else(|| Error::Resolution(format!("assuming role {arn} returned no credentials")))?;

    Ok(Credentials::new(
        issued.access_key_id(),
        issued.secret_access_key(),
        Some(issued.session_token().to_string()),
        SystemTime::try_from(*issued.expiration()).ok(),
        "objmove-assumed-role",
    ))
}

/// Connector that resolves credentials on first use
#[derive(Debug, Clone)]
pub struct S3Connector {
    auth: AuthConfig,
    endpoint: EndpointConfig,
}

impl S3Connector {
    pub fn new(auth: AuthConfig, endpoint: EndpointConfig) -> Self {
        Self { auth, endpoint }
    }
}

#[async_trait]
impl Connector for S3Connector {
    async fn connect(&self) -> Result<Box<dyn ObjectStore>> {
        let client = resolve(&self.auth, &self.endpoint).await?;
        Ok(Box::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_auth() -> AuthConfig {
        AuthConfig::Static {
            access_key_id: "AKIDEXAMPLE".into(),
            secret_access_key: "secret".into(),
        }
    }

    #[test]
    fn test_role_arn() {
        assert_eq!(
            role_arn("123456789012", "image-exporter"),
            "arn:aws:iam::123456789012:role/image-exporter"
        );
    }

    #[tokio::test]
    async fn test_missing_auth_fails_closed() {
        let err = resolve(&AuthConfig::Missing, &EndpointConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("no valid authentication method"));
    }

    #[tokio::test]
    async fn test_connector_propagates_configuration_error() {
        let connector = S3Connector::new(AuthConfig::Missing, EndpointConfig::default());
        assert!(matches!(
            connector.connect().await.err(),
            Some(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_static_credentials_bind_region() {
        let endpoint = EndpointConfig {
            endpoint_url: None,
            region: Some("eu-west-1".into()),
        };
        let client = resolve(&static_auth(), &endpoint).await.unwrap();
        assert_eq!(
            client.inner().config().region().map(|r| r.as_ref()),
            Some("eu-west-1")
        );
    }

    #[tokio::test]
    async fn test_custom_endpoint_records_region_for_signing() {
        let endpoint = EndpointConfig {
            endpoint_url: Some("http://localhost:9000".into()),
            region: Some("garage".into()),
        };
        let client = resolve(&static_auth(), &endpoint).await.unwrap();
        assert_eq!(
            client.inner().config().region().map(|r| r.as_ref()),
            Some("garage")
        );
    }
}
