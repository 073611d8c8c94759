//! # HashiCorp Vault KV v2 Client
//!
//! Native REST implementation of the `SecretStore` trait using reqwest with rustls.
//!
//! This module provides functionality to:
//! - Verify the token with `GET /v1/auth/token/lookup-self`
//! - Read the latest version of a secret (`GET /v1/{mount}/data/{path}`)
//! - Create or update a secret (`POST /v1/{mount}/data/{path}`)
//! - Trust a private CA bundle for self-signed Vault deployments

mod requests;
mod responses;

pub use responses::VersionMetadata;

/// Confirmation returned by a successful write
pub type WriteConfirmation = VersionMetadata;

use self::requests::WriteSecretRequest;
use self::responses::{ErrorResponse, ReadSecretResponse, WriteSecretResponse};
use super::{SecretStore, StoreError};
use crate::config::VaultConfig;
use crate::parser::{SecretData, SecretPayload};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode, Url};
use tracing::{debug, info_span, Instrument};

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Vault KV v2 secret store
pub struct VaultClient {
    http_client: ReqwestClient,
    address: Url,
    token: String,
    namespace: Option<String>,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("address", &self.address.as_str())
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl VaultClient {
    /// Build a client without contacting the server
    ///
    /// # Errors
    /// Returns an error if the address is invalid, no token is configured, or
    /// the CA bundle cannot be loaded.
    pub fn new(config: &VaultConfig) -> Result<Self, StoreError> {
        let address = Url::parse(&config.address)
            .map_err(|e| StoreError::Config(format!("invalid Vault address '{}': {e}", config.address)))?;
        if address.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "invalid Vault address '{}'",
                config.address
            )));
        }

        let token = config.token.clone().ok_or_else(|| StoreError::Unauthorized {
            status: StatusCode::UNAUTHORIZED,
            message: "no Vault token configured (set VAULT_TOKEN)".to_string(),
        })?;

        let mut builder = ReqwestClient::builder();
        if let Some(ca_cert) = &config.ca_cert {
            // Self-signed Vault deployments ship their own CA bundle
            let pem = std::fs::read(ca_cert).map_err(|e| {
                StoreError::Config(format!("failed to read CA bundle {}: {e}", ca_cert.display()))
            })?;
            let certificates = reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| {
                StoreError::Config(format!("invalid CA bundle {}: {e}", ca_cert.display()))
            })?;
            debug!(
                "Trusting {} certificate(s) from {}",
                certificates.len(),
                ca_cert.display()
            );
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }
        let http_client = builder
            .build()
            .map_err(|e| StoreError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            address,
            token,
            namespace: config.namespace.clone(),
        })
    }

    /// Build a client and verify that its token is accepted
    ///
    /// # Errors
    /// Returns `StoreError::Unauthorized` if the session is not authenticated.
    pub async fn connect(config: &VaultConfig) -> Result<Self, StoreError> {
        debug!("Retrieving a Vault client for {}", config.address);
        let client = Self::new(config)?;
        if !client.is_authenticated().await? {
            return Err(StoreError::Unauthorized {
                status: StatusCode::FORBIDDEN,
                message: "token lookup was rejected".to_string(),
            });
        }
        Ok(client)
    }

    /// Check the token with `lookup-self`
    pub async fn is_authenticated(&self) -> Result<bool, StoreError> {
        let url = self.api_url(&["auth", "token", "lookup-self"], "")?;
        let response = self.request(Method::GET, url).send().await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            _ => Err(error_from_response(response).await),
        }
    }

    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// `{address}/v1/{prefix...}/{path...}` with every segment percent-encoded
    fn api_url(&self, prefix: &[&str], path: &str) -> Result<Url, StoreError> {
        let mut url = self.address.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                StoreError::Config(format!("invalid Vault address '{}'", self.address))
            })?;
            segments.pop_if_empty().push("v1").extend(prefix);
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }

    fn data_url(&self, mount_point: &str, path: &str) -> Result<Url, StoreError> {
        self.api_url(&[mount_point, "data"], path)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .http_client
            .request(method, url)
            .header(TOKEN_HEADER, &self.token);
        match &self.namespace {
            Some(namespace) => builder.header(NAMESPACE_HEADER, namespace),
            None => builder,
        }
    }
}

#[async_trait]
impl SecretStore for VaultClient {
    async fn read_secret(&self, mount_point: &str, path: &str) -> Result<Option<SecretData>, StoreError> {
        let span = info_span!("vault.kv.read", mount = mount_point, path = path);

        async move {
            let url = self.data_url(mount_point, path)?;
            let response = self.request(Method::GET, url).send().await?;

            match response.status() {
                StatusCode::NOT_FOUND => {
                    debug!("Secret {}/{} not found", mount_point, path);
                    Ok(None)
                }
                status if status.is_success() => {
                    let body: ReadSecretResponse = response
                        .json()
                        .await
                        .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
                    Ok(body.data.data)
                }
                _ => Err(error_from_response(response).await),
            }
        }
        .instrument(span)
        .await
    }

    async fn write_secret(
        &self,
        mount_point: &str,
        path: &str,
        payload: &SecretPayload,
    ) -> Result<WriteConfirmation, StoreError> {
        let span = info_span!("vault.kv.write", mount = mount_point, path = path);

        async move {
            let url = self.data_url(mount_point, path)?;
            let response = self
                .request(Method::POST, url)
                .json(&WriteSecretRequest::new(payload))
                .send()
                .await?;

            match response.status() {
                StatusCode::NO_CONTENT => Ok(WriteConfirmation::default()),
                status if status.is_success() => {
                    let body: WriteSecretResponse = response
                        .json()
                        .await
                        .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
                    Ok(body.data)
                }
                _ => Err(error_from_response(response).await),
            }
        }
        .instrument(span)
        .await
    }
}

/// Classify a non-success response, keeping Vault's `errors` messages
async fn error_from_response(response: Response) -> StoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(error) if !error.errors.is_empty() => error.errors.join("; "),
        _ if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string(),
        _ => body,
    };

    match status {
        StatusCode::BAD_REQUEST => StoreError::InvalidRequest { message },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized { status, message },
        _ => StoreError::Api { status, message },
    }
}
