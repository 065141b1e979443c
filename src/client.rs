use crate::config::Credentials;
use crate::error::ForgeError;
use crate::region::Region;
use crate::types::TokenResponse;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};
use url::Url;

/// Scopes requested during the client-credentials exchange.
pub const SCOPES: &[&str] = &[
    "data:read",
    "data:write",
    "data:create",
    "data:search",
    "bucket:create",
    "bucket:read",
    "bucket:update",
    "bucket:delete",
];

/// Authenticated client for the storage and Model Derivative APIs.
///
/// One instance serves both regions: every derivative call takes the
/// [`Region`] it targets. Cloning is cheap and shares the connection pool.
#[derive(Clone, Debug)]
pub struct ForgeClient {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: Url,
    expires_at: Option<DateTime<Utc>>,
}

impl ForgeClient {
    /// Exchanges the client credentials for a two-legged access token and
    /// returns a client that sends it with every request.
    ///
    /// # Errors
    ///
    /// - `ForgeError::Configuration` if the client id or secret is empty.
    /// - `ForgeError::UrlParse` if the API path is not a valid URL.
    /// - `ForgeError::Authentication` if the token endpoint rejects the request.
    /// - `ForgeError::Request` on transport failure.
    pub async fn authenticate(credentials: &Credentials) -> Result<Self, ForgeError> {
        if credentials.client_id.is_empty() || credentials.client_secret.is_empty() {
            return Err(ForgeError::Configuration(
                "client id and secret are required".to_string(),
            ));
        }

        let base_url = Url::parse(&credentials.api_path)?;
        let url = endpoint(&base_url, &["authentication", "v2", "token"])?;
        let scope = SCOPES.join(" ");

        info!("Requesting access token for client {}", credentials.client_id);
        let response = reqwest::Client::new()
            .post(url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", scope.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_response: serde_json::Value = response.json().await.unwrap_or_default();
            error!("Failed to get your token (HTTP {})", status);
            return Err(ForgeError::Authentication {
                message: format!("HTTP {status}: {error_response}"),
            });
        }

        let token: TokenResponse = response.json().await?;
        debug!(
            "Received {} token",
            token.token_type.as_deref().unwrap_or("bearer")
        );

        let mut client = Self::with_token(&token.access_token, credentials.api_path.as_str())?;
        client.expires_at = token
            .expires_in
            .map(|secs| Utc::now() + ChronoDuration::seconds(secs));
        if let Some(expires_at) = client.expires_at {
            info!("Access token valid until {}", expires_at.to_rfc3339());
        }
        Ok(client)
    }

    /// Creates a client from an existing access token.
    ///
    /// This is useful for testing or when the token is obtained elsewhere.
    pub fn with_token(access_token: &str, base_url: &str) -> Result<Self, ForgeError> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {access_token}")).map_err(|e| {
            ForgeError::Authentication {
                message: format!("access token is not a valid header value: {e}"),
            }
        })?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let base_url = Url::parse(base_url)?;

        Ok(Self {
            client,
            base_url,
            expires_at: None,
        })
    }

    /// When the access token expires, if the token endpoint said so.
    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ForgeError> {
        endpoint(&self.base_url, segments)
    }

    /// Endpoint under the Model Derivative API of `region`.
    pub(crate) fn derivative_endpoint(
        &self,
        region: Region,
        segments: &[&str],
    ) -> Result<Url, ForgeError> {
        let mut all = region.derivative_prefix().to_vec();
        all.extend_from_slice(segments);
        self.endpoint(&all)
    }

    /// Sends the request and deserializes a successful JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ForgeError> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Sends the request, turning any non-2xx status into `ForgeError::Api`.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ForgeError> {
        let response = request.send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let error_response: serde_json::Value = response.json().await.unwrap_or_default();
            Err(ForgeError::Api {
                status,
                message: error_response.to_string(),
            })
        }
    }
}

/// Appends percent-encoded path segments to `base`.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ForgeError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ForgeError::Configuration(format!("{base} cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
