// Validation backends: where fresh validation contexts come from.
//
// Only the background refresh path (and startup) calls a backend; request
// handling never touches the network.
//
// The IAM backend authenticates with client credentials, then pulls the
// public signing keys and the revocation list:
//   POST {base}/iam/v3/oauth/token            (basic auth, client_credentials)
//   GET  {base}/iam/v3/oauth/jwks
//   GET  {base}/iam/v3/oauth/revocationlist   (bearer)

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::context::{RevocationList, ValidationContext};
use crate::error::AuthError;

/// Source of validation contexts.
#[async_trait]
pub trait ValidationBackend: Send + Sync {
    /// Fetch a complete, fresh validation context.
    async fn fetch_context(&self) -> Result<ValidationContext, AuthError>;
}

/// IAM service backend.
pub struct IamValidationBackend {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl IamValidationBackend {
    pub fn new(base_url: &str, client_id: String, client_secret: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
        }
    }

    async fn client_token(&self) -> Result<String, AuthError> {
        let response: TokenResponse = self
            .client
            .post(format!("{}/iam/v3/oauth/token", self.base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.access_token)
    }

    async fn jwks(&self) -> Result<JwkSet, AuthError> {
        Ok(self
            .client
            .get(format!("{}/iam/v3/oauth/jwks", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    async fn revocation_list(&self, token: &str) -> Result<RevocationList, AuthError> {
        Ok(self
            .client
            .get(format!("{}/iam/v3/oauth/revocationlist", self.base_url))
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}

#[async_trait]
impl ValidationBackend for IamValidationBackend {
    async fn fetch_context(&self) -> Result<ValidationContext, AuthError> {
        let token = self.client_token().await?;
        let jwks = self.jwks().await?;
        let revocations = self.revocation_list(&token).await?;

        debug!(
            keys = jwks.keys.len(),
            revoked_users = revocations.revoked_users.len(),
            "Fetched validation context"
        );
        Ok(ValidationContext::new(&jwks, revocations))
    }
}
