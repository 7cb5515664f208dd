use anyhow::{Result, bail};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{
    storage::TokenStore,
    types::{Endpoints, OAuthClient, TokenRecord, now_ms},
};

/// What the exchange is driven with.
#[derive(Debug)]
pub enum Grant {
    /// A freshly received authorization code, consumed exactly once.
    Code(String),
    /// Mint a new access token from the attached refresh token.
    Refresh,
}

/// Exchanges authorization codes and refresh tokens for token records and
/// persists the result.
///
/// Custom clients talk to the provider's token endpoint directly. The
/// default client delegates both operations to the hosted relay so its
/// secret never ships in this binary.
#[derive(Debug, Clone)]
pub struct TokenExchange {
    http: reqwest::Client,
    endpoints: Endpoints,
    store: TokenStore,
}

/// Provider token endpoint response.
#[derive(Debug, Deserialize)]
struct WireToken {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Seconds until expiry.
    expires_in: i64,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

impl TokenExchange {
    pub fn new(http: reqwest::Client, endpoints: Endpoints, store: TokenStore) -> Self {
        Self {
            http,
            endpoints,
            store,
        }
    }

    /// Run one exchange, attach the new record to `client`, and persist it.
    ///
    /// Persistence is attempted only after a successful exchange; a failure
    /// on either step propagates and leaves no partial state behind.
    pub async fn authorize(&self, client: &mut OAuthClient, grant: Grant) -> Result<()> {
        let token = if client.custom {
            self.exchange_custom(client, &grant).await?
        } else {
            self.exchange_relay(client, &grant).await?
        };

        client.credentials = Some(token.clone());
        self.store.save(&token)?;
        debug!(custom = client.custom, "token exchange complete");
        Ok(())
    }

    /// Direct provider exchange for operator-supplied clients.
    async fn exchange_custom(&self, client: &OAuthClient, grant: &Grant) -> Result<TokenRecord> {
        let secret = client.client_secret.as_deref().unwrap_or_default();
        let form: Vec<(&str, &str)> = match grant {
            Grant::Code(code) => vec![
                ("grant_type", "authorization_code"),
                ("code", code.as_str()),
                ("client_id", client.client_id.as_str()),
                ("client_secret", secret),
                ("redirect_uri", client.redirect_uri.as_str()),
            ],
            Grant::Refresh => {
                let refresh = client
                    .credentials
                    .as_ref()
                    .and_then(|t| t.refresh_token.as_deref())
                    .ok_or_else(|| anyhow::anyhow!("no refresh token available"))?;
                vec![
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh),
                    ("client_id", client.client_id.as_str()),
                    ("client_secret", secret),
                ]
            },
        };

        let resp = self
            .http
            .post(&self.endpoints.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("token request failed: {e}"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| anyhow::anyhow!("failed to read token response: {e}"))?;
        if !status.is_success() {
            bail!("token endpoint returned {status}: {body}");
        }

        let wire: WireToken = serde_json::from_str(&body)
            .map_err(|e| anyhow::anyhow!("invalid token response: {e}"))?;

        // A refresh response may omit the refresh token; keep the one we
        // already hold so the next refresh still works.
        let prior_refresh = client
            .credentials
            .as_ref()
            .and_then(|t| t.refresh_token.clone());

        Ok(TokenRecord {
            access_token: wire.access_token,
            refresh_token: wire.refresh_token.or(prior_refresh),
            expiry_date: now_ms() + wire.expires_in * 1000,
            scope: wire.scope,
            token_type: wire.token_type,
        })
    }

    /// Relay exchange for the default client. The body carries the code for
    /// an initial exchange or the stored record for a refresh; the two are
    /// mutually exclusive.
    async fn exchange_relay(&self, client: &OAuthClient, grant: &Grant) -> Result<TokenRecord> {
        let body = match grant {
            Grant::Code(code) => json!({ "code": code, "token": null }),
            Grant::Refresh => {
                let token = client
                    .credentials
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("no token to refresh"))?;
                json!({ "code": null, "token": token })
            },
        };

        let resp = self
            .http
            .post(&self.endpoints.relay_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("relay request failed: {e}"))?;

        if resp.status() != reqwest::StatusCode::OK {
            bail!(
                "failed to get a token from the relay ({})",
                resp.status()
            );
        }

        resp.json()
            .await
            .map_err(|e| anyhow::anyhow!("invalid relay response: {e}"))
    }
}
