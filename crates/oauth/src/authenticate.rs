use anyhow::Result;
use gas_config::{GasConfig, GlobalPaths};
use tracing::{debug, warn};

use crate::{
    client::build_client,
    exchange::{Grant, TokenExchange},
    flow::run_interactive,
    storage::TokenStore,
    telemetry,
    types::{AuthOptions, EXPIRY_MARGIN_MS, Endpoints, OAuthClient, now_ms},
};

/// Top-level authentication entry point.
///
/// Decides between reusing the cached token, silently refreshing it, and
/// running the full interactive consent flow.
#[derive(Debug, Clone)]
pub struct Authenticator {
    paths: GlobalPaths,
    endpoints: Endpoints,
    http: reqwest::Client,
}

impl Authenticator {
    pub fn new(paths: GlobalPaths) -> Self {
        Self::with_endpoints(paths, Endpoints::default())
    }

    /// An authenticator over custom endpoints (useful for testing).
    pub fn with_endpoints(paths: GlobalPaths, endpoints: Endpoints) -> Self {
        Self {
            paths,
            endpoints,
            http: reqwest::Client::new(),
        }
    }

    /// Authenticate and return a descriptor carrying valid credentials.
    pub async fn authenticate(&self, options: &AuthOptions) -> Result<OAuthClient> {
        GasConfig::ensure_exists(&self.paths.config_file())?;

        let store = TokenStore::new(self.paths.token_file());
        if options.force {
            store.delete()?;
        }

        let mut client = build_client(&self.paths, &self.endpoints)?;
        let exchange = TokenExchange::new(
            self.http.clone(),
            self.endpoints.clone(),
            store.clone(),
        );

        let Some(token) = store.load() else {
            run_interactive(&exchange, &self.endpoints, &mut client, options).await?;
            telemetry::spawn_log_auth(self.http.clone(), self.endpoints.clone(), &client);
            return Ok(client);
        };

        let ttl = token.ttl_ms(now_ms());
        client.credentials = Some(token);

        if ttl < EXPIRY_MARGIN_MS || options.refresh {
            match exchange.authorize(&mut client, Grant::Refresh).await {
                Ok(()) => Ok(client),
                Err(err) => {
                    // The refresh token is irrecoverably invalid; full
                    // re-consent is the only way forward.
                    warn!(error = %err, "token refresh failed, falling back to interactive consent");
                    run_interactive(&exchange, &self.endpoints, &mut client, options).await?;
                    Ok(client)
                },
            }
        } else {
            debug!(ttl_ms = ttl, "cached token still valid");
            Ok(client)
        }
    }
}
