use gas_config::{GasConfig, GlobalPaths};

use crate::types::{DEFAULT_CLIENT_ID, Endpoints, OAuthClient};

/// Build the OAuth client descriptor for this run.
///
/// A `client.id`/`client.secret` pair in the global config overrides the
/// built-in public client; an absent config file selects the default. A
/// config file that exists but cannot be parsed propagates as an error and
/// aborts authentication.
pub fn build_client(paths: &GlobalPaths, endpoints: &Endpoints) -> anyhow::Result<OAuthClient> {
    let config = GasConfig::load(&paths.config_file())?;

    let client = match config.client {
        Some(custom) => OAuthClient {
            client_id: custom.id,
            client_secret: Some(custom.secret),
            redirect_uri: endpoints.redirect_uri.clone(),
            custom: true,
            credentials: None,
        },
        None => OAuthClient {
            client_id: DEFAULT_CLIENT_ID.into(),
            client_secret: None,
            redirect_uri: endpoints.redirect_uri.clone(),
            custom: false,
            credentials: None,
        },
    };

    Ok(client)
}
