use anyhow::{Result, bail};
use tracing::debug;

use crate::{
    callback_server::CallbackServer,
    exchange::{Grant, TokenExchange},
    types::{AuthOptions, Endpoints, OAuthClient, SCOPES},
};

/// Build the provider consent URL for `client`: offline access and a forced
/// consent prompt, so the provider hands back a refresh token.
fn consent_url(endpoints: &Endpoints, client: &OAuthClient) -> Result<String> {
    let mut url = url::Url::parse(&endpoints.auth_url)
        .map_err(|e| anyhow::anyhow!("invalid auth url {}: {e}", endpoints.auth_url))?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &client.client_id)
        .append_pair("redirect_uri", &client.redirect_uri)
        .append_pair("scope", &SCOPES.join(" "))
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");
    Ok(url.into())
}

/// Run the full interactive consent flow: hand the consent URL to the user,
/// catch the redirect on a one-shot local listener, and exchange the
/// authorization code for a token.
///
/// The flow completes exactly once, and the listener is torn down whether
/// it completes with a token or an error.
pub async fn run_interactive(
    exchange: &TokenExchange,
    endpoints: &Endpoints,
    client: &mut OAuthClient,
    options: &AuthOptions,
) -> Result<()> {
    let server = CallbackServer::bind(endpoints.redirect_port()).await?;

    let auth_url = consent_url(endpoints, client)?;
    if options.show_url {
        println!("Please go to the following url in your browser:");
        println!("----------------------------------------------");
        println!("{auth_url}");
        println!("----------------------------------------------");
    } else if open::that(&auth_url).is_err() {
        println!("Could not open a browser. Please visit:\n{auth_url}");
    }

    println!("A webbrowser should have opened, to allow 'gas' to:");
    println!("    'View and manage the files in your Google Drive'");
    println!("    'Modify your Google Apps Script scripts' behavior'");
    println!();
    println!(
        "These permissions are necessary for pulling and pushing code from/to your Google Drive."
    );

    let Some(code) = server.wait_for_code(&endpoints.success_url).await? else {
        bail!("authorization was denied: the redirect carried no code");
    };
    debug!("authorization code received");

    exchange.authorize(client, Grant::Code(code)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consent_url_carries_offline_consent_and_scopes() {
        let endpoints = Endpoints::default();
        let client = OAuthClient {
            client_id: "my-client".into(),
            client_secret: None,
            redirect_uri: endpoints.redirect_uri.clone(),
            custom: false,
            credentials: None,
        };

        let url = consent_url(&endpoints, &client).unwrap();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=my-client"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("drive.scripts"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A9012"));
    }
}
