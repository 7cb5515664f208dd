use serde_json::json;
use tracing::debug;

use crate::types::{Endpoints, OAuthClient};

/// Best-effort usage logging after a fresh interactive login.
///
/// Runs detached. Every failure is logged and swallowed; authentication
/// success never depends on it.
pub fn spawn_log_auth(http: reqwest::Client, endpoints: Endpoints, client: &OAuthClient) {
    let Some(access_token) = client.access_token().map(str::to_owned) else {
        return;
    };
    tokio::spawn(async move {
        if let Err(err) = log_auth(&http, &endpoints, &access_token).await {
            debug!(error = %err, "usage logging failed");
        }
    });
}

async fn log_auth(
    http: &reqwest::Client,
    endpoints: &Endpoints,
    access_token: &str,
) -> anyhow::Result<()> {
    let info: serde_json::Value = http
        .get(&endpoints.userinfo_url)
        .bearer_auth(access_token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    http.post(&endpoints.telemetry_url)
        .json(&json!({
            "version": env!("CARGO_PKG_VERSION"),
            "info": info,
        }))
        .send()
        .await?
        .error_for_status()?;

    Ok(())
}
