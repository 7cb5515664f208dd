use serde::{Deserialize, Serialize};

/// Scopes requested during consent.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/drive.scripts",
    "email",
];

/// Built-in public OAuth client, used when no custom client is configured.
/// Its secret lives in the hosted relay, never in this binary.
pub const DEFAULT_CLIENT_ID: &str =
    "671639553297-1fo6jqpabv9q0uc9j3beob7hj5ukmtph.apps.googleusercontent.com";

/// Remaining lifetime under which a token counts as expired.
pub const EXPIRY_MARGIN_MS: i64 = 10_000;

/// A stored token in Google's wire format. Persisted verbatim as the token
/// file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Epoch milliseconds when the access token expires.
    pub expiry_date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl TokenRecord {
    /// Remaining lifetime relative to `now_ms`. Negative once expired.
    pub fn ttl_ms(&self, now_ms: i64) -> i64 {
        self.expiry_date - now_ms
    }
}

/// Current wall-clock time as epoch milliseconds.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// An OAuth2 client descriptor: the application identity plus, once
/// authenticated, its active credentials.
///
/// Built once per authentication attempt. Only `credentials` changes after
/// construction.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    /// True when the id/secret came from the user's config file.
    pub custom: bool,
    pub credentials: Option<TokenRecord>,
}

impl OAuthClient {
    pub fn access_token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|t| t.access_token.as_str())
    }
}

/// Options for one authentication attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthOptions {
    /// Discard any cached token before authenticating.
    pub force: bool,
    /// Refresh the token even if it has not expired.
    pub refresh: bool,
    /// Print the consent URL instead of opening a browser.
    pub show_url: bool,
}

/// Every external URL the auth flow talks to.
///
/// Injected into the orchestrator at construction so tests can stand in
/// local doubles for the provider, the relay, and the telemetry sink.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Provider consent screen.
    pub auth_url: String,
    /// Provider token endpoint (custom-client exchange and refresh).
    pub token_url: String,
    /// Hosted relay performing exchange for the secret-less default client.
    pub relay_url: String,
    /// Static page the browser is sent to after the callback.
    pub success_url: String,
    /// Profile endpoint used for usage logging.
    pub userinfo_url: String,
    /// Fire-and-forget usage log sink.
    pub telemetry_url: String,
    /// Local redirect target; its port is where the callback listener binds.
    pub redirect_uri: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".into(),
            token_url: "https://oauth2.googleapis.com/token".into(),
            relay_url: "https://us-central1-gas-include.cloudfunctions.net/getToken".into(),
            success_url: "https://gas-include.firebaseapp.com/info/auth_successful.html".into(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".into(),
            telemetry_url: "https://gas-include.firebaseio.com/logs/auth.json".into(),
            redirect_uri: "http://localhost:9012".into(),
        }
    }
}

impl Endpoints {
    /// The callback port, parsed from the redirect URI.
    pub fn redirect_port(&self) -> u16 {
        url::Url::parse(&self.redirect_uri)
            .ok()
            .and_then(|u| u.port())
            .unwrap_or(9012)
    }
}
