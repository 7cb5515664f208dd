pub mod authenticate;
pub mod callback_server;
pub mod client;
pub mod exchange;
pub mod flow;
pub mod storage;
pub mod telemetry;
pub mod types;

pub use {
    authenticate::Authenticator,
    callback_server::CallbackServer,
    client::build_client,
    exchange::{Grant, TokenExchange},
    storage::TokenStore,
    types::{AuthOptions, Endpoints, OAuthClient, TokenRecord, now_ms},
};
