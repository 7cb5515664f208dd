use {
    anyhow::Result,
    clap::Subcommand,
    gas_config::GlobalPaths,
    gas_oauth::{AuthOptions, Authenticator, TokenStore, now_ms},
};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Log in to Google via OAuth.
    Login {
        /// Discard any cached token and re-authenticate.
        #[arg(long)]
        force: bool,
        /// Refresh the token even if it has not expired.
        #[arg(long)]
        refresh: bool,
        /// Print the consent URL instead of opening a browser.
        #[arg(long)]
        show_url: bool,
    },
    /// Show authentication status.
    Status,
    /// Forget the stored token.
    Logout,
}

pub async fn handle_auth(action: AuthAction) -> Result<()> {
    match action {
        AuthAction::Login {
            force,
            refresh,
            show_url,
        } => login(force, refresh, show_url).await,
        AuthAction::Status => status(),
        AuthAction::Logout => logout(),
    }
}

async fn login(force: bool, refresh: bool, show_url: bool) -> Result<()> {
    let options = AuthOptions {
        force,
        refresh,
        show_url,
    };
    Authenticator::new(GlobalPaths::new())
        .authenticate(&options)
        .await?;
    println!("Successfully authenticated.");
    Ok(())
}

fn status() -> Result<()> {
    let store = TokenStore::new(GlobalPaths::new().token_file());
    match store.load() {
        None => println!("Not authenticated."),
        Some(token) => {
            let ttl = token.ttl_ms(now_ms());
            if ttl > 0 {
                let remaining = ttl / 1000;
                let hours = remaining / 3600;
                let mins = (remaining % 3600) / 60;
                println!("Authenticated [valid ({hours}h {mins}m remaining)]");
            } else {
                println!("Authenticated [expired; will refresh on next use]");
            }
        },
    }
    Ok(())
}

fn logout() -> Result<()> {
    let store = TokenStore::new(GlobalPaths::new().token_file());
    store.delete()?;
    println!("Logged out.");
    Ok(())
}
