use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Root of the global `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    /// Operator-supplied OAuth client. Absent means the built-in client.
    pub client: Option<ClientCredentials>,
}

/// A custom OAuth client id/secret pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCredentials {
    pub id: String,
    pub secret: String,
}

impl GasConfig {
    /// Load the config file at `path`.
    ///
    /// An absent file is the default configuration, not an error. A file
    /// that exists but cannot be read or parsed is an error: a corrupt
    /// config must abort authentication rather than silently select the
    /// built-in client.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            },
            Err(e) => {
                return Err(anyhow::anyhow!("failed to read {}: {e}", path.display()));
            },
        };
        serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
    }

    /// Write an empty config file if none exists yet.
    pub fn ensure_exists(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, "{}\n")?;
        debug!(path = %path.display(), "wrote empty config file");
        Ok(())
    }
}
