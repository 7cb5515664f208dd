use std::path::{Path, PathBuf};

/// Directory under the user's home holding global state.
const GLOBAL_DIR_NAME: &str = ".google-apps-script";

const TOKEN_FILE: &str = "token.json";
const CONFIG_FILE: &str = "config.json";

/// Per-project metadata directory and its contents.
pub const META_DIR: &str = ".gas";
pub const META_LOCAL: &str = "local.json";
pub const META_REMOTE: &str = "remote.json";
pub const META_ID: &str = "ID";

/// Locations of the global token and config files.
///
/// Constructed with an explicit directory so tests can point it at an
/// isolated temporary location instead of the user's home.
#[derive(Debug, Clone)]
pub struct GlobalPaths {
    dir: PathBuf,
}

impl GlobalPaths {
    /// The default global directory: `~/.google-apps-script/`.
    pub fn new() -> Self {
        let dir = home_dir()
            .map(|h| h.join(GLOBAL_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(GLOBAL_DIR_NAME));
        Self { dir }
    }

    /// A global directory at a specific location (useful for testing).
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn token_file(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }
}

impl Default for GlobalPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Locations of the `.gas/` metadata files inside a project directory.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.root.join(META_DIR)
    }

    pub fn local_file(&self) -> PathBuf {
        self.meta_dir().join(META_LOCAL)
    }

    pub fn remote_file(&self) -> PathBuf {
        self.meta_dir().join(META_REMOTE)
    }

    pub fn id_file(&self) -> PathBuf {
        self.meta_dir().join(META_ID)
    }

    /// Read the linked Apps Script project id from `.gas/ID`.
    pub fn read_project_id(&self) -> anyhow::Result<String> {
        let path = self.id_file();
        let id = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        let id = id.trim().to_string();
        if id.is_empty() {
            anyhow::bail!("{} is empty, link a project first", path.display());
        }
        Ok(id)
    }
}
