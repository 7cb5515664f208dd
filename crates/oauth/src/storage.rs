use std::path::PathBuf;

use anyhow::Result;

use crate::types::TokenRecord;

/// File-based storage for the single global token record.
///
/// The path is injected at construction; production code points it at
/// `~/.google-apps-script/token.json`, tests at a temp directory.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the stored token. A missing file, empty content, or unparseable
    /// JSON all read as "no token": the caller routes to the interactive
    /// flow, none of these is an error.
    pub fn load(&self) -> Option<TokenRecord> {
        let data = std::fs::read_to_string(&self.path).ok()?;
        if data.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&data).ok()
    }

    /// Overwrite the token file with `token`, creating parent directories
    /// as needed. No merge with prior content.
    pub fn save(&self, token: &TokenRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string(token)?;
        std::fs::write(&self.path, &data)?;

        // Set file permissions to 0600 on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Remove the token file. A missing file is not an error.
    pub fn delete(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> TokenStore {
        TokenStore::new(dir.path().join("token.json"))
    }

    fn sample_token() -> TokenRecord {
        TokenRecord {
            access_token: "ya29.sample".into(),
            refresh_token: Some("1//refresh".into()),
            expiry_date: 1_700_000_000_000,
            scope: Some("https://www.googleapis.com/auth/drive email".into()),
            token_type: Some("Bearer".into()),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let token = sample_token();

        store.save(&token).unwrap();
        assert_eq!(store.load(), Some(token));
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("deep").join("token.json"));
        store.save(&sample_token()).unwrap();
        assert!(store.load().is_some());
    }

    #[test]
    fn missing_file_reads_as_no_token() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).load(), None);
    }

    #[test]
    fn empty_file_reads_as_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(dir.path().join("token.json"), "").unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn corrupt_file_reads_as_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(dir.path().join("token.json"), "{half a record").unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn save_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&sample_token()).unwrap();
        let mut replacement = sample_token();
        replacement.access_token = "ya29.other".into();
        replacement.refresh_token = None;
        store.save(&replacement).unwrap();

        assert_eq!(store.load(), Some(replacement));
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.delete().unwrap();
        store.save(&sample_token()).unwrap();
        store.delete().unwrap();
        assert_eq!(store.load(), None);
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&sample_token()).unwrap();
        let mode = std::fs::metadata(dir.path().join("token.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
