//! Thin wrappers over the Drive v3 endpoints used to sync Apps Script
//! content. The script bundle travels as a JSON-wrapped file body.

use anyhow::{Context, Result, bail};
use gas_config::ProjectPaths;
use gas_oauth::OAuthClient;
use tracing::debug;

/// MIME type of a JSON-wrapped Apps Script bundle.
pub const MIME_GAS_JSON: &str = "application/vnd.google-apps.script+json";

/// Which local metadata file to push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushSource {
    /// `.gas/local.json`, the locally edited state.
    Local,
    /// `.gas/remote.json`, the last pulled remote state.
    Remote,
}

/// Drive API client.
///
/// Base URLs are injected so tests can stand in a local double for the
/// upload and export endpoints.
#[derive(Debug, Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    api_url: String,
    upload_url: String,
}

impl DriveClient {
    pub fn new() -> Self {
        Self::with_base_urls(
            "https://www.googleapis.com/drive/v3".into(),
            "https://www.googleapis.com/upload/drive/v3".into(),
        )
    }

    /// A client over custom base URLs (useful for testing).
    pub fn with_base_urls(api_url: String, upload_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            upload_url,
        }
    }

    fn bearer(auth: &OAuthClient) -> Result<&str> {
        auth.access_token()
            .ok_or_else(|| anyhow::anyhow!("client is not authenticated"))
    }

    /// Push the chosen metadata file to the remote Apps Script project.
    pub async fn push(
        &self,
        auth: &OAuthClient,
        project_id: &str,
        source: PushSource,
        project: &ProjectPaths,
    ) -> Result<()> {
        let path = match source {
            PushSource::Local => project.local_file(),
            PushSource::Remote => project.remote_file(),
        };
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let url = format!("{}/files/{project_id}", self.upload_url);
        let resp = self
            .http
            .patch(&url)
            .query(&[("uploadType", "media"), ("supportsTeamDrives", "true")])
            .bearer_auth(Self::bearer(auth)?)
            .header(reqwest::header::CONTENT_TYPE, MIME_GAS_JSON)
            .body(content)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("push request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("push failed ({status}): {body}");
        }
        debug!(project_id, "pushed script content");
        Ok(())
    }

    /// Fetch the remote project content and store it as `.gas/remote.json`.
    pub async fn pull(
        &self,
        auth: &OAuthClient,
        project_id: &str,
        project: &ProjectPaths,
    ) -> Result<String> {
        let url = format!("{}/files/{project_id}/export", self.api_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("mimeType", MIME_GAS_JSON), ("supportsTeamDrives", "true")])
            .bearer_auth(Self::bearer(auth)?)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("pull request failed: {e}"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| anyhow::anyhow!("failed to read pull response: {e}"))?;
        if !status.is_success() {
            bail!("pull failed ({status}): {body}");
        }

        std::fs::create_dir_all(project.meta_dir())?;
        std::fs::write(project.remote_file(), &body)
            .with_context(|| format!("failed to write {}", project.remote_file().display()))?;
        debug!(project_id, "pulled script content");
        Ok(body)
    }
}

impl Default for DriveClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use gas_oauth::TokenRecord;
    use mockito::Matcher;

    use super::*;

    fn authenticated() -> OAuthClient {
        OAuthClient {
            client_id: "id".into(),
            client_secret: None,
            redirect_uri: "http://localhost:9012".into(),
            custom: false,
            credentials: Some(TokenRecord {
                access_token: "at".into(),
                refresh_token: None,
                expiry_date: i64::MAX,
                scope: None,
                token_type: Some("Bearer".into()),
            }),
        }
    }

    fn project_in(dir: &tempfile::TempDir) -> ProjectPaths {
        ProjectPaths::new(dir.path().to_path_buf())
    }

    fn client_for(server: &mockito::Server) -> DriveClient {
        DriveClient::with_base_urls(
            format!("{}/drive/v3", server.url()),
            format!("{}/upload/drive/v3", server.url()),
        )
    }

    #[tokio::test]
    async fn push_uploads_local_content_as_script_json() {
        let mut server = mockito::Server::new_async().await;
        let upload = server
            .mock("PATCH", "/upload/drive/v3/files/proj-1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("uploadType".into(), "media".into()),
                Matcher::UrlEncoded("supportsTeamDrives".into(), "true".into()),
            ]))
            .match_header("authorization", "Bearer at")
            .match_header("content-type", MIME_GAS_JSON)
            .match_body(r#"{"files": []}"#)
            .with_status(200)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let project = project_in(&dir);
        std::fs::create_dir_all(project.meta_dir()).unwrap();
        std::fs::write(project.local_file(), r#"{"files": []}"#).unwrap();

        client_for(&server)
            .push(&authenticated(), "proj-1", PushSource::Local, &project)
            .await
            .unwrap();
        upload.assert_async().await;
    }

    #[tokio::test]
    async fn push_without_metadata_file_is_an_error() {
        let server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        let result = client_for(&server)
            .push(&authenticated(), "proj-1", PushSource::Local, &project_in(&dir))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn push_surfaces_api_failures() {
        let mut server = mockito::Server::new_async().await;
        let _upload = server
            .mock("PATCH", "/upload/drive/v3/files/proj-1")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("insufficient permissions")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let project = project_in(&dir);
        std::fs::create_dir_all(project.meta_dir()).unwrap();
        std::fs::write(project.local_file(), "{}").unwrap();

        let result = client_for(&server)
            .push(&authenticated(), "proj-1", PushSource::Local, &project)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn pull_writes_remote_metadata() {
        let mut server = mockito::Server::new_async().await;
        let export = server
            .mock("GET", "/drive/v3/files/proj-1/export")
            .match_query(Matcher::UrlEncoded("mimeType".into(), MIME_GAS_JSON.into()))
            .with_status(200)
            .with_body(r#"{"files": [{"name": "Code"}]}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let project = project_in(&dir);

        let body = client_for(&server)
            .pull(&authenticated(), "proj-1", &project)
            .await
            .unwrap();
        export.assert_async().await;
        assert_eq!(body, r#"{"files": [{"name": "Code"}]}"#);
        assert_eq!(
            std::fs::read_to_string(project.remote_file()).unwrap(),
            body
        );
    }

    #[tokio::test]
    async fn unauthenticated_client_is_rejected_locally() {
        let server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let project = project_in(&dir);
        std::fs::create_dir_all(project.meta_dir()).unwrap();
        std::fs::write(project.local_file(), "{}").unwrap();

        let mut auth = authenticated();
        auth.credentials = None;

        let result = client_for(&server)
            .push(&auth, "proj-1", PushSource::Local, &project)
            .await;
        assert!(result.is_err());
    }
}
