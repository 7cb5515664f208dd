use anyhow::{Context, Result};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use tracing::debug;

/// One-shot listener for the OAuth redirect.
///
/// Bound up front so the consent URL is only handed out once the port is
/// actually ours. [`wait_for_code`](Self::wait_for_code) consumes the
/// server, so the socket is released on every exit path.
#[derive(Debug)]
pub struct CallbackServer {
    listener: TcpListener,
}

impl CallbackServer {
    /// Bind the redirect port on localhost.
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind callback port {port}"))?;
        Ok(Self { listener })
    }

    pub fn port(&self) -> Result<u16> {
        Ok(self.listener.local_addr()?.port())
    }

    /// Service exactly one request, then shut down.
    ///
    /// The browser is answered with a 302 to `success_url` whether or not a
    /// code arrived; the caller decides what a missing code means. Later
    /// redirect attempts find the port closed and are refused by the OS.
    pub async fn wait_for_code(self, success_url: &str) -> Result<Option<String>> {
        let (mut socket, addr) = self
            .listener
            .accept()
            .await
            .context("callback accept failed")?;
        debug!(%addr, "redirect request received");

        let mut buf = vec![0u8; 8192];
        let n = socket
            .read(&mut buf)
            .await
            .context("callback read failed")?;
        let request = String::from_utf8_lossy(&buf[..n]);
        let code = parse_code(&request);

        let response = format!(
            "HTTP/1.1 302 Found\r\nLocation: {success_url}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;

        // Dropping `self.listener` here frees the port.
        Ok(code)
    }
}

/// Pull the `code` query parameter out of the request line.
fn parse_code(request: &str) -> Option<String> {
    let first_line = request.lines().next()?;
    let target = first_line.split_whitespace().nth(1)?;
    let url = url::Url::parse(&format!("http://localhost{target}")).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.to_string())
        .filter(|code| !code.is_empty())
}
