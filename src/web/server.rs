//! Web server for depot.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::auth::Authenticator;
use crate::config::{Config, HttpConfig};
use crate::{DepotError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// Web server for the file API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Identity resolution for incoming requests.
    authenticator: Arc<Authenticator>,
    /// HTTP configuration.
    http_config: HttpConfig,
}

impl WebServer {
    /// Create a new web server using the plain token authenticator.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_authenticator(config, Authenticator::plain())
    }

    /// Create a new web server with a custom authenticator.
    pub fn with_authenticator(config: &Config, authenticator: Authenticator) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.http.host, config.http.port)
            .parse()
            .map_err(|e| {
                DepotError::Config(format!(
                    "invalid listen address {}:{}: {e}",
                    config.http.host, config.http.port
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::from_config(config)),
            authenticator: Arc::new(authenticator),
            http_config: config.http.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    async fn bind(self) -> Result<(TcpListener, axum::Router, SocketAddr)> {
        let router = create_router(self.app_state, self.authenticator, &self.http_config);
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        Ok((listener, router, local_addr))
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> Result<()> {
        let (listener, router, _) = self.bind().await?;
        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let (listener, router, local_addr) = self.bind().await?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn create_test_config(root: &str) -> Config {
        Config {
            root: root.to_string(),
            http: HttpConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_web_server_new() {
        let server = WebServer::new(&create_test_config(".")).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[test]
    fn test_web_server_invalid_host() {
        let mut config = create_test_config(".");
        config.http.host = "not a host".to_string();

        assert!(matches!(
            WebServer::new(&config),
            Err(DepotError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = create_test_config(dir.path().to_str().unwrap());

        let addr = WebServer::new(&config).unwrap().run_with_addr().await.unwrap();

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /proj1 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 401"), "{response}");
    }
}
