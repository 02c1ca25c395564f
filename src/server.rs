//! Keep-alive HTTP endpoint.
//!
//! Hosting platforms probe `/` to decide whether the process is alive.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{response::Json, routing::get, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Body of the `/` endpoint
pub const ALIVE_TEXT: &str = "sitebot is running!";

/// Response of the `/health` endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

async fn root() -> &'static str {
    ALIVE_TEXT
}

async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "sitebot is alive".into(),
    })
}

/// Build the keep-alive router
pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

/// Serve the keep-alive router until the listener fails
pub async fn serve(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind keep-alive server on {}", addr))?;

    info!(%addr, "Keep-alive server listening");
    axum::serve(listener, router())
        .await
        .context("Keep-alive server failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn spawn_router() -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router()).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let addr = spawn_router().await;
        let client = reqwest::Client::new();

        let root = client
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap();
        assert!(root.status().is_success());
        assert_eq!(root.text().await.unwrap(), ALIVE_TEXT);

        let health: HealthRes = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(health.ok);
        assert_eq!(health.message, "sitebot is alive");
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let addr = spawn_router().await;
        let response = reqwest::get(format!("http://{}/nope", addr)).await.unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }
}
