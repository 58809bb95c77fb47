#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

use doc_gateway::config::AppConfig;
use doc_gateway::database::DatabaseManager;
use doc_gateway::middleware::GatewayContext;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Serve a fresh in-memory store on an unused port. Each test gets its own.
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.database.url = "memory://".to_string();
        config.api.port = port;
        config.api.enable_request_logging = false;

        let store = DatabaseManager::connect(&config.database).await?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        let app = doc_gateway::app(GatewayContext::new(store, config));

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a document and return the created body
    pub async fn create(&self, entity: &str, body: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.url(&format!("/{}", entity)))
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        Ok(res.json().await?)
    }

    /// GET a list with raw query pairs
    pub async fn list(&self, entity: &str, query: &[(&str, &str)]) -> Result<(StatusCode, Value)> {
        let res = self
            .client
            .get(self.url(&format!("/{}", entity)))
            .query(query)
            .send()
            .await?;
        let status = res.status();
        Ok((status, res.json().await?))
    }
}
