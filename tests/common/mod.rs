#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use nutrical_api::config::AppConfig;
use nutrical_api::database::models::{Sex, User};
use nutrical_api::database::DietarySettingsStore;
use nutrical_api::testing::{test_state, MemoryDietarySettingsStore};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use uuid::Uuid;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryDietarySettingsStore>,
}

impl TestServer {
    /// Bind the real router on a free port inside the current runtime.
    ///
    /// Each `#[tokio::test]` owns its runtime, so every test gets its own server.
    pub async fn spawn(users: Vec<User>) -> Result<Self> {
        let store = Arc::new(MemoryDietarySettingsStore::new());
        Self::spawn_with_store(store.clone(), store, users).await
    }

    pub async fn spawn_with_store(
        store: Arc<MemoryDietarySettingsStore>,
        backend: Arc<dyn DietarySettingsStore>,
        users: Vec<User>,
    ) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.api.port = port;
        config.api.enable_request_logging = false;

        let app = nutrical_api::app::app(test_state(backend, users), &config);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self { port, base_url, store };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
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
}

pub fn male_with_profile() -> User {
    User {
        id: Uuid::new_v4(),
        sex: Sex::Male,
        weight: Some(Decimal::from(80)),
        height: Some(Decimal::from(180)),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 6, 15),
    }
}

pub fn female_without_profile() -> User {
    User {
        id: Uuid::new_v4(),
        sex: Sex::Female,
        weight: None,
        height: None,
        date_of_birth: None,
    }
}
