#![allow(dead_code)]

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

use task_api::auth::credentials::UserEntry;
use task_api::auth::TokenService;
use task_api::config::AppConfig;
use task_api::AppState;

pub const USERNAME: &str = "user";
pub const PASSWORD: &str = "password";

/// A server on an ephemeral port backed by its own in-memory SQLite store.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub config: AppConfig,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let mut config = AppConfig::development()?;
        config.database.url = "sqlite::memory:".to_string();
        config.api.enable_request_logging = false;
        let cost = config.security.password_cost;
        config.security.users = vec![
            UserEntry::new(USERNAME, PASSWORD, vec!["USER".to_string()], cost)?,
            UserEntry::new("auditor", "auditor-pass", vec!["AUDITOR".to_string()], cost)?,
        ];

        let state = AppState::initialize(&config).await.context("failed to initialize state")?;
        let app = task_api::app(state, &config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: Client::new(),
            config,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status().is_success(), "login failed with {}", res.status());

        let body = res.json::<Value>().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    pub async fn user_token(&self) -> Result<String> {
        self.login(USERNAME, PASSWORD).await
    }

    /// Token signed with the server's secret but issued at an arbitrary time.
    pub fn token_issued_at(&self, issued_at: DateTime<Utc>) -> String {
        let tokens = TokenService::from_config(&self.config.security);
        tokens
            .issue_at(USERNAME, &["USER".to_string()], issued_at)
            .expect("token generation")
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn put(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    /// Creates a task and returns the response body.
    pub async fn create_task(&self, token: &str, body: Value) -> Result<Value> {
        let res = self.post("/api/tasks", token).json(&body).send().await?;
        anyhow::ensure!(res.status() == reqwest::StatusCode::CREATED, "create failed with {}", res.status());
        Ok(res.json::<Value>().await?)
    }
}
