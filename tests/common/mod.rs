//! Shared test harness for integration tests.
//!
//! [`TestHarness`] wraps an in-memory database and an [`AppContext`]; the
//! `with_server*` constructors also start Axum on a random port.

#![allow(dead_code)]

use std::net::SocketAddr;

use serde_json::{json, Value};
use vs_core::config::Config;
use vs_db::pool::{init_memory_pool, DbPool};
use vs_server::context::AppContext;
use vs_server::router::build_router;

pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
}

/// Defaults with the cheapest bcrypt cost so tests stay fast.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    config
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(db.clone(), config);
        Self { ctx, db }
    }

    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(test_config()).await
    }

    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = build_router(harness.ctx.clone(), None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    pub fn conn(&self) -> vs_db::pool::PooledConnection {
        vs_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }
}

/// POST /api/register and return the response.
pub async fn register(
    client: &reqwest::Client,
    addr: SocketAddr,
    username: &str,
    email: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(format!("http://{addr}/api/register"))
        .json(&json!({
            "username": username,
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .unwrap()
}

/// Register then log in; returns the bearer token.
pub async fn register_and_login(
    client: &reqwest::Client,
    addr: SocketAddr,
    username: &str,
    password: &str,
) -> String {
    let email = format!("{username}@example.com");
    let resp = register(client, addr, username, &email, password).await;
    assert_eq!(resp.status(), 201);

    let resp = client
        .post(format!("http://{addr}/api/login"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}
