#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use presencesync_domain::{ChatConfig, GraphConfig, UserRecord};
use presencesync_infra::database::{DbManager, SqliteUserDirectory};
use presencesync_infra::HttpClient;
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a migrated temporary database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("users.db");

        let manager = DbManager::new(&db_path, 2).expect("db manager should be created");
        manager.run_migrations().expect("schema should be created");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn directory(&self) -> SqliteUserDirectory {
        SqliteUserDirectory::new(Arc::clone(&self.manager))
    }

    /// Directory seeded with `(chat id, mailbox)` pairs in order.
    pub async fn seeded_directory(&self, users: &[(&str, &str)]) -> SqliteUserDirectory {
        let directory = self.directory();
        for (chat_user_id, mailbox) in users {
            directory
                .connect_user(UserRecord::new(*chat_user_id, *mailbox))
                .await
                .expect("user should be inserted");
        }
        directory
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client with tiny backoff so retry paths stay fast.
pub fn fast_http() -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(5))
        .base_backoff(Duration::from_millis(5))
        .max_attempts(2)
        .build()
        .expect("http client")
}

/// Graph settings pointing both the API and the authority at `base`.
pub fn graph_config(base: &str) -> GraphConfig {
    GraphConfig {
        tenant_id: "tenant-1".into(),
        client_id: "client-1".into(),
        client_secret: "secret-1".into(),
        api_base_url: format!("{base}/v1.0"),
        authority_url: base.to_owned(),
        request_timeout_seconds: 5,
    }
}

pub fn chat_config(base: &str) -> ChatConfig {
    ChatConfig { base_url: base.to_owned(), bot_token: "bot-token".into(), request_timeout_seconds: 5 }
}

/// Token endpoint response body.
pub fn token_body() -> serde_json::Value {
    serde_json::json!({
        "token_type": "Bearer",
        "expires_in": 3599,
        "access_token": "app-token"
    })
}
