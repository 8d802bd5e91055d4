use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use courier_api::auth::AppStateInner;
use courier_api::router;
use courier_api::token::TokenService;
use courier_db::{Database, DbConfig};

pub const SECRET: &str = "integration-secret";

pub struct TestApp {
    pub router: Router,
    pub tokens: TokenService,
    path: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("courier-api-{}.db", uuid::Uuid::new_v4()));
        let db = Arc::new(
            Database::open(&DbConfig {
                path: path.clone(),
                reader_pool_size: 2,
            })
            .expect("open db"),
        );
        let tokens = TokenService::new(SECRET, Duration::hours(1));
        let state = Arc::new(AppStateInner::new(db, tokens.clone()));
        Self {
            router: router(state),
            tokens,
            path,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn add_user(&self, first: &str, last: &str, is_admin: bool) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/users/newUser",
                None,
                Some(serde_json::json!({ "firstName": first, "lastName": last, "isAdmin": is_admin })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["userID"].as_i64().unwrap()
    }

    pub async fn login(&self, user_id: i64) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/login",
                None,
                Some(serde_json::json!({ "userID": user_id, "password": "ignored" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["token"].as_str().unwrap().to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut p = self.path.clone().into_os_string();
            p.push(suffix);
            let _ = std::fs::remove_file(p);
        }
    }
}
