#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Extension, Router,
};
use blog_api::{
    api,
    infrastructure::{
        config::{AppConfig, AuthConfig, Config, GraphQlConfig, StorageConfig},
        state::AppState,
        storage,
    },
};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-secret";

pub fn test_config() -> Arc<Config> {
    Arc::new(Config {
        app: AppConfig::default(),
        auth: AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            jwt_ttl_seconds: 3_600,
            bcrypt_cost: 4,
        },
        storage: StorageConfig::default(),
        graphql: GraphQlConfig::default(),
    })
}

pub fn build_app() -> Result<Router> {
    let config = test_config();
    let repositories = storage::build_repositories(&config.storage)?;
    let state = Arc::new(AppState::new(Arc::clone(&config), repositories));
    Ok(api::build_router(config).layer(Extension(state)))
}

/// Posts a GraphQL document and returns the HTTP status with the decoded body.
pub async fn graphql(
    app: &Router,
    token: Option<&str>,
    query: &str,
    variables: Value,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(
        serde_json::json!({ "query": query, "variables": variables }).to_string(),
    ))?;

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let body = to_bytes(response.into_body(), 1024 * 1024).await?;
    Ok((status, serde_json::from_slice(&body)?))
}

pub fn first_error_message(body: &Value) -> Option<&str> {
    body.get("errors")?.get(0)?.get("message")?.as_str()
}

pub fn first_error_code(body: &Value) -> Option<&str> {
    body.get("errors")?
        .get(0)?
        .get("extensions")?
        .get("code")?
        .as_str()
}
