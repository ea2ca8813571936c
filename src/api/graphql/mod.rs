//! GraphQL endpoint backed by async-graphql.
//!
//! Shared state and the caller's [`RequestIdentity`] are attached to each request as
//! request data rather than schema data, so resolvers only ever see the identity of
//! the request they are serving.

use std::sync::Arc;

use async_graphql::{http::GraphiQLSource, EmptySubscription, Schema};
use axum::{
    extract::Extension,
    response::Html,
    routing::{get, post},
    Json, Router,
};

use crate::infrastructure::{auth::RequestIdentity, config::GraphQlConfig, state::AppState};

pub mod mutation;
pub mod query;
pub mod types;

use self::{mutation::MutationRoot, query::QueryRoot};

pub type BlogSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema() -> BlogSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).finish()
}

pub fn router(config: &GraphQlConfig) -> Router {
    let route = if config.playground {
        get(playground).post(handler)
    } else {
        post(handler)
    };
    Router::new()
        .route("/graphql", route)
        .layer(Extension(build_schema()))
}

async fn handler(
    Extension(schema): Extension<BlogSchema>,
    Extension(state): Extension<Arc<AppState>>,
    identity: RequestIdentity,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let request = request.data(state).data(identity);
    Json(schema.execute(request).await)
}

async fn playground() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_exposes_credential_free_user_type() {
        let sdl = build_schema().sdl();

        let start = sdl.find("type User {").expect("User type in schema");
        let end = start + sdl[start..].find('}').expect("end of User type");
        let user_type = &sdl[start..end];
        assert!(user_type.contains("username: String!"));
        assert!(!user_type.contains("password"));

        for field in ["createUser", "loginUser", "createPost", "deletePost", "showUsers"] {
            assert!(sdl.contains(field), "missing mutation {field}");
        }
    }
}
