//! Typed GraphQL client for the blog's fixed operation set.
//!
//! The client drives any tower service that speaks `Request<Body>`, so the same code
//! works against the in-process router or an HTTP connector. It keeps a local copy of
//! the post list: `fetch_posts` replaces it, `create_post` appends and `delete_post`
//! drops the deleted id.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response},
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use thiserror::Error;
use tower::{Service, ServiceExt};

pub const GET_POSTS: &str = "query GetPosts { posts { id title content } }";
pub const CREATE_POST: &str = "mutation CreatePost($title: String!, $content: String!) { createPost(title: $title, content: $content) { id title content } }";
pub const DELETE_POST: &str = "mutation DeletePost($id: ID!) { deletePost(id: $id) { id } }";

const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientPost {
    pub id: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{message}")]
    GraphQl {
        message: String,
        code: Option<String>,
    },
    #[error("response carried no data")]
    EmptyResponse,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    extensions: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostsData {
    posts: Vec<ClientPost>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePostData {
    create_post: ClientPost,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletePostData {
    delete_post: DeletedPost,
}

#[derive(Deserialize)]
struct DeletedPost {
    id: String,
}

pub struct BlogClient<S> {
    service: S,
    endpoint: String,
    token: Option<String>,
    posts: Vec<ClientPost>,
}

impl<S> BlogClient<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone,
    S::Error: std::fmt::Display,
{
    pub fn new(service: S) -> Self {
        Self {
            service,
            endpoint: "/graphql".to_string(),
            token: None,
            posts: Vec::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets or clears the bearer token sent with every later request.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn posts(&self) -> &[ClientPost] {
        &self.posts
    }

    pub async fn fetch_posts(&mut self) -> Result<&[ClientPost], ClientError> {
        let data: PostsData = self.execute(GET_POSTS, json!({})).await?;
        self.posts = data.posts;
        Ok(&self.posts)
    }

    pub async fn create_post(
        &mut self,
        title: &str,
        content: &str,
    ) -> Result<ClientPost, ClientError> {
        let data: CreatePostData = self
            .execute(CREATE_POST, json!({ "title": title, "content": content }))
            .await?;
        self.posts.push(data.create_post.clone());
        Ok(data.create_post)
    }

    /// Deletes the post and removes it from the cached list. Returns the deleted id.
    pub async fn delete_post(&mut self, id: &str) -> Result<String, ClientError> {
        let data: DeletePostData = self.execute(DELETE_POST, json!({ "id": id })).await?;
        let deleted = data.delete_post.id;
        self.posts.retain(|post| post.id != deleted);
        Ok(deleted)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, ClientError> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.as_str())
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let payload = json!({ "query": query, "variables": variables });
        let request = builder
            .body(Body::from(payload.to_string()))
            .map_err(|err| ClientError::Transport(err.to_string()))?;

        let response = self
            .service
            .clone()
            .oneshot(request)
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        let bytes = to_bytes(response.into_body(), MAX_RESPONSE_BYTES)
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;

        let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
        if let Some(error) = envelope.errors.into_iter().next() {
            let code = error
                .extensions
                .as_ref()
                .and_then(|extensions| extensions.get("code"))
                .and_then(Value::as_str)
                .map(str::to_string);
            return Err(ClientError::GraphQl {
                message: error.message,
                code,
            });
        }
        envelope.data.ok_or(ClientError::EmptyResponse)
    }
}
