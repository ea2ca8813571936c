use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
    response::IntoResponse,
    Json,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    domain::models::User, infrastructure::state::AppState, services::errors::ServiceError,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Instance that signed the token. User ids restart with every process, so a
    /// token is only honoured by the instance that issued it.
    pub sid: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub instance: String,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            instance: uuid::Uuid::new_v4().simple().to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("token was issued by another instance")]
    ForeignInstance,
}

pub fn issue_token(state: &AppState, user: &User) -> Result<String, ServiceError> {
    let now = chrono::Utc::now();
    let expiration = now
        + chrono::Duration::from_std(state.config.jwt_ttl())
            .map_err(|_| ServiceError::Internal("failed to calculate expiration".into()))?;
    let claims = Claims {
        sub: user.id.clone(),
        sid: state.jwt_keys.instance.clone(),
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &state.jwt_keys.encoding,
    )
    .map_err(|err| ServiceError::Internal(err.to_string()))
}

pub fn verify_token(keys: &JwtKeys, token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    let claims = decode::<Claims>(token, &keys.decoding, &validation)?.claims;
    if claims.sid != keys.instance {
        return Err(TokenError::ForeignInstance);
    }
    Ok(claims)
}

pub async fn hash_password(password: String, cost: u32) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|err| ServiceError::Internal(err.to_string()))?
        .map_err(|err| ServiceError::Internal(err.to_string()))
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, ServiceError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|err| ServiceError::Internal(err.to_string()))?
        .map_err(|err| ServiceError::Internal(err.to_string()))
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing application state")]
    MissingState,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::INTERNAL_SERVER_ERROR;
        let message = match self {
            AuthError::MissingState => "application state unavailable",
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Who is calling, derived only from the token attached to the current request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestIdentity {
    #[default]
    Anonymous,
    User(AuthenticatedUser),
}

impl RequestIdentity {
    pub fn from_headers(keys: &JwtKeys, headers: &HeaderMap) -> Self {
        let Some(header_value) = headers.get(axum::http::header::AUTHORIZATION) else {
            return RequestIdentity::Anonymous;
        };
        let Ok(header_str) = header_value.to_str() else {
            warn!("authorization header is not valid utf-8");
            return RequestIdentity::Anonymous;
        };
        let token = match header_str.trim().split_once(' ') {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
            _ => header_str.trim(),
        };
        if token.is_empty() {
            return RequestIdentity::Anonymous;
        }
        match verify_token(keys, token) {
            Ok(claims) => RequestIdentity::User(AuthenticatedUser {
                user_id: claims.sub,
            }),
            Err(err) => {
                warn!(error = ?err, "failed to decode jwt, treating caller as anonymous");
                RequestIdentity::Anonymous
            }
        }
    }

    pub fn require_user(&self) -> Result<&AuthenticatedUser, ServiceError> {
        match self {
            RequestIdentity::User(user) => Ok(user),
            RequestIdentity::Anonymous => Err(ServiceError::Unauthenticated),
        }
    }
}

#[async_trait]
impl FromRequestParts<()> for RequestIdentity {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &()) -> Result<Self, Self::Rejection> {
        let Some(state) = parts.extensions.get::<Arc<AppState>>() else {
            return Err(AuthError::MissingState);
        };
        Ok(RequestIdentity::from_headers(&state.jwt_keys, &parts.headers))
    }
}
