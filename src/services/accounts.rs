use std::sync::Arc;

use tracing::info;

use crate::{
    domain::models::{NewUser, User},
    infrastructure::{
        auth::{hash_password, issue_token, verify_password},
        state::AppState,
    },
    validation::rules::{validate_credentials, Credentials},
};

use super::errors::ServiceError;

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

pub struct AccountService {
    pub state: Arc<AppState>,
}

impl AccountService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn register(&self, credentials: Credentials) -> Result<User, ServiceError> {
        validate_credentials(&credentials)?;

        if self
            .state
            .users
            .find_by_username(&credentials.username)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict("User already exists.".into()));
        }

        let password_hash =
            hash_password(credentials.password, self.state.config.auth.bcrypt_cost).await?;
        let user = self
            .state
            .users
            .insert(NewUser {
                username: credentials.username,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    pub async fn login(&self, credentials: Credentials) -> Result<LoginOutcome, ServiceError> {
        validate_credentials(&credentials)?;

        let Some(user) = self
            .state
            .users
            .find_by_username(&credentials.username)
            .await?
        else {
            return Err(ServiceError::NotFound("User not found.".into()));
        };

        if !verify_password(credentials.password, user.password_hash.clone()).await? {
            return Err(ServiceError::InvalidPassword);
        }

        let token = issue_token(&self.state, &user)?;
        info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome { token, user })
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.state.users.list().await?)
    }
}
