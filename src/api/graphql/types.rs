use async_graphql::{SimpleObject, ID};

use crate::{domain::models, services::accounts::LoginOutcome};

#[derive(Debug, Clone, SimpleObject)]
pub struct Post {
    pub id: ID,
    pub title: String,
    pub content: String,
}

/// Public view of an account. Credential fields are never part of the schema.
#[derive(Debug, Clone, SimpleObject)]
pub struct User {
    pub id: ID,
    pub username: String,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Token {
    pub token: String,
    pub user: User,
}

impl From<models::Post> for Post {
    fn from(post: models::Post) -> Self {
        Self {
            id: ID(post.id),
            title: post.title,
            content: post.content,
        }
    }
}

impl From<models::User> for User {
    fn from(user: models::User) -> Self {
        Self {
            id: ID(user.id),
            username: user.username,
        }
    }
}

impl From<LoginOutcome> for Token {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            token: outcome.token,
            user: outcome.user.into(),
        }
    }
}
