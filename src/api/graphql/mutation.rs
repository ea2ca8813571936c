use std::sync::Arc;

use async_graphql::{Context, Object, Result, ID};

use crate::{
    domain::models::NewPost,
    infrastructure::{auth::RequestIdentity, state::AppState},
    services::{accounts::AccountService, errors::ServiceError, posts::PostService},
    validation::rules::Credentials,
};

use super::types::{Post, Token, User};

pub struct MutationRoot;

fn state(ctx: &Context<'_>) -> Result<Arc<AppState>> {
    ctx.data::<Arc<AppState>>().map(Arc::clone)
}

fn identity<'a>(ctx: &Context<'a>) -> &'a RequestIdentity {
    static ANONYMOUS: RequestIdentity = RequestIdentity::Anonymous;
    ctx.data_opt::<RequestIdentity>().unwrap_or(&ANONYMOUS)
}

fn to_graphql(err: ServiceError) -> async_graphql::Error {
    err.into_graphql_error()
}

#[Object]
impl MutationRoot {
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> Result<User> {
        let user = AccountService::new(state(ctx)?)
            .register(Credentials { username, password })
            .await
            .map_err(to_graphql)?;
        Ok(user.into())
    }

    async fn login_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> Result<Token> {
        let outcome = AccountService::new(state(ctx)?)
            .login(Credentials { username, password })
            .await
            .map_err(to_graphql)?;
        Ok(outcome.into())
    }

    async fn create_post(
        &self,
        ctx: &Context<'_>,
        title: String,
        content: String,
    ) -> Result<Post> {
        let post = PostService::new(state(ctx)?)
            .create(identity(ctx), NewPost { title, content })
            .await
            .map_err(to_graphql)?;
        Ok(post.into())
    }

    async fn delete_post(&self, ctx: &Context<'_>, id: ID) -> Result<Post> {
        let post = PostService::new(state(ctx)?)
            .delete(identity(ctx), id.as_str())
            .await
            .map_err(to_graphql)?;
        Ok(post.into())
    }

    async fn show_users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let users = AccountService::new(state(ctx)?)
            .list_users()
            .await
            .map_err(to_graphql)?;
        Ok(users.into_iter().map(User::from).collect())
    }
}
