use std::sync::Arc;

use async_graphql::{Context, Object, Result};

use crate::{infrastructure::state::AppState, services::posts::PostService};

use super::types::Post;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<Post>> {
        let state = ctx.data::<Arc<AppState>>()?;
        let posts = PostService::new(Arc::clone(state))
            .list()
            .await
            .map_err(|err| err.into_graphql_error())?;
        Ok(posts.into_iter().map(Post::from).collect())
    }
}
