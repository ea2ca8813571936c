use std::sync::Arc;

use tracing::info;

use crate::{
    domain::models::{NewPost, Post},
    infrastructure::{
        auth::{AuthenticatedUser, RequestIdentity},
        state::AppState,
    },
};

use super::errors::ServiceError;

pub struct PostService {
    pub state: Arc<AppState>,
}

impl PostService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn list(&self) -> Result<Vec<Post>, ServiceError> {
        Ok(self.state.posts.list().await?)
    }

    pub async fn create(
        &self,
        identity: &RequestIdentity,
        payload: NewPost,
    ) -> Result<Post, ServiceError> {
        let actor = self.authorize(identity).await?;
        let post = self.state.posts.insert(payload).await?;
        info!(post_id = %post.id, user_id = %actor.user_id, "post created");
        Ok(post)
    }

    pub async fn delete(&self, identity: &RequestIdentity, id: &str) -> Result<Post, ServiceError> {
        let actor = self.authorize(identity).await?;
        let Some(post) = self.state.posts.delete(id).await? else {
            return Err(ServiceError::NotFound(format!("Post with ID {id} not found.")));
        };
        info!(post_id = %post.id, user_id = %actor.user_id, "post deleted");
        Ok(post)
    }

    /// Stale tokens from earlier processes are already rejected at decode time; this
    /// additionally requires the subject to be registered in the current user table.
    async fn authorize<'a>(
        &self,
        identity: &'a RequestIdentity,
    ) -> Result<&'a AuthenticatedUser, ServiceError> {
        let actor = identity.require_user()?;
        if self.state.users.find_by_id(&actor.user_id).await?.is_none() {
            return Err(ServiceError::Unauthenticated);
        }
        Ok(actor)
    }
}
