use std::sync::Arc;

use crate::infrastructure::{
    auth::JwtKeys,
    config::Config,
    storage::{PostRepository, Repositories, UserRepository},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub jwt_keys: JwtKeys,
}

impl AppState {
    pub fn new(config: Arc<Config>, repositories: Repositories) -> Self {
        let jwt_keys = JwtKeys::new(&config.auth.jwt_secret);
        Self {
            config,
            users: repositories.users,
            posts: repositories.posts,
            jwt_keys,
        }
    }
}
