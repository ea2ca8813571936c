use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use thiserror::Error;

use crate::{
    domain::models::{NewPost, NewUser, Post, User},
    infrastructure::config::StorageConfig,
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user, failing with [`RepositoryError::Duplicate`] when the username is taken.
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: NewPost) -> Result<Post, RepositoryError>;
    async fn list(&self) -> Result<Vec<Post>, RepositoryError>;
    /// Removes and returns the post, or `None` when no post has that id.
    async fn delete(&self, id: &str) -> Result<Option<Post>, RepositoryError>;
}

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
}

pub fn build_repositories(config: &StorageConfig) -> anyhow::Result<Repositories> {
    match config.provider.as_str() {
        "memory" => Ok(Repositories {
            users: Arc::new(MemoryUserRepository::default()),
            posts: Arc::new(MemoryPostRepository::default()),
        }),
        other => anyhow::bail!("unsupported storage provider: {other}"),
    }
}

/// Hands out "1", "2", ... and never reuses a value, even after deletes.
#[derive(Default)]
struct SequentialIds {
    last: AtomicU64,
}

impl SequentialIds {
    fn next(&self) -> String {
        (self.last.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    ids: SequentialIds,
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write();
        if users.iter().any(|existing| existing.username == user.username) {
            return Err(RepositoryError::Duplicate(user.username));
        }
        let record = User {
            id: self.ids.next(),
            username: user.username,
            password_hash: user.password_hash,
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.users.read().clone())
    }
}

#[derive(Default)]
pub struct MemoryPostRepository {
    ids: SequentialIds,
    posts: RwLock<Vec<Post>>,
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn insert(&self, post: NewPost) -> Result<Post, RepositoryError> {
        let record = Post {
            id: self.ids.next(),
            title: post.title,
            content: post.content,
        };
        self.posts.write().push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<Post>, RepositoryError> {
        Ok(self.posts.read().clone())
    }

    async fn delete(&self, id: &str) -> Result<Option<Post>, RepositoryError> {
        let mut posts = self.posts.write();
        let Some(index) = posts.iter().position(|post| post.id == id) else {
            return Ok(None);
        };
        Ok(Some(posts.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn new_post(title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn user_insert_rejects_duplicate_usernames() {
        let repo = MemoryUserRepository::default();
        let alice = repo.insert(new_user("alice")).await.unwrap();
        assert_eq!(alice.id, "1");

        let err = repo.insert(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(name) if name == "alice"));

        let bob = repo.insert(new_user("bob")).await.unwrap();
        assert_eq!(bob.id, "2");
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn user_lookups_match_id_and_username() {
        let repo = MemoryUserRepository::default();
        let alice = repo.insert(new_user("alice")).await.unwrap();

        assert_eq!(repo.find_by_id(&alice.id).await.unwrap(), Some(alice.clone()));
        assert_eq!(
            repo.find_by_username("alice").await.unwrap(),
            Some(alice)
        );
        assert_eq!(repo.find_by_username("bob").await.unwrap(), None);
        assert_eq!(repo.find_by_id("42").await.unwrap(), None);
    }

    #[tokio::test]
    async fn post_delete_removes_only_the_matching_post() {
        let repo = MemoryPostRepository::default();
        let first = repo.insert(new_post("first")).await.unwrap();
        let second = repo.insert(new_post("second")).await.unwrap();

        let removed = repo.delete(&first.id).await.unwrap();
        assert_eq!(removed, Some(first.clone()));
        assert_eq!(repo.list().await.unwrap(), vec![second]);
        assert_eq!(repo.delete(&first.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn post_ids_are_not_reused_after_delete() {
        let repo = MemoryPostRepository::default();
        repo.insert(new_post("one")).await.unwrap();
        let two = repo.insert(new_post("two")).await.unwrap();
        repo.delete(&two.id).await.unwrap();

        let three = repo.insert(new_post("three")).await.unwrap();
        assert_eq!(three.id, "3");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = StorageConfig {
            provider: "postgres".to_string(),
        };
        let err = build_repositories(&config).err().expect("expected failure");
        assert!(err.to_string().contains("postgres"));
    }
}
