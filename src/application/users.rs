use std::sync::Arc;

use crate::application::error::{ServiceError, ensure_non_empty, ensure_positive_id};
use crate::application::repos::{CreateUserParams, UsersRepo};
use crate::domain::entities::UserRecord;

#[derive(Debug, Clone)]
pub struct CreateUserCommand {
    pub username: String,
    pub email: String,
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UsersRepo>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UsersRepo>) -> Self {
        Self { repo }
    }

    pub async fn list_all(&self) -> Result<Vec<UserRecord>, ServiceError> {
        self.repo.list_all().await.map_err(ServiceError::from)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<UserRecord, ServiceError> {
        ensure_positive_id(id)?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound { entity: "user" })
    }

    /// Uniqueness of username and email is enforced by storage and surfaces
    /// as [`RepoError::Duplicate`](crate::application::repos::RepoError::Duplicate).
    pub async fn create(&self, command: CreateUserCommand) -> Result<UserRecord, ServiceError> {
        let username = command.username.trim().to_string();
        let email = command.email.trim().to_ascii_lowercase();
        ensure_non_empty(&username, "username")?;
        ensure_non_empty(&email, "email")?;

        self.repo
            .create_user(CreateUserParams { username, email })
            .await
            .map_err(ServiceError::from)
    }
}
