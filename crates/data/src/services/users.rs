//! User account operations.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::instrument;

use servicelane_core::{Email, UserId, UserRole};

use crate::models::User;
use crate::repository::Repository;
use crate::transport::Transport;

use super::ServiceError;

/// Fields the user search box matches against.
const SEARCH_FIELDS: &[&str] = &["full_name", "email", "username"];

/// Facade over the `users` collection.
#[derive(Clone)]
pub struct UserService {
    repo: Repository<User>,
}

impl UserService {
    pub(crate) fn new(transport: &Arc<dyn Transport>) -> Self {
        Self {
            repo: Repository::new(Arc::clone(transport)),
        }
    }

    /// Fetch a user by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, ServiceError> {
        Ok(self.repo.get(id).await?)
    }

    /// Fetch every user.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn all(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.repo.get_all().await?)
    }

    /// Find a user by username.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.repo.find_one_by("username", username).await?)
    }

    /// Find a user by email.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<User>, ServiceError> {
        Ok(self.repo.find_one_by("email", email.as_str()).await?)
    }

    /// Every user with the given role.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_role(&self, role: UserRole) -> Result<Vec<User>, ServiceError> {
        Ok(self.repo.find_by("role", role).await?)
    }

    /// Whether a username is already taken.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn username_exists(&self, username: &str) -> Result<bool, ServiceError> {
        Ok(self.repo.exists_by("username", username).await?)
    }

    /// Whether an email is already taken.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, ServiceError> {
        Ok(self.repo.exists_by("email", email.as_str()).await?)
    }

    /// Register a new account.
    ///
    /// Pre-checks username and email uniqueness so the common case fails
    /// with a friendly error before any write; the backend's unique
    /// constraints remain the authoritative guard under concurrency.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Duplicate` if the username or email is taken.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn register(&self, user: User) -> Result<User, ServiceError> {
        if self.username_exists(&user.username).await? {
            return Err(ServiceError::Duplicate {
                field: "username",
                value: user.username,
            });
        }

        if self.email_exists(&user.email).await? {
            return Err(ServiceError::Duplicate {
                field: "email",
                value: user.email.into_inner(),
            });
        }

        Ok(self.repo.create(&user).await?)
    }

    /// Case-insensitive search across name, email, and username.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn search(&self, term: &str) -> Result<Vec<User>, ServiceError> {
        Ok(self.repo.search_multiple(term, SEARCH_FIELDS).await?)
    }

    /// Mechanic id to display name, for the reporting engine.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn mechanic_names(&self) -> Result<HashMap<UserId, String>, ServiceError> {
        let mechanics = self.by_role(UserRole::Mechanic).await?;
        Ok(mechanics
            .into_iter()
            .filter_map(|user| user.id.map(|id| (id, user.full_name)))
            .collect())
    }
}
