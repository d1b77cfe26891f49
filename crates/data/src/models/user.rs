//! User accounts.

use serde::{Deserialize, Serialize};

use servicelane_core::{Email, UserId, UserRole};

use crate::repository::Entity;

/// A registered account: client, mechanic, or admin.
///
/// `username` and `email` are unique across the collection; the backend
/// enforces this with unique constraints and [`crate::services::UserService`]
/// pre-checks them for a friendly error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub username: String,
    pub role: UserRole,
    pub full_name: String,
    pub email: Email,
    /// Salted hash of the account password, produced by the auth
    /// collaborator. Never the cleartext.
    pub password_hash: String,
}

impl Entity for User {
    type Id = UserId;
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Option<UserId> {
        self.id
    }
}
