use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::role::Role;

pub mod db;

pub static USER_COLLECTION_NAME: &str = "users";

/// Marketplace account. Created on first signup; the email is the identity
/// the auth layer matches on (case-sensitive, unique).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn new(email: impl ToString, name: Option<String>, role: Role) -> User {
        let id = Uuid::new_v4();
        tracing::info!("Creating a new user with UUID: {}", id.to_string());

        User {
            id,
            name,
            email: email.to_string(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_defaults_to_student_role() {
        let user: User = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.email, "a@x.com");
    }
}
