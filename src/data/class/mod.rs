use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod db;

pub static CLASS_COLLECTION_NAME: &str = "classes";

/// Listing moderation state. New classes start out pending and an admin
/// approves or denies them; only approved classes are shown publicly.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    Pending,
    Approved,
    Denied,
}

impl ClassStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassStatus::Pending => "pending",
            ClassStatus::Approved => "approved",
            ClassStatus::Denied => "denied",
        }
    }
}

impl Default for ClassStatus {
    fn default() -> Self {
        ClassStatus::Pending
    }
}

impl std::fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Class {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub instructor_name: Option<String>,
    pub instructor_email: String,

    pub seats: i64,
    pub price: f64,

    #[serde(default)]
    pub status: ClassStatus,
    #[serde(default)]
    pub feedback: Option<String>,

    /// Emails of enrolled students, appended on successful checkout.
    #[serde(default)]
    pub students: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ClassStatus::Approved).unwrap(),
            "\"approved\""
        );
    }

    #[test]
    fn new_class_defaults_to_pending_without_students() {
        let class: Class = serde_json::from_str(
            r#"{
                "name": "Rust 101",
                "instructor_email": "i@x.com",
                "seats": 30,
                "price": 50.0
            }"#,
        )
        .unwrap();

        assert_eq!(class.status, ClassStatus::Pending);
        assert!(class.students.is_empty());
        assert!(class.feedback.is_none());
    }
}
