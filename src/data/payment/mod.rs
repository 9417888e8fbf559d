use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod db;

pub static PAYMENT_COLLECTION_NAME: &str = "payments";

/// Record of a completed checkout. Payments are append-only; nothing in the
/// application mutates or deletes them after the commit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    pub email: String,
    pub price: f64,

    /// Cart items cleared by this payment.
    #[serde(default)]
    pub cart_ids: Vec<Uuid>,
    /// Classes the payer was enrolled into.
    #[serde(default)]
    pub classes_ids: Vec<Uuid>,

    #[serde(
        default = "Utc::now",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub created: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        email: impl ToString,
        price: f64,
        cart_ids: Vec<Uuid>,
        classes_ids: Vec<Uuid>,
    ) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            email: email.to_string(),
            price,
            cart_ids,
            classes_ids,
            created: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_records_referenced_ids() {
        let cart = vec![Uuid::new_v4()];
        let classes = vec![Uuid::new_v4(), Uuid::new_v4()];
        let payment = Payment::new("a@x.com", 50.0, cart.clone(), classes.clone());

        assert_eq!(payment.email, "a@x.com");
        assert_eq!(payment.price, 50.0);
        assert_eq!(payment.cart_ids, cart);
        assert_eq!(payment.classes_ids, classes);
    }
}
