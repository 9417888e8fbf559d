use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod db;

pub static CART_COLLECTION_NAME: &str = "cart";

/// A pending, unpaid class selection. Cart items are removed one by one from
/// the cart page, or in bulk when a checkout commits.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    pub email: String,

    #[serde(with = "bson::serde_helpers::uuid_1_as_binary")]
    pub class_id: Uuid,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,

    pub price: f64,
}
