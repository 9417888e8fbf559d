use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod db;

pub static TOY_COLLECTION_NAME: &str = "toys";

/// Listing in the legacy toy catalogue this server also hosts. The fields
/// mirror what the web client uploads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Toy {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    pub toy_name: String,
    #[serde(default)]
    pub toy_image: Option<String>,
    pub category: String,

    pub toy_price: f64,
    pub toy_quantity: i64,
    #[serde(default)]
    pub toy_description: Option<String>,
    #[serde(default)]
    pub toyrating: Option<f64>,

    #[serde(default)]
    pub seller_name: Option<String>,
    pub seller_email: String,
}
