use bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::Database;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Toy, TOY_COLLECTION_NAME};
use crate::data::{drain_cursor, filter, DeleteReport, InsertReport, UpdateReport};
use crate::middleware::paging::PageState;
use crate::resp::problem::Problem;

/// Catalogue search: substring match on the toy name (case-insensitive),
/// exact match on the uploader, or both AND-ed together.
#[derive(Debug, Clone, Default)]
pub struct ToySearch {
    pub toy_name: Option<String>,
    pub uploaded_by: Option<String>,
}

impl ToySearch {
    pub fn filter_document(&self) -> Document {
        let mut query = Document::new();

        if let Some(toy_name) = &self.toy_name {
            query.extend(filter::contains("toy_name", toy_name));
        }
        if let Some(seller) = &self.uploaded_by {
            query.insert("seller_email", seller);
        }

        query
    }
}

/// Replacement values for an existing listing; applied as a field merge, the
/// document itself is never swapped out.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ToyUpdate {
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
}

impl ToyUpdate {
    pub fn set_document(&self) -> Document {
        let mut set = doc! {
            "toy_name": &self.toy_name,
            "category": &self.category,
            "toy_price": self.toy_price,
            "toy_quantity": self.toy_quantity,
        };

        if let Some(image) = &self.toy_image {
            set.insert("toy_image", image);
        }
        if let Some(description) = &self.toy_description {
            set.insert("toy_description", description);
        }
        if let Some(rating) = self.toyrating {
            set.insert("toyrating", rating);
        }

        set
    }
}

/// One `$group` bucket of the category aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryCount {
    #[serde(rename = "_id")]
    pub category: Option<String>,
    pub count: i64,
}

pub trait ToyDbExt {
    async fn search_toys(
        &self,
        search: &ToySearch,
        paging: PageState,
    ) -> Result<Vec<Toy>, Problem>;

    async fn count_toys(&self, search: &ToySearch) -> Result<u64, Problem>;

    /// Category buckets with listing counts, grouped by the store.
    async fn toy_categories(&self) -> Result<Vec<CategoryCount>, Problem>;

    async fn get_toy(&self, id: Uuid) -> Result<Option<Toy>, Problem>;
    async fn insert_toy(&self, toy: Toy) -> Result<InsertReport, Problem>;
    async fn update_toy(&self, id: Uuid, update: &ToyUpdate) -> Result<UpdateReport, Problem>;
    async fn delete_toy(&self, id: Uuid) -> Result<DeleteReport, Problem>;
}

impl ToyDbExt for Database {
    async fn search_toys(
        &self,
        search: &ToySearch,
        paging: PageState,
    ) -> Result<Vec<Toy>, Problem> {
        let options = FindOptions::builder()
            .sort(doc! { "_id": -1 })
            .skip(paging.skip())
            .limit(paging.limit as i64)
            .build();

        let cursor = self
            .collection::<Toy>(TOY_COLLECTION_NAME)
            .find(search.filter_document(), options)
            .await
            .map_err(Problem::from)?;

        Ok(drain_cursor(cursor, "Toy").await)
    }

    async fn count_toys(&self, search: &ToySearch) -> Result<u64, Problem> {
        self.collection::<Toy>(TOY_COLLECTION_NAME)
            .count_documents(search.filter_document(), None)
            .await
            .map_err(Problem::from)
    }

    async fn toy_categories(&self) -> Result<Vec<CategoryCount>, Problem> {
        let pipeline = vec![
            doc! { "$group": { "_id": "$category", "count": { "$sum": 1 } } },
            doc! { "$sort": { "_id": 1 } },
        ];

        let cursor = self
            .collection::<Toy>(TOY_COLLECTION_NAME)
            .aggregate(pipeline, None)
            .await
            .map_err(Problem::from)?;

        let documents = drain_cursor(cursor, "CategoryCount").await;

        let mut categories = vec![];
        for document in documents {
            categories.push(bson::from_document(document).map_err(Problem::from)?);
        }

        Ok(categories)
    }

    async fn get_toy(&self, id: Uuid) -> Result<Option<Toy>, Problem> {
        self.collection::<Toy>(TOY_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(Problem::from)
    }

    async fn insert_toy(&self, toy: Toy) -> Result<InsertReport, Problem> {
        let id = toy.id;

        self.collection::<Toy>(TOY_COLLECTION_NAME)
            .insert_one(&toy, None)
            .await
            .map_err(Problem::from)?;

        Ok(InsertReport { inserted_id: id })
    }

    async fn update_toy(&self, id: Uuid, update: &ToyUpdate) -> Result<UpdateReport, Problem> {
        self.collection::<Toy>(TOY_COLLECTION_NAME)
            .update_one(filter::by_id(id), doc! { "$set": update.set_document() }, None)
            .await
            .map(UpdateReport::from)
            .map_err(Problem::from)
    }

    async fn delete_toy(&self, id: Uuid) -> Result<DeleteReport, Problem> {
        let result = self
            .collection::<Toy>(TOY_COLLECTION_NAME)
            .delete_one(filter::by_id(id), None)
            .await
            .map_err(Problem::from)?;

        if result.deleted_count == 1 {
            tracing::debug!("deleted toy {}", id);
        } else {
            tracing::debug!("no toy matched {}", id);
        }

        Ok(DeleteReport::from(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_search_matches_everything() {
        assert!(ToySearch::default().filter_document().is_empty());
    }

    #[test]
    fn name_search_is_case_insensitive_substring() {
        let search = ToySearch {
            toy_name: Some("car".to_string()),
            uploaded_by: None,
        };

        let query = search.filter_document();
        let regex = query.get_document("toy_name").expect("a regex document");
        assert_eq!(regex.get_str("$regex"), Ok("car"));
        assert_eq!(regex.get_str("$options"), Ok("i"));
    }

    #[test]
    fn name_and_seller_search_are_combined() {
        let search = ToySearch {
            toy_name: Some("car".to_string()),
            uploaded_by: Some("s@x.com".to_string()),
        };

        let query = search.filter_document();
        assert!(query.contains_key("toy_name"));
        assert_eq!(query.get_str("seller_email"), Ok("s@x.com"));
    }

    #[test]
    fn update_merges_all_client_fields() {
        let update = ToyUpdate {
            toy_name: "Race Car".to_string(),
            toy_image: None,
            category: "vehicles".to_string(),
            toy_price: 9.5,
            toy_quantity: 3,
            toy_description: Some("red".to_string()),
            toyrating: None,
        };

        let set = update.set_document();
        assert_eq!(set.get_str("toy_name"), Ok("Race Car"));
        assert_eq!(set.get_f64("toy_price"), Ok(9.5));
        assert_eq!(set.get_str("toy_description"), Ok("red"));
        assert!(!set.contains_key("toy_image"));
    }
}
