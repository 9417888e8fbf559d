use mongodb::Database;
use uuid::Uuid;

use super::{CartItem, CART_COLLECTION_NAME};
use crate::data::{drain_cursor, filter, DeleteReport, InsertReport};
use crate::resp::problem::Problem;

pub trait CartDbExt {
    async fn add_cart_item(&self, item: CartItem) -> Result<InsertReport, Problem>;

    async fn cart_items(&self, email: impl AsRef<str>) -> Result<Vec<CartItem>, Problem>;

    /// Removes a single cart item; zero matches isn't an error.
    async fn remove_cart_item(&self, id: Uuid) -> Result<DeleteReport, Problem>;
}

impl CartDbExt for Database {
    async fn add_cart_item(&self, item: CartItem) -> Result<InsertReport, Problem> {
        let id = item.id;

        self.collection::<CartItem>(CART_COLLECTION_NAME)
            .insert_one(&item, None)
            .await
            .map_err(Problem::from)?;

        Ok(InsertReport { inserted_id: id })
    }

    async fn cart_items(&self, email: impl AsRef<str>) -> Result<Vec<CartItem>, Problem> {
        let cursor = self
            .collection::<CartItem>(CART_COLLECTION_NAME)
            .find(filter::by_email(email.as_ref()), None)
            .await
            .map_err(Problem::from)?;

        Ok(drain_cursor(cursor, "CartItem").await)
    }

    async fn remove_cart_item(&self, id: Uuid) -> Result<DeleteReport, Problem> {
        let result = self
            .collection::<CartItem>(CART_COLLECTION_NAME)
            .delete_one(filter::by_id(id), None)
            .await
            .map_err(Problem::from)?;

        if result.deleted_count == 1 {
            tracing::debug!("removed cart item {}", id);
        } else {
            tracing::debug!("no cart item matched {}", id);
        }

        Ok(DeleteReport::from(result))
    }
}
