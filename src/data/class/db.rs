use bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::Database;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Class, ClassStatus, CLASS_COLLECTION_NAME};
use crate::data::{drain_cursor, filter, DeleteReport, InsertReport, UpdateReport};
use crate::resp::problem::Problem;

/// Instructor-editable subset of a class listing. Only fields that are
/// present end up in the `$set` document; everything else is left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ClassUpdate {
    pub name: Option<String>,
    pub image: Option<String>,
    pub seats: Option<i64>,
    pub price: Option<f64>,
}

impl ClassUpdate {
    pub fn set_document(&self) -> Document {
        let mut set = Document::new();

        if let Some(name) = &self.name {
            set.insert("name", name);
        }
        if let Some(image) = &self.image {
            set.insert("image", image);
        }
        if let Some(seats) = self.seats {
            set.insert("seats", seats);
        }
        if let Some(price) = self.price {
            set.insert("price", price);
        }

        set
    }

    pub fn is_empty(&self) -> bool {
        self.set_document().is_empty()
    }
}

fn newest_first() -> FindOptions {
    FindOptions::builder().sort(doc! { "_id": -1 }).build()
}

pub trait ClassDbExt {
    async fn create_class(&self, class: Class) -> Result<InsertReport, Problem>;

    async fn approved_classes(&self) -> Result<Vec<Class>, Problem>;
    async fn classes_by_instructor(&self, email: impl AsRef<str>)
        -> Result<Vec<Class>, Problem>;
    async fn all_classes(&self) -> Result<Vec<Class>, Problem>;
    async fn enrolled_classes(&self, email: impl AsRef<str>) -> Result<Vec<Class>, Problem>;

    async fn set_class_status(
        &self,
        id: Uuid,
        status: ClassStatus,
    ) -> Result<UpdateReport, Problem>;
    async fn set_class_feedback(
        &self,
        id: Uuid,
        feedback: impl AsRef<str>,
    ) -> Result<UpdateReport, Problem>;
    async fn update_class(&self, id: Uuid, update: &ClassUpdate)
        -> Result<UpdateReport, Problem>;

    async fn class_seats(&self, id: Uuid) -> Result<Option<i64>, Problem>;
    async fn set_class_seats(&self, id: Uuid, seats: i64) -> Result<UpdateReport, Problem>;

    async fn delete_class(&self, id: Uuid) -> Result<DeleteReport, Problem>;

    async fn count_classes_with_status(
        &self,
        status: Option<ClassStatus>,
    ) -> Result<u64, Problem>;
    async fn count_instructor_classes(
        &self,
        email: impl AsRef<str>,
        status: Option<ClassStatus>,
    ) -> Result<u64, Problem>;
    async fn count_enrolled_classes(&self, email: impl AsRef<str>) -> Result<u64, Problem>;

    /// Store-side `$sum` of enrolled-student list sizes across an
    /// instructor's classes.
    async fn total_enrolled_students(&self, email: impl AsRef<str>) -> Result<i64, Problem>;
}

impl ClassDbExt for Database {
    async fn create_class(&self, class: Class) -> Result<InsertReport, Problem> {
        let id = class.id;

        self.collection::<Class>(CLASS_COLLECTION_NAME)
            .insert_one(&class, None)
            .await
            .map_err(Problem::from)?;

        Ok(InsertReport { inserted_id: id })
    }

    async fn approved_classes(&self) -> Result<Vec<Class>, Problem> {
        let cursor = self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .find(
                doc! { "status": ClassStatus::Approved.as_str() },
                newest_first(),
            )
            .await
            .map_err(Problem::from)?;

        Ok(drain_cursor(cursor, "Class").await)
    }

    async fn classes_by_instructor(
        &self,
        email: impl AsRef<str>,
    ) -> Result<Vec<Class>, Problem> {
        let cursor = self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .find(doc! { "instructor_email": email.as_ref() }, newest_first())
            .await
            .map_err(Problem::from)?;

        Ok(drain_cursor(cursor, "Class").await)
    }

    async fn all_classes(&self) -> Result<Vec<Class>, Problem> {
        let cursor = self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .find(None, newest_first())
            .await
            .map_err(Problem::from)?;

        Ok(drain_cursor(cursor, "Class").await)
    }

    async fn enrolled_classes(&self, email: impl AsRef<str>) -> Result<Vec<Class>, Problem> {
        let cursor = self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .find(doc! { "students": email.as_ref() }, newest_first())
            .await
            .map_err(Problem::from)?;

        Ok(drain_cursor(cursor, "Class").await)
    }

    async fn set_class_status(
        &self,
        id: Uuid,
        status: ClassStatus,
    ) -> Result<UpdateReport, Problem> {
        self.collection::<Class>(CLASS_COLLECTION_NAME)
            .update_one(
                filter::by_id(id),
                doc! { "$set": { "status": status.as_str() } },
                None,
            )
            .await
            .map(UpdateReport::from)
            .map_err(Problem::from)
    }

    async fn set_class_feedback(
        &self,
        id: Uuid,
        feedback: impl AsRef<str>,
    ) -> Result<UpdateReport, Problem> {
        self.collection::<Class>(CLASS_COLLECTION_NAME)
            .update_one(
                filter::by_id(id),
                doc! { "$set": { "feedback": feedback.as_ref() } },
                None,
            )
            .await
            .map(UpdateReport::from)
            .map_err(Problem::from)
    }

    async fn update_class(
        &self,
        id: Uuid,
        update: &ClassUpdate,
    ) -> Result<UpdateReport, Problem> {
        self.collection::<Class>(CLASS_COLLECTION_NAME)
            .update_one(filter::by_id(id), doc! { "$set": update.set_document() }, None)
            .await
            .map(UpdateReport::from)
            .map_err(Problem::from)
    }

    async fn class_seats(&self, id: Uuid) -> Result<Option<i64>, Problem> {
        let document = self
            .collection::<Document>(CLASS_COLLECTION_NAME)
            .find_one(
                filter::by_id(id),
                mongodb::options::FindOneOptions::builder()
                    .projection(doc! { "seats": 1 })
                    .build(),
            )
            .await
            .map_err(Problem::from)?;

        Ok(document.and_then(|d| match d.get("seats") {
            Some(bson::Bson::Int32(seats)) => Some(*seats as i64),
            Some(bson::Bson::Int64(seats)) => Some(*seats),
            Some(bson::Bson::Double(seats)) => Some(*seats as i64),
            _ => None,
        }))
    }

    async fn set_class_seats(&self, id: Uuid, seats: i64) -> Result<UpdateReport, Problem> {
        // Seat counts are whatever the caller supplies; there's no
        // decrement-on-purchase or capacity check on the server side.
        self.collection::<Class>(CLASS_COLLECTION_NAME)
            .update_one(
                filter::by_id(id),
                doc! { "$set": { "seats": seats } },
                None,
            )
            .await
            .map(UpdateReport::from)
            .map_err(Problem::from)
    }

    async fn delete_class(&self, id: Uuid) -> Result<DeleteReport, Problem> {
        self.collection::<Class>(CLASS_COLLECTION_NAME)
            .delete_one(filter::by_id(id), None)
            .await
            .map(DeleteReport::from)
            .map_err(Problem::from)
    }

    async fn count_classes_with_status(
        &self,
        status: Option<ClassStatus>,
    ) -> Result<u64, Problem> {
        let query = match status {
            Some(status) => doc! { "status": status.as_str() },
            None => Document::new(),
        };

        self.collection::<Class>(CLASS_COLLECTION_NAME)
            .count_documents(query, None)
            .await
            .map_err(Problem::from)
    }

    async fn count_instructor_classes(
        &self,
        email: impl AsRef<str>,
        status: Option<ClassStatus>,
    ) -> Result<u64, Problem> {
        let mut query = doc! { "instructor_email": email.as_ref() };
        if let Some(status) = status {
            query.insert("status", status.as_str());
        }

        self.collection::<Class>(CLASS_COLLECTION_NAME)
            .count_documents(query, None)
            .await
            .map_err(Problem::from)
    }

    async fn count_enrolled_classes(&self, email: impl AsRef<str>) -> Result<u64, Problem> {
        self.collection::<Class>(CLASS_COLLECTION_NAME)
            .count_documents(doc! { "students": email.as_ref() }, None)
            .await
            .map_err(Problem::from)
    }

    async fn total_enrolled_students(&self, email: impl AsRef<str>) -> Result<i64, Problem> {
        let pipeline = vec![
            doc! { "$match": { "instructor_email": email.as_ref() } },
            doc! { "$group": {
                "_id": null,
                "total": { "$sum": { "$size": { "$ifNull": ["$students", []] } } },
            } },
        ];

        let mut cursor = self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .aggregate(pipeline, None)
            .await
            .map_err(Problem::from)?;

        use rocket::futures::StreamExt;
        let document = cursor.next().await.transpose().map_err(Problem::from)?;

        Ok(match document.as_ref().and_then(|d| d.get("total")) {
            Some(bson::Bson::Int32(total)) => *total as i64,
            Some(bson::Bson::Int64(total)) => *total,
            _ => 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_sets_only_provided_fields() {
        let update = ClassUpdate {
            name: Some("Advanced Rust".to_string()),
            seats: Some(12),
            ..Default::default()
        };

        let set = update.set_document();
        assert_eq!(set.get_str("name"), Ok("Advanced Rust"));
        assert_eq!(set.get_i64("seats"), Ok(12));
        assert!(!set.contains_key("image"));
        assert!(!set.contains_key("price"));
    }

    #[test]
    fn empty_update_produces_empty_set_document() {
        assert!(ClassUpdate::default().is_empty());
    }
}
