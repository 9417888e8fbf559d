use rocket::futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

pub mod cart;
pub mod class;
pub mod payment;
pub mod toy;
pub mod user;

/// Report returned for single-document inserts.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InsertReport {
    pub inserted_id: Uuid,
}

/// Report returned for `$set` updates. Zero matches isn't an error.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdateReport {
    pub matched_count: u64,
    pub modified_count: u64,
}

impl From<mongodb::results::UpdateResult> for UpdateReport {
    fn from(result: mongodb::results::UpdateResult) -> Self {
        UpdateReport {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        }
    }
}

/// Report returned for deletes; `deleted_count` is zero when nothing matched.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteReport {
    pub deleted_count: u64,
}

impl From<mongodb::results::DeleteResult> for DeleteReport {
    fn from(result: mongodb::results::DeleteResult) -> Self {
        DeleteReport {
            deleted_count: result.deleted_count,
        }
    }
}

/// BSON filter builders shared by the collection façades.
pub mod filter {
    use bson::spec::BinarySubtype;
    use bson::{doc, Binary, Bson, Document};
    use uuid::Uuid;

    pub fn uuid_bson(id: Uuid) -> Bson {
        Bson::Binary(Binary {
            subtype: BinarySubtype::Uuid,
            bytes: id.as_bytes().to_vec(),
        })
    }

    #[inline]
    pub fn by_id(id: Uuid) -> Document {
        doc! { "_id": uuid_bson(id) }
    }

    #[inline]
    pub fn id_in(ids: &[Uuid]) -> Document {
        let ids: Vec<Bson> = ids.iter().map(|id| uuid_bson(*id)).collect();
        doc! { "_id": { "$in": ids } }
    }

    #[inline]
    pub fn by_email(email: impl ToString) -> Document {
        doc! { "email": email.to_string() }
    }

    /// Case-insensitive "contains" match on a text field.
    #[inline]
    pub fn contains(field: &str, needle: impl ToString) -> Document {
        doc! { field: { "$regex": needle.to_string(), "$options": "i" } }
    }
}

/// Drains a typed cursor, skipping documents that fail to deserialize.
pub(crate) async fn drain_cursor<T>(mut cursor: mongodb::Cursor<T>, what: &str) -> Vec<T>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut items = vec![];

    while let Some(item) = cursor.next().await {
        match item {
            Ok(it) => items.push(it),
            Err(_) => {
                tracing::warn!("Unable to deserialize {} document.", what)
            }
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::filter;
    use bson::spec::BinarySubtype;
    use bson::Bson;
    use uuid::Uuid;

    #[test]
    fn id_filter_uses_uuid_binary_subtype() {
        let id = Uuid::new_v4();
        let doc = filter::by_id(id);

        match doc.get("_id") {
            Some(Bson::Binary(bin)) => {
                assert_eq!(bin.subtype, BinarySubtype::Uuid);
                assert_eq!(bin.bytes, id.as_bytes().to_vec());
            }
            other => panic!("expected binary _id filter, got {:?}", other),
        }
    }

    #[test]
    fn id_in_filter_contains_all_ids() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let doc = filter::id_in(&ids);

        let list = doc
            .get_document("_id")
            .and_then(|d| d.get_array("$in"))
            .expect("an $in filter");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn contains_filter_is_case_insensitive() {
        let doc = filter::contains("toy_name", "car");
        let inner = doc.get_document("toy_name").expect("a regex document");

        assert_eq!(inner.get_str("$regex"), Ok("car"));
        assert_eq!(inner.get_str("$options"), Ok("i"));
    }
}
