use bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::{Client, ClientSession, Database};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Payment, PAYMENT_COLLECTION_NAME};
use crate::data::cart::{CartItem, CART_COLLECTION_NAME};
use crate::data::class::{Class, CLASS_COLLECTION_NAME};
use crate::data::{drain_cursor, filter};
use crate::resp::problem::Problem;

/// Combined result of the three checkout writes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommitReport {
    pub inserted_id: Uuid,
    pub deleted_count: u64,
    pub modified_count: u64,
}

pub trait PaymentDbExt {
    /// Commits a checkout: records the payment, clears the purchased cart
    /// items and enrolls the payer in the purchased classes, all inside a
    /// single multi-document transaction. A failing step aborts the whole
    /// commit and nothing is applied.
    async fn commit_payment(
        &self,
        client: &Client,
        payment: Payment,
    ) -> Result<CommitReport, Problem>;

    async fn payments_by_email(&self, email: impl AsRef<str>) -> Result<Vec<Payment>, Problem>;

    async fn payment_count(&self, email: impl AsRef<str>) -> Result<u64, Problem>;

    /// `$sum` of every payment's price, computed by the store.
    async fn total_income(&self) -> Result<f64, Problem>;
    /// `$sum` of one student's payment prices, computed by the store.
    async fn total_spent(&self, email: impl AsRef<str>) -> Result<f64, Problem>;
}

async fn run_commit(
    db: &Database,
    session: &mut ClientSession,
    payment: &Payment,
) -> Result<CommitReport, mongodb::error::Error> {
    db.collection::<Payment>(PAYMENT_COLLECTION_NAME)
        .insert_one_with_session(payment, None, session)
        .await?;

    let deleted = db
        .collection::<CartItem>(CART_COLLECTION_NAME)
        .delete_many_with_session(filter::id_in(&payment.cart_ids), None, session)
        .await?;

    // $addToSet keeps enrollment at most once per class even if the same
    // checkout is replayed.
    let enrolled = db
        .collection::<Class>(CLASS_COLLECTION_NAME)
        .update_many_with_session(
            filter::id_in(&payment.classes_ids),
            doc! { "$addToSet": { "students": &payment.email } },
            None,
            session,
        )
        .await?;

    Ok(CommitReport {
        inserted_id: payment.id,
        deleted_count: deleted.deleted_count,
        modified_count: enrolled.modified_count,
    })
}

/// Reads the `total` accumulator out of a `$group` result document.
fn group_total(document: Option<Document>) -> f64 {
    match document.as_ref().and_then(|d| d.get("total")) {
        Some(bson::Bson::Double(total)) => *total,
        Some(bson::Bson::Int32(total)) => *total as f64,
        Some(bson::Bson::Int64(total)) => *total as f64,
        _ => 0.0,
    }
}

impl PaymentDbExt for Database {
    async fn commit_payment(
        &self,
        client: &Client,
        payment: Payment,
    ) -> Result<CommitReport, Problem> {
        let mut session = client.start_session(None).await.map_err(Problem::from)?;
        session
            .start_transaction(None)
            .await
            .map_err(Problem::from)?;

        let report = match run_commit(self, &mut session, &payment).await {
            Ok(report) => report,
            Err(e) => {
                if let Err(abort) = session.abort_transaction().await {
                    tracing::warn!("unable to abort checkout transaction: {}", abort);
                }
                return Err(Problem::from(e));
            }
        };

        session.commit_transaction().await.map_err(Problem::from)?;

        tracing::info!(
            "committed payment {} for {}: {} cart items cleared, {} classes updated",
            report.inserted_id,
            payment.email,
            report.deleted_count,
            report.modified_count
        );

        Ok(report)
    }

    async fn payments_by_email(&self, email: impl AsRef<str>) -> Result<Vec<Payment>, Problem> {
        let options = FindOptions::builder().sort(doc! { "created": -1 }).build();

        let cursor = self
            .collection::<Payment>(PAYMENT_COLLECTION_NAME)
            .find(filter::by_email(email.as_ref()), options)
            .await
            .map_err(Problem::from)?;

        Ok(drain_cursor(cursor, "Payment").await)
    }

    async fn payment_count(&self, email: impl AsRef<str>) -> Result<u64, Problem> {
        self.collection::<Payment>(PAYMENT_COLLECTION_NAME)
            .count_documents(filter::by_email(email.as_ref()), None)
            .await
            .map_err(Problem::from)
    }

    async fn total_income(&self) -> Result<f64, Problem> {
        let pipeline = vec![doc! { "$group": { "_id": null, "total": { "$sum": "$price" } } }];

        let mut cursor = self
            .collection::<Payment>(PAYMENT_COLLECTION_NAME)
            .aggregate(pipeline, None)
            .await
            .map_err(Problem::from)?;

        use rocket::futures::StreamExt;
        let document = cursor.next().await.transpose().map_err(Problem::from)?;

        Ok(group_total(document))
    }

    async fn total_spent(&self, email: impl AsRef<str>) -> Result<f64, Problem> {
        let pipeline = vec![
            doc! { "$match": filter::by_email(email.as_ref()) },
            doc! { "$group": { "_id": null, "total": { "$sum": "$price" } } },
        ];

        let mut cursor = self
            .collection::<Payment>(PAYMENT_COLLECTION_NAME)
            .aggregate(pipeline, None)
            .await
            .map_err(Problem::from)?;

        use rocket::futures::StreamExt;
        let document = cursor.next().await.transpose().map_err(Problem::from)?;

        Ok(group_total(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_total_reads_any_numeric_accumulator() {
        assert_eq!(group_total(Some(doc! { "total": 120.5 })), 120.5);
        assert_eq!(group_total(Some(doc! { "total": 42_i32 })), 42.0);
        assert_eq!(group_total(Some(doc! { "total": 42_i64 })), 42.0);
    }

    #[test]
    fn group_total_is_zero_for_empty_result() {
        assert_eq!(group_total(None), 0.0);
        assert_eq!(group_total(Some(doc! {})), 0.0);
    }
}
