use bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};
use uuid::Uuid;

use super::{User, USER_COLLECTION_NAME};
use crate::data::{drain_cursor, filter, UpdateReport};
use crate::resp::problem::Problem;
use crate::role::Role;

/// Outcome of a signup attempt. A duplicate email is answered with a message
/// body rather than an error status, which is what the web client expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    Created(Uuid),
    AlreadyExists,
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        _ => false,
    }
}

pub trait UserDbExt {
    /// Creates the unique email index signup de-duplication relies on.
    async fn ensure_user_indexes(&self) -> Result<(), mongodb::error::Error>;

    async fn create_user(&self, user: User) -> Result<SignupOutcome, Problem>;

    async fn find_user_by_email(&self, email: impl AsRef<str>) -> Result<Option<User>, Problem>;

    /// Current role for an email, looked up on every gated request.
    async fn user_role(&self, email: impl AsRef<str>) -> Result<Option<Role>, Problem>;

    async fn list_users(&self) -> Result<Vec<User>, Problem>;
    async fn list_instructors(&self) -> Result<Vec<User>, Problem>;

    async fn set_user_role(&self, id: Uuid, role: Role) -> Result<UpdateReport, Problem>;

    async fn count_users_with_role(&self, role: Role) -> Result<u64, Problem>;
}

impl UserDbExt for Database {
    async fn ensure_user_indexes(&self) -> Result<(), mongodb::error::Error> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection::<User>(USER_COLLECTION_NAME)
            .create_index(index, None)
            .await?;

        Ok(())
    }

    async fn create_user(&self, user: User) -> Result<SignupOutcome, Problem> {
        if self.find_user_by_email(&user.email).await?.is_some() {
            return Ok(SignupOutcome::AlreadyExists);
        }

        let id = user.id;
        let insert = self
            .collection::<User>(USER_COLLECTION_NAME)
            .insert_one(&user, None)
            .await;

        match insert {
            Ok(_) => Ok(SignupOutcome::Created(id)),
            // A concurrent identical signup can slip past the pre-check; the
            // unique index turns that race into a duplicate-key write error.
            Err(e) if is_duplicate_key(&e) => Ok(SignupOutcome::AlreadyExists),
            Err(e) => Err(Problem::from(e)),
        }
    }

    async fn find_user_by_email(&self, email: impl AsRef<str>) -> Result<Option<User>, Problem> {
        self.collection::<User>(USER_COLLECTION_NAME)
            .find_one(filter::by_email(email.as_ref()), None)
            .await
            .map_err(Problem::from)
    }

    async fn user_role(&self, email: impl AsRef<str>) -> Result<Option<Role>, Problem> {
        Ok(self
            .find_user_by_email(email)
            .await?
            .map(|user| user.role))
    }

    async fn list_users(&self) -> Result<Vec<User>, Problem> {
        let cursor = self
            .collection::<User>(USER_COLLECTION_NAME)
            .find(None, None)
            .await
            .map_err(Problem::from)?;

        Ok(drain_cursor(cursor, "User").await)
    }

    async fn list_instructors(&self) -> Result<Vec<User>, Problem> {
        let options = mongodb::options::FindOptions::builder()
            .sort(doc! { "_id": -1 })
            .build();

        let cursor = self
            .collection::<User>(USER_COLLECTION_NAME)
            .find(doc! { "role": Role::Instructor.as_str() }, options)
            .await
            .map_err(Problem::from)?;

        Ok(drain_cursor(cursor, "User").await)
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> Result<UpdateReport, Problem> {
        self.collection::<User>(USER_COLLECTION_NAME)
            .update_one(
                filter::by_id(id),
                doc! { "$set": { "role": role.as_str() } },
                None,
            )
            .await
            .map(UpdateReport::from)
            .map_err(Problem::from)
    }

    async fn count_users_with_role(&self, role: Role) -> Result<u64, Problem> {
        self.collection::<User>(USER_COLLECTION_NAME)
            .count_documents(doc! { "role": role.as_str() }, None)
            .await
            .map_err(Problem::from)
    }
}
