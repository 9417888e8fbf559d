use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

use crate::data::cart::db::CartDbExt;
use crate::data::cart::CartItem;
use crate::data::{DeleteReport, InsertReport};
use crate::middleware::auth::StudentUser;
use crate::resp::problem::Problem;

#[post("/cart", format = "application/json", data = "<item>")]
#[tracing::instrument(skip(db, _student))]
pub async fn cart_add(
    item: Json<CartItem>,
    _student: StudentUser,
    db: &State<Database>,
) -> Result<Json<InsertReport>, Problem> {
    Ok(Json(db.add_cart_item(item.into_inner()).await?))
}

/// A student's pending selections. No email in the query answers with an
/// empty list rather than an error.
#[get("/cart?<email>")]
#[tracing::instrument(skip(db, _student))]
pub async fn cart_list(
    email: Option<String>,
    _student: StudentUser,
    db: &State<Database>,
) -> Result<Json<Vec<CartItem>>, Problem> {
    let email = match email {
        Some(email) if !email.is_empty() => email,
        _ => return Ok(Json(vec![])),
    };

    Ok(Json(db.cart_items(&email).await?))
}

#[delete("/cart/<id>")]
#[tracing::instrument(skip(db, _student))]
pub async fn cart_remove(
    id: Uuid,
    _student: StudentUser,
    db: &State<Database>,
) -> Result<Json<DeleteReport>, Problem> {
    Ok(Json(db.remove_cart_item(id).await?))
}
