use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::data::toy::db::{CategoryCount, ToyDbExt, ToySearch, ToyUpdate};
use crate::data::toy::Toy;
use crate::data::{DeleteReport, InsertReport, UpdateReport};
use crate::middleware::paging::PageState;
use crate::resp::problem::Problem;

/// Paged catalogue search, filterable by name substring and uploader.
#[utoipa::path(
    params(
        ("toy_name" = Option<String>, Query, description = "case-insensitive name substring"),
        ("uploaded_by" = Option<String>, Query, description = "uploader email"),
        ("page" = Option<u32>, Query, description = "zero-based page index"),
        ("limit" = Option<u32>, Query, description = "page size, 20 by default"),
    ),
    responses(
        (status = 200, description = "Matching listings, newest first", body = Vec<Toy>),
    )
)]
#[get("/mytoys?<toy_name>&<uploaded_by>")]
#[tracing::instrument(skip(db))]
pub async fn toys_search(
    toy_name: Option<String>,
    uploaded_by: Option<String>,
    paging: PageState,
    db: &State<Database>,
) -> Result<Json<Vec<Toy>>, Problem> {
    let search = ToySearch {
        toy_name,
        uploaded_by,
    };

    Ok(Json(db.search_toys(&search, paging).await?))
}

#[get("/categories")]
#[tracing::instrument(skip(db))]
pub async fn toy_categories(db: &State<Database>) -> Result<Json<Vec<CategoryCount>>, Problem> {
    Ok(Json(db.toy_categories().await?))
}

#[get("/toy/<id>")]
#[tracing::instrument(skip(db))]
pub async fn toy_get(id: Uuid, db: &State<Database>) -> Result<Option<Json<Toy>>, Problem> {
    Ok(db.get_toy(id).await?.map(Json))
}

#[put("/toy/<id>", format = "application/json", data = "<update>")]
#[tracing::instrument(skip(db))]
pub async fn toy_update(
    id: Uuid,
    update: Json<ToyUpdate>,
    db: &State<Database>,
) -> Result<Json<UpdateReport>, Problem> {
    Ok(Json(db.update_toy(id, &update).await?))
}

#[post("/toys", format = "application/json", data = "<toy>")]
#[tracing::instrument(skip(db))]
pub async fn toy_create(
    toy: Json<Toy>,
    db: &State<Database>,
) -> Result<Json<InsertReport>, Problem> {
    Ok(Json(db.insert_toy(toy.into_inner()).await?))
}

#[delete("/toy/<id>")]
#[tracing::instrument(skip(db))]
pub async fn toy_delete(id: Uuid, db: &State<Database>) -> Result<Json<DeleteReport>, Problem> {
    Ok(Json(db.delete_toy(id).await?))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToyTotal {
    pub total_toys: u64,
}

/// Count of listings matching an optional name substring.
#[get("/totalToys?<toy_name>")]
#[tracing::instrument(skip(db))]
pub async fn toys_total(
    toy_name: Option<String>,
    db: &State<Database>,
) -> Result<Json<ToyTotal>, Problem> {
    let search = ToySearch {
        toy_name,
        uploaded_by: None,
    };

    Ok(Json(ToyTotal {
        total_toys: db.count_toys(&search).await?,
    }))
}
