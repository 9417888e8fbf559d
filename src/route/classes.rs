use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::data::class::db::{ClassDbExt, ClassUpdate};
use crate::data::class::{Class, ClassStatus};
use crate::data::{DeleteReport, InsertReport, UpdateReport};
use crate::middleware::auth::{AdminUser, InstructorUser, StudentUser};
use crate::resp::problem::Problem;

/// Approved classes shown on the public listing page.
#[utoipa::path(
    responses(
        (status = 200, description = "Approved classes, newest first", body = Vec<Class>),
    )
)]
#[get("/classes/approved")]
#[tracing::instrument(skip(db))]
pub async fn approved_classes(db: &State<Database>) -> Result<Json<Vec<Class>>, Problem> {
    Ok(Json(db.approved_classes().await?))
}

#[get("/teacher/classes?<email>")]
#[tracing::instrument(skip(db, _instructor))]
pub async fn teacher_classes(
    email: String,
    _instructor: InstructorUser,
    db: &State<Database>,
) -> Result<Json<Vec<Class>>, Problem> {
    Ok(Json(db.classes_by_instructor(&email).await?))
}

/// Every class regardless of status, for the moderation dashboard.
#[get("/admin/classes")]
#[tracing::instrument(skip(db, _admin))]
pub async fn admin_classes(
    _admin: AdminUser,
    db: &State<Database>,
) -> Result<Json<Vec<Class>>, Problem> {
    Ok(Json(db.all_classes().await?))
}

#[post("/teacher/new-class", format = "application/json", data = "<class>")]
#[tracing::instrument(skip(db, _instructor))]
pub async fn class_create(
    class: Json<Class>,
    _instructor: InstructorUser,
    db: &State<Database>,
) -> Result<Json<InsertReport>, Problem> {
    Ok(Json(db.create_class(class.into_inner()).await?))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FeedbackChange {
    pub feedback: String,
}

#[patch("/admin/feedback/<id>", format = "application/json", data = "<change>")]
#[tracing::instrument(skip(db, _admin))]
pub async fn class_feedback(
    id: Uuid,
    change: Json<FeedbackChange>,
    _admin: AdminUser,
    db: &State<Database>,
) -> Result<Json<UpdateReport>, Problem> {
    Ok(Json(db.set_class_feedback(id, &change.feedback).await?))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatusChange {
    pub status: ClassStatus,
}

#[patch("/admin/class/status/<id>", format = "application/json", data = "<change>")]
#[tracing::instrument(skip(db, _admin))]
pub async fn class_status(
    id: Uuid,
    change: Json<StatusChange>,
    _admin: AdminUser,
    db: &State<Database>,
) -> Result<Json<UpdateReport>, Problem> {
    Ok(Json(db.set_class_status(id, change.status).await?))
}

/// Merges the provided fields into an instructor's class listing.
#[utoipa::path(
    request_body = ClassUpdate,
    responses(
        (status = 200, body = UpdateReport),
        (status = 403, description = "Authenticated user isn't an instructor", body = Problem),
    ),
    security(("jwt" = []))
)]
#[patch("/instructor/class/<id>", format = "application/json", data = "<update>")]
#[tracing::instrument(skip(db, _instructor))]
pub async fn class_update(
    id: Uuid,
    update: Json<ClassUpdate>,
    _instructor: InstructorUser,
    db: &State<Database>,
) -> Result<Json<UpdateReport>, Problem> {
    Ok(Json(db.update_class(id, &update).await?))
}

#[delete("/teacher/class/<id>")]
#[tracing::instrument(skip(db, _instructor))]
pub async fn class_delete(
    id: Uuid,
    _instructor: InstructorUser,
    db: &State<Database>,
) -> Result<Json<DeleteReport>, Problem> {
    Ok(Json(db.delete_class(id).await?))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeatCount {
    pub seats: i64,
}

#[get("/classes/seat/<id>")]
#[tracing::instrument(skip(db))]
pub async fn seats_get(
    id: Uuid,
    db: &State<Database>,
) -> Result<Option<Json<SeatCount>>, Problem> {
    Ok(db
        .class_seats(id)
        .await?
        .map(|seats| Json(SeatCount { seats })))
}

/// Sets the seat count to whatever the caller supplies.
#[patch("/classes/seat/<id>", format = "application/json", data = "<change>")]
#[tracing::instrument(skip(db))]
pub async fn seats_set(
    id: Uuid,
    change: Json<SeatCount>,
    db: &State<Database>,
) -> Result<Json<UpdateReport>, Problem> {
    Ok(Json(db.set_class_seats(id, change.seats).await?))
}

/// Classes a student is enrolled in.
#[get("/classes/enrolled/<email>")]
#[tracing::instrument(skip(db, _student))]
pub async fn enrolled_classes(
    email: String,
    _student: StudentUser,
    db: &State<Database>,
) -> Result<Json<Vec<Class>>, Problem> {
    Ok(Json(db.enrolled_classes(&email).await?))
}
