use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::class::db::ClassDbExt;
use crate::data::class::ClassStatus;
use crate::data::payment::db::PaymentDbExt;
use crate::data::user::db::UserDbExt;
use crate::middleware::auth::{AdminUser, InstructorUser, StudentUser};
use crate::resp::problem::Problem;
use crate::role::Role;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentCount {
    pub total_students: u64,
}

/// Student headcount for the public landing page.
#[get("/student/count")]
#[tracing::instrument(skip(db))]
pub async fn student_count(db: &State<Database>) -> Result<Json<StudentCount>, Problem> {
    Ok(Json(StudentCount {
        total_students: db.count_users_with_role(Role::Student).await?,
    }))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminStats {
    pub total_students: u64,
    pub total_instructors: u64,
    pub total_classes: u64,
    pub pending_classes: u64,
    pub approved_classes: u64,
    pub total_income: f64,
}

/// Marketplace-wide dashboard numbers; income is summed by the store.
#[utoipa::path(
    responses(
        (status = 200, body = AdminStats),
        (status = 403, description = "Authenticated user isn't an admin", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/admin/stats")]
#[tracing::instrument(skip(db, _admin))]
pub async fn admin_stats(
    _admin: AdminUser,
    db: &State<Database>,
) -> Result<Json<AdminStats>, Problem> {
    Ok(Json(AdminStats {
        total_students: db.count_users_with_role(Role::Student).await?,
        total_instructors: db.count_users_with_role(Role::Instructor).await?,
        total_classes: db.count_classes_with_status(None).await?,
        pending_classes: db
            .count_classes_with_status(Some(ClassStatus::Pending))
            .await?,
        approved_classes: db
            .count_classes_with_status(Some(ClassStatus::Approved))
            .await?,
        total_income: db.total_income().await?,
    }))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstructorStats {
    pub total_classes: u64,
    pub pending_classes: u64,
    pub approved_classes: u64,
    pub total_enrolled: i64,
}

#[get("/instructor/stats/<email>")]
#[tracing::instrument(skip(db, _instructor))]
pub async fn instructor_stats(
    email: String,
    _instructor: InstructorUser,
    db: &State<Database>,
) -> Result<Json<InstructorStats>, Problem> {
    Ok(Json(InstructorStats {
        total_classes: db.count_instructor_classes(&email, None).await?,
        pending_classes: db
            .count_instructor_classes(&email, Some(ClassStatus::Pending))
            .await?,
        approved_classes: db
            .count_instructor_classes(&email, Some(ClassStatus::Approved))
            .await?,
        total_enrolled: db.total_enrolled_students(&email).await?,
    }))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentStats {
    pub enrolled_classes: u64,
    pub total_orders: u64,
    pub total_spent: f64,
}

#[get("/student/stats/<email>")]
#[tracing::instrument(skip(db, _student))]
pub async fn student_stats(
    email: String,
    _student: StudentUser,
    db: &State<Database>,
) -> Result<Json<StudentStats>, Problem> {
    Ok(Json(StudentStats {
        enrolled_classes: db.count_enrolled_classes(&email).await?,
        total_orders: db.payment_count(&email).await?,
        total_spent: db.total_spent(&email).await?,
    }))
}
