use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::data::user::db::{SignupOutcome, UserDbExt};
use crate::data::user::User;
use crate::data::UpdateReport;
use crate::middleware::auth::AdminUser;
use crate::resp::jwt::AuthClaims;
use crate::resp::problem::Problem;
use crate::role::Role;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewUser {
    #[serde(default)]
    pub name: Option<String>,
    #[schema(format = "email")]
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignupResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted_id: Option<Uuid>,
}

/// Registers an account on first signup. Signing up twice with the same
/// email answers with a message body, not an error status.
#[utoipa::path(
    request_body = NewUser,
    responses(
        (status = 200, description = "Inserted id, or a message for duplicates", body = SignupResponse),
    )
)]
#[post("/users", format = "application/json", data = "<user>")]
#[tracing::instrument(skip(db))]
pub async fn user_create(
    user: Json<NewUser>,
    db: &State<Database>,
) -> Result<Json<SignupResponse>, Problem> {
    let user = user.into_inner();
    let user = User::new(user.email, user.name, user.role.unwrap_or_default());

    match db.create_user(user).await? {
        SignupOutcome::Created(id) => Ok(Json(SignupResponse {
            message: None,
            inserted_id: Some(id),
        })),
        SignupOutcome::AlreadyExists => Ok(Json(SignupResponse {
            message: Some("User Already Exists".to_string()),
            inserted_id: None,
        })),
    }
}

#[get("/users")]
#[tracing::instrument(skip(db, _admin))]
pub async fn users_list(
    _admin: AdminUser,
    db: &State<Database>,
) -> Result<Json<Vec<User>>, Problem> {
    Ok(Json(db.list_users().await?))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleResponse {
    pub role: Option<Role>,
}

#[get("/users/role/<email>")]
#[tracing::instrument(skip(db))]
pub async fn user_role_get(
    email: String,
    db: &State<Database>,
) -> Result<Json<RoleResponse>, Problem> {
    Ok(Json(RoleResponse {
        role: db.user_role(&email).await?,
    }))
}

/// Instructors listed for the public landing page, newest first.
#[get("/instructors")]
#[tracing::instrument(skip(db))]
pub async fn instructors_list(db: &State<Database>) -> Result<Json<Vec<User>>, Problem> {
    Ok(Json(db.list_instructors().await?))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminCheck {
    pub admin: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstructorCheck {
    pub instructor: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentCheck {
    pub student: bool,
}

/// Role self-checks used by the client to pick a dashboard. Asking about an
/// email other than the authenticated one always answers `false`.
#[utoipa::path(
    responses(
        (status = 200, body = AdminCheck),
        (status = 401, description = "Missing or invalid bearer token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/user/admin/<email>")]
#[tracing::instrument(skip(db, auth))]
pub async fn is_admin(
    email: String,
    auth: AuthClaims,
    db: &State<Database>,
) -> Result<Json<AdminCheck>, Problem> {
    if auth.email != email {
        return Ok(Json(AdminCheck { admin: false }));
    }

    Ok(Json(AdminCheck {
        admin: db.user_role(&email).await? == Some(Role::Admin),
    }))
}

#[get("/user/instructor/<email>")]
#[tracing::instrument(skip(db, auth))]
pub async fn is_instructor(
    email: String,
    auth: AuthClaims,
    db: &State<Database>,
) -> Result<Json<InstructorCheck>, Problem> {
    if auth.email != email {
        return Ok(Json(InstructorCheck { instructor: false }));
    }

    Ok(Json(InstructorCheck {
        instructor: db.user_role(&email).await? == Some(Role::Instructor),
    }))
}

#[get("/user/student/<email>")]
#[tracing::instrument(skip(db, auth))]
pub async fn is_student(
    email: String,
    auth: AuthClaims,
    db: &State<Database>,
) -> Result<Json<StudentCheck>, Problem> {
    if auth.email != email {
        return Ok(Json(StudentCheck { student: false }));
    }

    Ok(Json(StudentCheck {
        student: db.user_role(&email).await? == Some(Role::Student),
    }))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RoleChange {
    pub role: Role,
}

#[patch("/admin/users/role/<id>", format = "application/json", data = "<change>")]
#[tracing::instrument(skip(db, _admin))]
pub async fn user_role_set(
    id: Uuid,
    change: Json<RoleChange>,
    _admin: AdminUser,
    db: &State<Database>,
) -> Result<Json<UpdateReport>, Problem> {
    Ok(Json(db.set_user_role(id, change.role).await?))
}
