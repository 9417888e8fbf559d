use mongodb::Database;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::data::user::db::UserDbExt;
use crate::resp::jwt::AuthClaims;
use crate::resp::problem::Problem;
use crate::role::Role;

pub fn forbidden_problem() -> Problem {
    Problem::new_untyped(Status::Forbidden, "forbidden access")
        .insert("error", true)
        .insert_str("message", "forbidden access")
        .clone()
}

/// Second stage of the request gate: the authenticated email's current role
/// is resolved from the `users` collection on every request and compared to
/// the route requirement. Both stages deny by default.
async fn require_role(
    req: &'_ Request<'_>,
    required: Role,
) -> Result<AuthClaims, (Status, Problem)> {
    let claims = match req.guard::<AuthClaims>().await {
        Outcome::Success(claims) => claims,
        Outcome::Error((status, e)) => return Err((status, e)),
        Outcome::Forward(_) => {
            return Err((
                Status::Unauthorized,
                crate::resp::jwt::auth_problem("Unable to authenticate request."),
            ))
        }
    };

    let db: &Database = req.rocket().state().expect("database state is managed");

    match db.user_role(&claims.email).await {
        Ok(Some(role)) if role == required => Ok(claims),
        Ok(_) => {
            tracing::debug!("role mismatch for {}: {} required", claims.email, required);
            Err((Status::Forbidden, forbidden_problem()))
        }
        Err(e) => Err((Status::InternalServerError, e)),
    }
}

macro_rules! role_guard {
    ($name:ident, $role:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            pub claims: AuthClaims,
        }

        #[rocket::async_trait]
        impl<'r> FromRequest<'r> for $name {
            type Error = Problem;

            async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
                match require_role(req, $role).await {
                    Ok(claims) => Outcome::Success($name { claims }),
                    Err((status, e)) => Outcome::Error((status, e)),
                }
            }
        }
    };
}

role_guard!(AdminUser, Role::Admin);
role_guard!(InstructorUser, Role::Instructor);
role_guard!(StudentUser, Role::Student);
