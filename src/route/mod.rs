use rocket::{Build, Rocket, Route};

pub mod auth;
pub mod cart;
pub mod classes;
pub mod payments;
pub mod stats;
pub mod toys;
pub mod users;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    data::{
        class::db::ClassUpdate,
        class::{Class, ClassStatus},
        payment::db::CommitReport,
        payment::Payment,
        toy::Toy,
        user::User,
        UpdateReport,
    },
    resp::{jwt::doc::JWTAuth, problem::Problem},
    role::Role,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::jwt_issue,
        users::user_create,
        users::is_admin,
        classes::approved_classes,
        classes::class_update,
        payments::create_payment_intent,
        payments::payment_commit,
        stats::admin_stats,
        toys::toys_search,
    ),
    components(schemas(
        Role,
        User,
        Class,
        ClassStatus,
        ClassUpdate,
        Payment,
        Toy,
        CommitReport,
        UpdateReport,
        auth::TokenRequest,
        auth::TokenResponse,
        users::NewUser,
        users::SignupResponse,
        users::AdminCheck,
        payments::PaymentIntentRequest,
        payments::PaymentIntentResponse,
        payments::PaymentRequest,
        stats::AdminStats,
        Problem
    )),
    modifiers(&JWTAuth)
)]
pub struct ApiDoc;

#[get("/")]
pub fn index() -> &'static str {
    "Coursemart data server is running."
}

pub fn api() -> Vec<Route> {
    routes![
        index,
        auth::jwt_issue,
        users::user_create,
        users::users_list,
        users::user_role_get,
        users::user_role_set,
        users::instructors_list,
        users::is_admin,
        users::is_instructor,
        users::is_student,
        classes::approved_classes,
        classes::teacher_classes,
        classes::admin_classes,
        classes::class_create,
        classes::class_feedback,
        classes::class_status,
        classes::class_update,
        classes::class_delete,
        classes::seats_get,
        classes::seats_set,
        classes::enrolled_classes,
        cart::cart_add,
        cart::cart_list,
        cart::cart_remove,
        payments::create_payment_intent,
        payments::payment_commit,
        payments::payment_history,
        stats::student_count,
        stats::admin_stats,
        stats::instructor_stats,
        stats::student_stats,
        toys::toys_search,
        toys::toy_categories,
        toys::toy_get,
        toys::toy_update,
        toys::toy_create,
        toys::toy_delete,
        toys::toys_total,
    ]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/", api()).mount(
        "/",
        SwaggerUi::new("/swagger/<_..>").url("/openapi.json", ApiDoc::openapi()),
    )
}
