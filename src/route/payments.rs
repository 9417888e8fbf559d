use mongodb::{Client, Database};
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::data::payment::db::{CommitReport, PaymentDbExt};
use crate::data::payment::Payment;
use crate::middleware::auth::StudentUser;
use crate::resp::jwt::AuthClaims;
use crate::resp::problem::Problem;
use crate::stripe::StripeClient;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentIntentRequest {
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// Asks the payment processor for a card charge the client can confirm.
#[utoipa::path(
    request_body = PaymentIntentRequest,
    responses(
        (status = 200, description = "Processor client secret", body = PaymentIntentResponse),
        (status = 401, description = "Missing or invalid bearer token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/create-payment-intent", format = "application/json", data = "<request>")]
#[tracing::instrument(skip(stripe, _auth))]
pub async fn create_payment_intent(
    request: Json<PaymentIntentRequest>,
    _auth: AuthClaims,
    stripe: &State<StripeClient>,
) -> Result<Json<PaymentIntentResponse>, Problem> {
    let intent = stripe.create_payment_intent(request.price).await?;

    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentRequest {
    #[schema(format = "email")]
    pub email: String,
    pub price: f64,
    #[serde(default)]
    pub cart_ids: Vec<Uuid>,
    #[serde(default)]
    pub classes_ids: Vec<Uuid>,
}

/// Checkout commit: records the payment, clears the purchased cart items and
/// enrolls the payer, all-or-nothing.
#[utoipa::path(
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Combined results of the three writes", body = CommitReport),
        (status = 403, description = "Authenticated user isn't a student", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/payments", format = "application/json", data = "<request>")]
#[tracing::instrument(skip(db, client, _student))]
pub async fn payment_commit(
    request: Json<PaymentRequest>,
    _student: StudentUser,
    db: &State<Database>,
    client: &State<Client>,
) -> Result<Json<CommitReport>, Problem> {
    let request = request.into_inner();
    let payment = Payment::new(
        request.email,
        request.price,
        request.cart_ids,
        request.classes_ids,
    );

    Ok(Json(db.commit_payment(client, payment).await?))
}

/// A student's payment history, most recent first.
#[get("/payments/<email>")]
#[tracing::instrument(skip(db, _student))]
pub async fn payment_history(
    email: String,
    _student: StudentUser,
    db: &State<Database>,
) -> Result<Json<Vec<Payment>>, Problem> {
    Ok(Json(db.payments_by_email(&email).await?))
}
