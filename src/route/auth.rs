use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resp::jwt::AuthClaims;
use crate::resp::problem::Problem;
use crate::security::Security;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[schema(format = "email")]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Issues a signed identity token for the given email, valid for one hour.
#[utoipa::path(
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Signed bearer token", body = TokenResponse),
    )
)]
#[post("/jwt", format = "application/json", data = "<user>")]
#[tracing::instrument(skip(security))]
pub async fn jwt_issue(
    user: Json<TokenRequest>,
    security: &State<Security>,
) -> Result<Json<TokenResponse>, Problem> {
    let claims = AuthClaims::new(&user.email);
    let token = claims.encode_jwt(&security.token_secret)?;

    Ok(Json(TokenResponse { token }))
}

///////////////////////
//       TESTS
///////////////////////

#[cfg(test)]
mod auth_endpoints {
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;

    use super::TokenResponse;
    use crate::resp::jwt::decode_jwt;
    use crate::security::Security;

    fn test_rocket() -> rocket::Rocket<rocket::Build> {
        rocket::build()
            .manage(Security {
                token_secret: b"test-signing-secret".to_vec(),
            })
            .mount("/", routes![super::jwt_issue])
    }

    #[rocket::async_test]
    async fn jwt_issue_returns_decodable_token() {
        let client = Client::tracked(test_rocket())
            .await
            .expect("invalid backend");

        let response = client
            .post("/jwt")
            .header(ContentType::JSON)
            .body(r#"{"email":"a@x.com"}"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok, "an ok response");
        assert_eq!(
            response.content_type(),
            Some(ContentType::JSON),
            "not a application/json response"
        );

        let response_data: TokenResponse =
            response.into_json().await.expect("invalid response json");

        let claims = decode_jwt(&response_data.token, b"test-signing-secret")
            .expect("issued token should decode");
        assert_eq!(claims.email, "a@x.com");
    }

    #[rocket::async_test]
    async fn jwt_issue_rejects_missing_body() {
        let client = Client::tracked(test_rocket())
            .await
            .expect("invalid backend");

        let response = client
            .post("/jwt")
            .header(ContentType::JSON)
            .body("{}")
            .dispatch()
            .await;

        assert_ne!(response.status(), Status::Ok);
    }
}
