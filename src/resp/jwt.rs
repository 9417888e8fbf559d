use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use serde::{Deserialize, Serialize};

use super::util::date_time_as_unix_seconds;
use crate::resp::problem::Problem;
use crate::security::Security;

pub static AUTH_HEADER_NAME: &str = "Authorization";
pub static BEARER_PREFIX: &str = "Bearer ";

/// Identity claims carried by a signed bearer token.
///
/// Tokens are valid for one hour from issue and there is no refresh
/// mechanism; the client requests a new token instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthClaims {
    #[serde(with = "date_time_as_unix_seconds")]
    iat: DateTime<Utc>,
    #[serde(with = "date_time_as_unix_seconds")]
    exp: DateTime<Utc>,
    pub email: String,
}

impl AuthClaims {
    pub fn new(email: impl ToString) -> AuthClaims {
        let now = Utc::now();
        AuthClaims {
            iat: now,
            exp: now + Duration::hours(1),
            email: email.to_string(),
        }
    }

    pub fn encode_jwt(
        &self,
        secret: impl AsRef<[u8]>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(secret.as_ref());

        encode(&header, &self, &key)
    }
}

pub fn auth_problem(detail: impl ToString) -> Problem {
    Problem::new_untyped(Status::Unauthorized, "unauthorized access")
        .detail(detail)
        .insert("error", true)
        .insert_str("message", "unauthorized access")
        .clone()
}

pub fn decode_jwt(token: &str, secret: impl AsRef<[u8]>) -> Result<AuthClaims, Problem> {
    decode::<AuthClaims>(
        &token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| auth_problem("Bearer token was malformed or expired."))
}

pub fn extract_claims(
    authorization: Option<&str>,
    secret: impl AsRef<[u8]>,
) -> Result<AuthClaims, Problem> {
    let header = match authorization {
        Some(it) => it,
        None => {
            return Err(auth_problem("No Authorization header."));
        }
    };

    let token = match header.strip_prefix(BEARER_PREFIX) {
        Some(it) => it,
        None => {
            return Err(auth_problem("Authorization header isn't a bearer token."));
        }
    };
    tracing::debug!("extracted bearer token from request headers");

    let claims = decode_jwt(token, secret)?;
    tracing::debug!("decoded auth claims for: {}", claims.email);

    Ok(claims)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthClaims {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let security: &Security = req.rocket().state().expect("security state is managed");

        tracing::trace!("extracting auth claims from request headers");
        let authorization = req.headers().get_one(AUTH_HEADER_NAME);
        let claims = match extract_claims(authorization, &security.token_secret) {
            Ok(it) => it,
            Err(e) => {
                tracing::debug!("unable to extract claims from request headers");
                return Outcome::Error((Status::Unauthorized, e));
            }
        };

        Outcome::Success(claims)
    }
}

pub mod doc {
    use utoipa::openapi::security::*;

    #[derive(Clone, Copy)]
    pub struct JWTAuth;

    impl From<JWTAuth> for SecurityScheme {
        fn from(_: JWTAuth) -> SecurityScheme {
            let mut http = Http::new(HttpAuthScheme::Bearer);
            http.bearer_format = Some("JWT".to_string());
            SecurityScheme::Http(http)
        }
    }

    impl utoipa::Modify for JWTAuth {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            let c = openapi.components.as_mut().unwrap();
            c.add_security_scheme("jwt", *self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;

    const SECRET: &[u8] = b"test-signing-secret";

    #[test]
    fn jwt_configured_properly() {
        let mut now = Utc::now();
        now = now.round_subsecs(0);

        let claims = AuthClaims {
            iat: now,
            exp: now + Duration::hours(1),
            email: "a@x.com".to_string(),
        };

        let token = claims
            .encode_jwt(SECRET)
            .expect("encoding should work for example");

        let decoded = decode_jwt(&token, SECRET).expect("unable to decode encoded token");

        assert_eq!(now, decoded.iat);
        assert_eq!(now + Duration::hours(1), decoded.exp);
        assert_eq!(decoded.email, "a@x.com");
    }

    #[test]
    fn expired_jwt_is_rejected() {
        let now = Utc::now();

        let claims = AuthClaims {
            iat: now - Duration::hours(2),
            exp: now - Duration::hours(1),
            email: "a@x.com".to_string(),
        };

        let token = claims.encode_jwt(SECRET).expect("encoding should work");

        assert!(decode_jwt(&token, SECRET).is_err());
    }

    #[test]
    fn jwt_signed_with_other_secret_is_rejected() {
        let token = AuthClaims::new("a@x.com")
            .encode_jwt(b"other-secret")
            .expect("encoding should work");

        assert!(decode_jwt(&token, SECRET).is_err());
    }

    #[test]
    fn bearer_header_is_required() {
        let token = AuthClaims::new("a@x.com")
            .encode_jwt(SECRET)
            .expect("encoding should work");

        assert!(extract_claims(None, SECRET).is_err());
        assert!(extract_claims(Some(token.as_str()), SECRET).is_err());
        assert!(extract_claims(Some(&format!("Bearer {}", token)), SECRET).is_ok());
    }
}
