use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::request::{self, FromRequest, Request};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resp::problem::Problem;
use crate::role::Role;
use crate::security::Security;
use crate::util::date_time_as_unix_seconds;
use rocket::outcome::Outcome::{Error as Failure, Success};

pub static AUTH_COOKIE_NAME: &str = "jwt_auth";

/// Verified identity attached to every student request. Tokens are minted by
/// the identity provider; this backend only decodes and validates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    #[serde(with = "date_time_as_unix_seconds")]
    iat: DateTime<Utc>,
    #[serde(with = "date_time_as_unix_seconds")]
    exp: DateTime<Utc>,
    pub sub: Uuid,
    pub name: String,
    pub role: Role,
}

impl UserClaims {
    pub fn new(user: Uuid, name: impl ToString, role: Role) -> UserClaims {
        let now = Utc::now();
        UserClaims {
            iat: now,
            exp: now + Duration::weeks(1),
            sub: user,
            name: name.to_string(),
            role,
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
    Problem::new_untyped(Status::Unauthorized, "Unable to authorize user.")
        .detail(detail)
        .clone()
}

fn request_token(req: &Request<'_>) -> Option<String> {
    if let Some(header) = req.headers().get_one("Authorization") {
        if let Some(token) = header.strip_prefix("Bearer ") {
            return Some(token.to_owned());
        }
    }

    req.cookies()
        .get(AUTH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_owned())
}

pub fn decode_claims(
    token: impl AsRef<str>,
    secret: impl AsRef<[u8]>,
) -> Result<UserClaims, Problem> {
    match decode::<UserClaims>(
        token.as_ref(),
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    {
        Ok(it) => {
            tracing::debug!("decoded user claims for user: {}", it.sub);

            Ok(it)
        }
        Err(_) => Err(auth_problem("Bearer token was malformed.")),
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserClaims {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let security: &Security = req.rocket().state().unwrap();

        tracing::trace!("extracting user claims from request");
        let token = match request_token(req) {
            Some(it) => it,
            None => {
                return Failure((
                    Status::Unauthorized,
                    auth_problem("No bearer token or auth cookie."),
                ));
            }
        };

        let claims = match decode_claims(&token, &security.jwt_secret) {
            Ok(it) => it,
            Err(e) => {
                tracing::debug!("unable to decode claims from request token");
                return Failure((Status::Unauthorized, e));
            }
        };

        Success(claims)
    }
}

pub mod doc {
    use utoipa::openapi::security::*;

    #[derive(Clone, Copy)]
    pub struct JWTAuth;

    impl Into<SecurityScheme> for JWTAuth {
        fn into(self) -> SecurityScheme {
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            )
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

    #[test]
    fn jwt_configured_properly() {
        let mut now = Utc::now();
        now = now.round_subsecs(0);

        let user = Uuid::new_v4();

        let claims = UserClaims {
            iat: now,
            exp: now + Duration::weeks(1),
            sub: user,
            name: "Ada Lovelace".to_string(),
            role: Role::Student,
        };

        let secret = b"test-secret-not-for-production";

        let token = claims
            .encode_jwt(secret)
            .expect("encoding should work for example");

        let decoded = decode_claims(&token, secret).expect("unable to decode encoded token");

        assert_eq!(now, decoded.iat);
        assert_eq!(now + Duration::weeks(1), decoded.exp);
        assert_eq!(user, decoded.sub);
        assert_eq!(decoded.name, "Ada Lovelace");
        assert_eq!(decoded.role, Role::Student);
    }

    #[test]
    fn jwt_rejects_wrong_secret() {
        let claims = UserClaims::new(Uuid::new_v4(), "Grace Hopper", Role::Student);

        let token = claims
            .encode_jwt(b"one secret")
            .expect("encoding should work for example");

        assert!(decode_claims(&token, b"another secret").is_err());
    }
}
