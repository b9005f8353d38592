//! The login route handler.

use std::str::FromStr;

use axum::{Json, extract::State};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::token::encode_token,
    models::{User, UserView},
    receipts::ReceiptStore,
    state::AppState,
};

/// The email/password pair sent by the client.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// The user's email address.
    pub email: String,
    /// The user's raw password.
    pub password: String,
}

/// The response to a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogInResponse {
    /// The bearer token for subsequent requests.
    pub token: String,
    /// The logged-in user, without any credential field.
    pub user: UserView,
}

/// Verify a user's credentials and hand out an auth token.
///
/// Unknown emails and wrong passwords are indistinguishable in the response.
pub async fn post_log_in<R: ReceiptStore>(
    State(state): State<AppState<R>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LogInResponse>, Error> {
    let email = EmailAddress::from_str(credentials.email.trim())
        .map_err(|_| Error::InvalidCredentials)?;

    let user = User::select_by_email(&email, &state.db_connection().lock().unwrap())
        .map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            other => other,
        })?;

    if !user.password_hash.verify(&credentials.password)? {
        return Err(Error::InvalidCredentials);
    }

    let token = encode_token(user.id, state.encoding_key())?;

    Ok(Json(LogInResponse {
        token,
        user: user.into(),
    }))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use email_address::EmailAddress;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        models::{NewUser, PasswordHash, Role},
        routing::build_router,
        test_utils::test_state,
    };

    use super::LogInResponse;

    const EMAIL: &str = "ganesh@example.com";
    const PASSWORD: &str = "correct horse battery staple";

    fn server_with_user() -> TestServer {
        let state = test_state();
        {
            let connection = state.db_connection().lock().unwrap();
            NewUser {
                name: "Ganesh".to_owned(),
                email: EmailAddress::from_str(EMAIL).unwrap(),
                password_hash: PasswordHash::from_raw_password(PASSWORD, 4).unwrap(),
                role: Role::Member,
            }
            .insert(&connection)
            .unwrap();
        }

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn log_in_with_valid_credentials_returns_a_working_token() {
        let server = server_with_user();

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": EMAIL, "password": PASSWORD }))
            .await;

        response.assert_status_ok();
        let body: LogInResponse = response.json();
        assert_eq!(body.user.email.as_str(), EMAIL);
        assert_eq!(body.user.role, Role::Member);

        let authed = server
            .get(endpoints::COLLECTIONS)
            .authorization_bearer(body.token)
            .await;
        authed.assert_status_ok();
    }

    #[tokio::test]
    async fn log_in_response_contains_no_password() {
        let server = server_with_user();

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": EMAIL, "password": PASSWORD }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let server = server_with_user();

        let wrong_password = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": EMAIL, "password": "wrong" }))
            .await;
        let unknown_email = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "nobody@example.com", "password": PASSWORD }))
            .await;

        wrong_password.assert_status(StatusCode::UNAUTHORIZED);
        unknown_email.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.text(), unknown_email.text());
    }

    #[tokio::test]
    async fn malformed_email_is_rejected_like_bad_credentials() {
        let server = server_with_user();

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "not an email", "password": PASSWORD }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({ "error": "invalid credentials" }));
    }
}
