//! Defines the errors that the application can produce and how they map to
//! HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur while handling a request.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required form field was absent or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A monetary amount could not be parsed, or was zero/negative.
    #[error("amount must be a positive number")]
    InvalidAmount,

    /// The multipart form body could not be read.
    #[error("could not read the multipart form: {0}")]
    MultipartError(String),

    /// The uploaded receipt was not an image or a PDF.
    #[error("only image files and PDFs are accepted as receipts")]
    UnsupportedReceiptType,

    /// The uploaded receipt exceeded the size ceiling.
    #[error("receipts must be 5 MiB or smaller")]
    ReceiptTooLarge,

    /// The email/password pair did not match a user.
    ///
    /// Deliberately covers both an unknown email and a wrong password so the
    /// response does not reveal which accounts exist.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No bearer token was attached to a request that needs one.
    #[error("access token required")]
    AuthenticationRequired,

    /// The bearer token was malformed or its signature did not verify.
    #[error("invalid token")]
    InvalidToken,

    /// The bearer token was valid but past its expiry.
    #[error("token expired")]
    ExpiredToken,

    /// The token referenced a user that no longer exists.
    #[error("user not found")]
    UnknownUser,

    /// The authenticated user lacks the admin role.
    #[error("admin privileges required")]
    Forbidden,

    /// The requested record does not exist.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A user with the given email already exists.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// Hashing or verifying a password failed.
    #[error("an error occurred while hashing a password: {0}")]
    HashingError(String),

    /// Signing a new auth token failed.
    #[error("could not create an auth token: {0}")]
    TokenCreation(String),

    /// The remote receipt store rejected an upload or was unreachable.
    #[error("remote receipt store error: {0}")]
    RemoteStoreError(String),

    /// An unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            rusqlite::Error::SqliteFailure(code, Some(ref description))
                if code.code == rusqlite::ErrorCode::ConstraintViolation
                    && description.contains("email") =>
            {
                Error::DuplicateEmail
            }
            error => Error::SqlError(error),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::MissingField(_)
            | Error::InvalidAmount
            | Error::MultipartError(_)
            | Error::UnsupportedReceiptType
            | Error::ReceiptTooLarge
            | Error::DuplicateEmail => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials
            | Error::AuthenticationRequired
            | Error::InvalidToken
            | Error::ExpiredToken
            | Error::UnknownUser => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::RemoteStoreError(_)
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self}");
            "an internal server error occurred".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
