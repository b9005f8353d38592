//! Creation and validation of the JWTs that authenticate requests.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, models::UserID};

/// How long a token stays valid after it is issued.
pub const TOKEN_DURATION: Duration = Duration::hours(24);

/// The claims embedded in an auth token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the authenticated user.
    pub sub: i64,
    /// The expiry time as a unix timestamp.
    pub exp: usize,
    /// When the token was issued, as a unix timestamp.
    pub iat: usize,
}

/// Create a signed token for `user_id` that expires in [TOKEN_DURATION].
pub fn encode_token(user_id: UserID, encoding_key: &EncodingKey) -> Result<String, Error> {
    encode_token_issued_at(user_id, OffsetDateTime::now_utc(), encoding_key)
}

pub(crate) fn encode_token_issued_at(
    user_id: UserID,
    issued_at: OffsetDateTime,
    encoding_key: &EncodingKey,
) -> Result<String, Error> {
    let claims = Claims {
        sub: user_id.as_i64(),
        exp: (issued_at + TOKEN_DURATION).unix_timestamp() as usize,
        iat: issued_at.unix_timestamp() as usize,
    };

    encode(&Header::default(), &claims, encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Validate `token` and return its claims.
///
/// # Errors
///
/// Returns [Error::ExpiredToken] for a well-formed token past its expiry and
/// [Error::InvalidToken] for anything else that fails validation.
pub fn decode_token(token: &str, decoding_key: &DecodingKey) -> Result<Claims, Error> {
    decode::<Claims>(token, decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|error| match error.kind() {
            ErrorKind::ExpiredSignature => Error::ExpiredToken,
            _ => Error::InvalidToken,
        })
}
