//! Middleware guarding routes that need an authenticated (or admin) user.

use axum::{
    RequestPartsExt,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    Error,
    auth::token::decode_token,
    models::{Role, User, UserID},
    receipts::ReceiptStore,
    state::AppState,
};

/// Reject requests without a valid bearer token for an existing user.
///
/// On success, the authenticated [User] is attached to the request
/// extensions for downstream guards and handlers.
pub async fn auth_guard<R: ReceiptStore>(
    State(state): State<AppState<R>>,
    request: Request,
    next: Next,
) -> Result<Response, Error> {
    let (mut parts, body) = request.into_parts();

    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| Error::AuthenticationRequired)?;

    let claims = decode_token(bearer.token(), state.decoding_key())?;

    let user = User::select_by_id(
        UserID::new(claims.sub),
        &state.db_connection().lock().unwrap(),
    )
    .map_err(|error| match error {
        Error::NotFound => Error::UnknownUser,
        other => other,
    })?;

    parts.extensions.insert(user);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Reject requests whose authenticated user is not an admin.
///
/// Must run after [auth_guard], which attaches the user.
pub async fn admin_guard(request: Request, next: Next) -> Result<Response, Error> {
    match request.extensions().get::<User>() {
        Some(user) if user.role == Role::Admin => Ok(next.run(request).await),
        Some(_) => Err(Error::Forbidden),
        None => Err(Error::AuthenticationRequired),
    }
}
