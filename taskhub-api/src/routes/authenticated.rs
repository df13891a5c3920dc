/// `GET /authenticated-route`
///
/// Smallest possible protected endpoint; useful for checking a token.

use crate::schemas::auth::AuthenticatedResponse;
use axum::{Extension, Json};
use taskhub_shared::auth::middleware::Principal;

pub async fn authenticated_route(
    Extension(principal): Extension<Principal>,
) -> Json<AuthenticatedResponse> {
    Json(AuthenticatedResponse {
        message: format!("Hello {}!", principal.user.email),
        user_id: principal.id(),
    })
}
