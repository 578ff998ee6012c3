//! Admin token extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use edge_core::admin_token::AdminAccess;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the shared admin secret.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Extractor proving the `x-admin-token` header was verified.
///
/// Rejects with 401 before the handler runs (and before any request body is
/// read) when the header is missing, not valid UTF-8, or wrong. The token is
/// checked once here; handlers pass the resulting [`AdminAccess`] to the
/// [`AdminGateway`](edge_core::jobs::AdminGateway).
///
/// ```ignore
/// async fn my_handler(AdminToken(access): AdminToken, State(state): State<AppState>) -> AppResult<Json<()>> {
///     state.gateway.list_jobs(&access).await?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AdminToken(pub AdminAccess);

impl FromRequestParts<AppState> for AdminToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());

        match state.gateway.authorize(presented) {
            Ok(access) => Ok(AdminToken(access)),
            Err(e) => {
                tracing::warn!(
                    path = %parts.uri.path(),
                    header_present = presented.is_some(),
                    "Rejected admin request"
                );
                Err(e.into())
            }
        }
    }
}
