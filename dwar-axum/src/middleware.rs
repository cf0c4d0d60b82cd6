use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use dwar::Dwar;
use dwar_core::repositories::RepositoryProvider;

use crate::error::ApiError;

pub struct AuthState<R: RepositoryProvider> {
    pub dwar: Arc<Dwar<R>>,
}

impl<R: RepositoryProvider> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            dwar: self.dwar.clone(),
        }
    }
}

/// Verify the access token, if one is present, and attach its claims to the
/// request
///
/// Never rejects; handlers decide whether claims are required via the
/// [`AuthClaims`](crate::extractors::AuthClaims) extractor.
pub async fn auth_middleware<R>(
    State(state): State<AuthState<R>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response
where
    R: RepositoryProvider,
{
    if let Some(token) = access_token_from(&request, &jar) {
        match state.dwar.verify_access_token(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
            }
            Err(e) => {
                tracing::debug!("Invalid access token: {e}");
            }
        }
    }

    next.run(request).await
}

/// Reject the request outright unless it carries a verifiable access token
pub async fn require_auth<R>(
    State(state): State<AuthState<R>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    R: RepositoryProvider,
{
    let token = access_token_from(&request, &jar).ok_or(ApiError::Unauthorized)?;

    state
        .dwar
        .verify_access_token(&token)
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(next.run(request).await)
}

// Bearer header first, then the access-token cookie
fn access_token_from(request: &Request, jar: &CookieJar) -> Option<String> {
    request
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| token.to_string())
        .or_else(|| jar.get("accessToken").map(|c| c.value().to_string()))
}
