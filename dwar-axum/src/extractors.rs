use axum::{
    Extension, RequestPartsExt,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::extract::CookieJar;
use dwar::AccessClaims;

use crate::error::ApiError;

/// Verified access-token claims, inserted by the auth middleware
///
/// Rejects with 401 when the request carried no verifiable access token.
pub struct AuthClaims(pub AccessClaims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Extension(claims): Extension<AccessClaims> = parts
            .extract()
            .await
            .map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthClaims(claims))
    }
}

pub struct OptionalAuthClaims(pub Option<AccessClaims>);

impl<S> FromRequestParts<S> for OptionalAuthClaims
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<AccessClaims>().cloned();

        Ok(OptionalAuthClaims(claims))
    }
}

/// The raw access token, from the `Authorization: Bearer` header or the
/// access-token cookie
pub struct AccessTokenFromRequest(pub Option<String>);

impl<S> FromRequestParts<S> for AccessTokenFromRequest
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(token) = parts
            .headers
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
        {
            return Ok(AccessTokenFromRequest(Some(token.to_string())));
        }

        // Fall back to cookie
        let jar = parts
            .extract::<CookieJar>()
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid cookie header"))?;

        let token = jar
            .get("accessToken")
            .map(|cookie| cookie.value().to_string());

        Ok(AccessTokenFromRequest(token))
    }
}

/// The raw refresh token from the refresh-token cookie
pub struct RefreshTokenFromCookie(pub Option<String>);

impl<S> FromRequestParts<S> for RefreshTokenFromCookie
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = parts
            .extract::<CookieJar>()
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid cookie header"))?;

        let token = jar
            .get("refreshToken")
            .map(|cookie| cookie.value().to_string());

        Ok(RefreshTokenFromCookie(token))
    }
}
