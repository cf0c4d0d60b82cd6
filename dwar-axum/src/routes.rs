use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use dwar::{AccountId, ChallengeId, Dwar, DwarError};
use dwar_core::repositories::RepositoryProvider;

use crate::{
    error::{ApiError, Result},
    extractors::{AuthClaims, RefreshTokenFromCookie},
    middleware::{AuthState, auth_middleware},
    types::*,
};

pub fn create_router<R>(dwar: Arc<Dwar<R>>, cookie_config: CookieConfig) -> Router
where
    R: RepositoryProvider + 'static,
{
    let state = AuthState { dwar };

    Router::new()
        .route("/health", get(health_handler))
        .route("/send-otp", post(send_otp_handler))
        .route("/verify-otp", post(verify_otp_handler))
        .route("/logout", post(logout_handler))
        .route("/refresh-token", post(refresh_token_handler))
        .route("/admin/send-otp", post(admin_send_otp_handler))
        .route("/admin/verify-otp", post(admin_verify_otp_handler))
        .route("/me", get(me_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<R>,
        ))
        .with_state(state)
        .layer(axum::Extension(cookie_config))
}

async fn health_handler<R>(State(state): State<AuthState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state
        .dwar
        .health_check()
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn send_otp_handler<R>(
    State(state): State<AuthState<R>>,
    Json(payload): Json<SendOtpRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let channel = dwar_core::validation::validate_channel(&payload.channel)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let challenge = state
        .dwar
        .send_otp(&payload.email, &payload.password, channel)
        .await
        .map_err(flatten_unknown_account)?;

    Ok(Json(SendOtpResponse {
        success: true,
        message: challenge.message,
        data: SendOtpData {
            handle: challenge.handle.to_string(),
            channel: channel.to_string(),
        },
    }))
}

async fn admin_send_otp_handler<R>(
    State(state): State<AuthState<R>>,
    Json(payload): Json<SendOtpRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let channel = dwar_core::validation::validate_channel(&payload.channel)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let challenge = state
        .dwar
        .send_admin_otp(&payload.email, &payload.password, channel)
        .await
        .map_err(flatten_unknown_account)?;

    Ok(Json(SendOtpResponse {
        success: true,
        message: challenge.message,
        data: SendOtpData {
            handle: challenge.handle.to_string(),
            channel: channel.to_string(),
        },
    }))
}

async fn verify_otp_handler<R>(
    State(state): State<AuthState<R>>,
    axum::Extension(cookie_config): axum::Extension<CookieConfig>,
    jar: CookieJar,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let channel = dwar_core::validation::validate_channel(&payload.channel)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let handle = ChallengeId::new(&payload.handle);

    let account = state.dwar.verify_otp(&handle, &payload.code, channel).await?;
    complete_login(&state, &cookie_config, jar, account, payload.remember_me).await
}

async fn admin_verify_otp_handler<R>(
    State(state): State<AuthState<R>>,
    axum::Extension(cookie_config): axum::Extension<CookieConfig>,
    jar: CookieJar,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let channel = dwar_core::validation::validate_channel(&payload.channel)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let handle = ChallengeId::new(&payload.handle);

    let account = state
        .dwar
        .verify_admin_otp(&handle, &payload.code, channel)
        .await?;
    complete_login(&state, &cookie_config, jar, account, payload.remember_me).await
}

async fn complete_login<R>(
    state: &AuthState<R>,
    cookie_config: &CookieConfig,
    jar: CookieJar,
    account: dwar::Account,
    remember_me: bool,
) -> Result<(CookieJar, Json<VerifyOtpResponse>)>
where
    R: RepositoryProvider,
{
    let pair = state.dwar.issue_session(&account.id, remember_me).await?;

    // Both cookies live as long as the refresh token
    let max_age = state
        .dwar
        .session_config()
        .refresh_ttl_for(remember_me)
        .num_seconds();

    let jar = jar
        .add(token_cookie(
            cookie_config.access_cookie_name.clone(),
            pair.access_token.clone(),
            max_age,
            cookie_config,
            SameSite::Lax,
        ))
        .add(token_cookie(
            cookie_config.refresh_cookie_name.clone(),
            pair.refresh_token.as_str().to_string(),
            max_age,
            cookie_config,
            SameSite::Lax,
        ));

    Ok((
        jar,
        Json(VerifyOtpResponse {
            success: true,
            message: "Login successful".to_string(),
            data: pair.profile,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token.into_inner(),
        }),
    ))
}

async fn refresh_token_handler<R>(
    State(state): State<AuthState<R>>,
    axum::Extension(cookie_config): axum::Extension<CookieConfig>,
    jar: CookieJar,
    RefreshTokenFromCookie(refresh_token): RefreshTokenFromCookie,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let refresh_token = refresh_token.ok_or(ApiError::Unauthorized)?;

    let access_token = state.dwar.refresh_session(&refresh_token).await?;

    let max_age = state.dwar.session_config().access_ttl.num_seconds();
    let jar = jar.add(token_cookie(
        cookie_config.access_cookie_name.clone(),
        access_token.clone(),
        max_age,
        &cookie_config,
        SameSite::Lax,
    ));

    Ok((
        jar,
        Json(RefreshResponse {
            success: true,
            access_token,
        }),
    ))
}

async fn logout_handler<R>(
    State(state): State<AuthState<R>>,
    axum::Extension(cookie_config): axum::Extension<CookieConfig>,
    jar: CookieJar,
    RefreshTokenFromCookie(refresh_token): RefreshTokenFromCookie,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let refresh_token = refresh_token
        .ok_or_else(|| ApiError::BadRequest("No refresh token cookie".to_string()))?;

    // Revocation of an already-dead token still counts as a logout
    state.dwar.revoke_session(&refresh_token).await?;

    let jar = jar
        .add(removal_cookie(
            cookie_config.access_cookie_name.clone(),
            &cookie_config,
        ))
        .add(removal_cookie(
            cookie_config.refresh_cookie_name.clone(),
            &cookie_config,
        ));

    Ok((
        jar,
        Json(MessageResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    ))
}

async fn me_handler<R>(
    State(state): State<AuthState<R>>,
    AuthClaims(claims): AuthClaims,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let account = state
        .dwar
        .get_account(&AccountId::new(&claims.sub))
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(Json(ProfileResponse {
        success: true,
        data: account.profile(),
    }))
}

// Issuance routes report an unknown account the same way as a bad password
fn flatten_unknown_account(err: DwarError) -> ApiError {
    match err {
        DwarError::NotFound(msg) => ApiError::BadRequest(msg),
        e => e.into(),
    }
}

fn token_cookie(
    name: String,
    value: String,
    max_age_secs: i64,
    config: &CookieConfig,
    same_site: SameSite,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path(config.path.clone())
        .http_only(config.http_only)
        .secure(config.secure)
        .same_site(same_site)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

// Expired empty cookie; SameSite=Strict on the clearing cookie
fn removal_cookie(name: String, config: &CookieConfig) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path(config.path.clone())
        .http_only(config.http_only)
        .secure(config.secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .build()
}
