//! # Dwar Axum Integration
//!
//! Axum routes and middleware for the dwar two-step login flow: OTP issuance
//! and verification, token-pair cookies, renewal, and logout.
//!
//! ## Endpoints
//!
//! - `POST /send-otp`, `POST /verify-otp` - the two login steps
//! - `POST /admin/send-otp`, `POST /admin/verify-otp` - role-gated variants
//! - `POST /refresh-token` - mint a new access token from the refresh cookie
//! - `POST /logout` - revoke the refresh token and clear both cookies
//! - `GET /me` - current account profile, access-token guarded
//! - `GET /health` - storage health check
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::Router;
//! use dwar::{Dwar, FileDelivery, JwtConfig};
//! use dwar_storage_memory::MemoryRepositoryProvider;
//! use dwar_axum::{routes, CookieConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let repositories = Arc::new(MemoryRepositoryProvider::new());
//!     let delivery = Box::new(FileDelivery::new("/tmp/dwar-otp").unwrap());
//!     let dwar = Arc::new(Dwar::new(
//!         repositories,
//!         delivery,
//!         JwtConfig::new_hs256(b"change-me-to-a-real-secret".to_vec()),
//!     ));
//!
//!     let auth_routes = routes(dwar).with_cookie_config(CookieConfig::development());
//!
//!     let app = Router::new().nest("/auth", auth_routes.build());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

mod error;
mod extractors;
mod middleware;
mod routes;
mod types;

pub use error::{ApiError, Result};
pub use extractors::{
    AccessTokenFromRequest, AuthClaims, OptionalAuthClaims, RefreshTokenFromCookie,
};
pub use middleware::{AuthState, auth_middleware, require_auth};
pub use routes::create_router;
pub use types::{
    CookieConfig, HealthResponse, MessageResponse, ProfileResponse, RefreshResponse,
    SendOtpRequest, SendOtpResponse, VerifyOtpRequest, VerifyOtpResponse,
};

use axum::Router;
use dwar::Dwar;
use dwar_core::repositories::RepositoryProvider;
use std::sync::Arc;

/// Create authentication routes for your Axum application.
///
/// # Arguments
///
/// * `dwar` - An Arc-wrapped Dwar instance configured with your storage
///   backend and delivery transport
///
/// # Returns
///
/// A builder whose router can be nested into your application at any path
/// (e.g., "/auth")
pub fn routes<R>(dwar: Arc<Dwar<R>>) -> AuthRouterBuilder<R>
where
    R: RepositoryProvider + 'static,
{
    AuthRouterBuilder {
        dwar,
        cookie_config: CookieConfig::default(),
    }
}

/// Builder for configuring authentication routes
pub struct AuthRouterBuilder<R: RepositoryProvider> {
    dwar: Arc<Dwar<R>>,
    cookie_config: CookieConfig,
}

impl<R: RepositoryProvider + 'static> AuthRouterBuilder<R> {
    /// Set custom cookie configuration
    pub fn with_cookie_config(mut self, config: CookieConfig) -> Self {
        self.cookie_config = config;
        self
    }

    /// Build the router with the configured options
    pub fn build(self) -> Router {
        create_router(self.dwar, self.cookie_config)
    }
}

impl<R: RepositoryProvider + 'static> From<AuthRouterBuilder<R>> for Router {
    fn from(builder: AuthRouterBuilder<R>) -> Self {
        builder.build()
    }
}
