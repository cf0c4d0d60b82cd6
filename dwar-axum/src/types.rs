use dwar::AccountProfile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOtpRequest {
    pub email: String,
    pub password: String,
    /// `"email"` or `"sms"`; validated in the handler so a bad value renders
    /// the uniform error payload instead of a deserialization rejection
    pub channel: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub handle: String,
    pub code: String,
    pub channel: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendOtpResponse {
    pub success: bool,
    pub message: String,
    pub data: SendOtpData,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendOtpData {
    pub handle: String,
    pub channel: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub message: String,
    pub data: AccountProfile,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub data: AccountProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Cookie attributes applied to the token cookies
///
/// Lifetimes come from the session configuration at issuance time; this only
/// carries the security attributes that differ between deployments.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub access_cookie_name: String,
    pub refresh_cookie_name: String,
    pub http_only: bool,
    pub secure: bool,
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_cookie_name: "accessToken".to_string(),
            refresh_cookie_name: "refreshToken".to_string(),
            http_only: true,
            secure: true,
            path: "/".to_string(),
        }
    }
}

impl CookieConfig {
    /// Like the default, but without the `Secure` attribute so cookies work
    /// over plain HTTP
    pub fn development() -> Self {
        Self {
            secure: false,
            ..Self::default()
        }
    }
}
