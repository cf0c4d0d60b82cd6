//! Session token pair: JWT access tokens and opaque refresh tokens
//!
//! The access token is a self-verifying JWT carrying identity claims; it is
//! never persisted and dies at its embedded expiry. The refresh token is an
//! opaque random value persisted on the account record, with a lifetime
//! scaled by the caller's stay-signed-in choice at verification time.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    account::{Account, AccountProfile, Role},
    error::{CryptoError, ValidationError},
    id::generate_random_string,
};

/// JWT algorithm type
#[derive(Debug, Clone)]
pub enum JwtAlgorithm {
    /// RS256 - RSA with SHA-256
    RS256 {
        /// Private key for signing JWTs (PEM format)
        private_key: Vec<u8>,
        /// Public key for verifying JWTs (PEM format)
        public_key: Vec<u8>,
    },
    /// HS256 - HMAC with SHA-256
    HS256 {
        /// Secret key for both signing and verifying
        secret_key: Vec<u8>,
    },
}

/// Configuration for access-token signing and verification
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Algorithm and keys for JWT
    pub algorithm: JwtAlgorithm,
    /// Issuer claim
    pub issuer: Option<String>,
}

impl JwtConfig {
    /// Create a new JWT configuration with RS256 algorithm
    pub fn new_rs256(private_key: Vec<u8>, public_key: Vec<u8>) -> Self {
        Self {
            algorithm: JwtAlgorithm::RS256 {
                private_key,
                public_key,
            },
            issuer: None,
        }
    }

    /// Create a new JWT configuration with HS256 algorithm
    pub fn new_hs256(secret_key: Vec<u8>) -> Self {
        Self {
            algorithm: JwtAlgorithm::HS256 { secret_key },
            issuer: None,
        }
    }

    /// Create a new JWT configuration from RSA key files (PEM format)
    pub fn from_rs256_pem_files(
        private_key_path: impl AsRef<Path>,
        public_key_path: impl AsRef<Path>,
    ) -> Result<Self, Error> {
        use std::fs::read;

        let private_key = read(private_key_path).map_err(|e| {
            ValidationError::InvalidField(format!("Failed to read private key file: {e}"))
        })?;

        let public_key = read(public_key_path).map_err(|e| {
            ValidationError::InvalidField(format!("Failed to read public key file: {e}"))
        })?;

        Ok(Self::new_rs256(private_key, public_key))
    }

    /// Set the issuer claim
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Get the algorithm to use with jsonwebtoken
    pub fn jwt_algorithm(&self) -> Algorithm {
        match &self.algorithm {
            JwtAlgorithm::RS256 { .. } => Algorithm::RS256,
            JwtAlgorithm::HS256 { .. } => Algorithm::HS256,
        }
    }

    /// Get the encoding key for signing
    pub fn get_encoding_key(&self) -> Result<EncodingKey, Error> {
        match &self.algorithm {
            JwtAlgorithm::RS256 { private_key, .. } => EncodingKey::from_rsa_pem(private_key)
                .map_err(|e| {
                    ValidationError::InvalidField(format!("Invalid RSA private key: {e}")).into()
                }),
            JwtAlgorithm::HS256 { secret_key } => Ok(EncodingKey::from_secret(secret_key)),
        }
    }

    /// Get the decoding key for verification
    pub fn get_decoding_key(&self) -> Result<DecodingKey, Error> {
        match &self.algorithm {
            JwtAlgorithm::RS256 { public_key, .. } => DecodingKey::from_rsa_pem(public_key)
                .map_err(|e| {
                    ValidationError::InvalidField(format!("Invalid RSA public key: {e}")).into()
                }),
            JwtAlgorithm::HS256 { secret_key } => Ok(DecodingKey::from_secret(secret_key)),
        }
    }

    /// Get the validation configuration for JWT verification
    pub fn get_validation(&self) -> Validation {
        Validation::new(self.jwt_algorithm())
    }
}

/// Claims embedded in an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - account ID
    pub sub: String,
    /// Email of the account
    pub email: String,
    /// Username of the account
    pub username: String,
    /// Role tag, as a lowercase string
    pub role: String,
    /// Issued at in seconds (as UTC timestamp)
    pub iat: i64,
    /// Expiration time in seconds (as UTC timestamp)
    pub exp: i64,
    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl AccessClaims {
    /// Build claims for an account with the given time-to-live.
    pub fn for_account(account: &Account, ttl: Duration, issuer: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            sub: account.id.to_string(),
            email: account.email.clone(),
            username: account.username.clone(),
            role: account.role.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: issuer,
        }
    }

    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// Sign an access token for the given claims.
pub fn sign_access_token(claims: &AccessClaims, config: &JwtConfig) -> Result<String, Error> {
    let header = Header::new(config.jwt_algorithm());
    let encoding_key = config.get_encoding_key()?;

    encode(&header, claims, &encoding_key)
        .map_err(|e| CryptoError::JwtSigning(e.to_string()).into())
}

/// Verify an access token's signature and expiry and return its claims.
pub fn verify_access_token(token: &str, config: &JwtConfig) -> Result<AccessClaims, Error> {
    let decoding_key = config.get_decoding_key()?;
    let validation = config.get_validation();

    let token_data = decode::<AccessClaims>(token, &decoding_key, &validation)
        .map_err(|e| CryptoError::JwtVerification(e.to_string()))?;

    Ok(token_data.claims)
}

/// An opaque long-lived token
///
/// Carries at least 256 bits of entropy; validity is determined by the copy
/// persisted on the account record, so overwriting that copy revokes the
/// token everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefreshToken(String);

impl RefreshToken {
    pub fn new(token: &str) -> Self {
        RefreshToken(token.to_string())
    }

    pub fn new_random() -> Self {
        RefreshToken(generate_random_string(32))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RefreshToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RefreshToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The token pair returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPair {
    /// Self-verifying JWT with a short fixed lifetime.
    pub access_token: String,

    /// Opaque renewable token persisted against the account.
    pub refresh_token: RefreshToken,

    /// When the refresh token stops being accepted.
    pub refresh_expires_at: DateTime<Utc>,

    /// The account's public profile.
    pub profile: AccountProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_HS256_SECRET: &[u8] = b"test_secret_key_for_hs256_jwt_tokens_not_for_production_use";

    fn test_account() -> Account {
        Account::builder()
            .username("asha")
            .email("asha@example.com")
            .role(Role::WardAdmin)
            .build()
            .unwrap()
    }

    #[test]
    fn test_access_token_round_trip() {
        let config = JwtConfig::new_hs256(TEST_HS256_SECRET.to_vec()).with_issuer("dwar-test");

        let account = test_account();
        let claims = AccessClaims::for_account(&account, Duration::minutes(15), config.issuer.clone());
        let token = sign_access_token(&claims, &config).unwrap();

        let verified = verify_access_token(&token, &config).unwrap();
        assert_eq!(verified.sub, account.id.to_string());
        assert_eq!(verified.email, "asha@example.com");
        assert_eq!(verified.username, "asha");
        assert_eq!(verified.role(), Some(Role::WardAdmin));
        assert_eq!(verified.iss, Some("dwar-test".to_string()));
    }

    #[test]
    fn test_expired_access_token_rejected() {
        let config = JwtConfig::new_hs256(TEST_HS256_SECRET.to_vec());

        let account = test_account();
        // jsonwebtoken's default leeway is 60 seconds, so push well past it
        let claims = AccessClaims::for_account(&account, Duration::minutes(-5), None);
        let token = sign_access_token(&claims, &config).unwrap();

        let result = verify_access_token(&token, &config);
        assert!(matches!(
            result,
            Err(Error::Crypto(CryptoError::JwtVerification(_)))
        ));
    }

    #[test]
    fn test_tampered_access_token_rejected() {
        let config = JwtConfig::new_hs256(TEST_HS256_SECRET.to_vec());
        let other = JwtConfig::new_hs256(b"another_secret_key_of_sufficient_length_for_tests".to_vec());

        let account = test_account();
        let claims = AccessClaims::for_account(&account, Duration::minutes(15), None);
        let token = sign_access_token(&claims, &config).unwrap();

        assert!(verify_access_token(&token, &other).is_err());
        assert!(verify_access_token("not.a.jwt", &config).is_err());
    }

    #[test]
    fn test_refresh_token_randomness() {
        let a = RefreshToken::new_random();
        let b = RefreshToken::new_random();
        assert_ne!(a, b);
        // 32 bytes base64url without padding
        assert!(a.as_str().len() >= 43);
    }
}
