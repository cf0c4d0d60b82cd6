//! Core functionality for the dwar authentication ecosystem
//!
//! This crate implements the credential-to-session exchange used by the
//! Hello Samaj civic portal: a password check followed by a short-lived
//! one-time code, followed by issuance of an access/refresh token pair.
//!
//! The crate is transport-agnostic. Storage is abstracted behind the
//! repository traits in [`repositories`], and outbound code delivery behind
//! [`services::OtpDelivery`], so the same services run against an in-memory
//! store in a single process or a shared store in a multi-process deployment.
//!
//! See [`Account`] for the account record, [`OtpChallenge`] for an in-flight
//! code challenge, and [`SessionPair`] for the issued token pair.

pub mod account;
pub mod challenge;
pub mod error;
pub mod id;
pub mod repositories;
pub mod services;
pub mod token;
pub mod validation;

pub use account::{Account, AccountId, Role};
pub use challenge::{ChallengeId, DeliveryChannel, OtpChallenge};
pub use error::Error;
pub use token::{AccessClaims, JwtAlgorithm, JwtConfig, RefreshToken, SessionPair};
