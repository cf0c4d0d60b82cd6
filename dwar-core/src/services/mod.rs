//! Service layer implementing the login flow
//!
//! Services hold the business rules and talk to storage only through the
//! repository traits, so the same logic runs against any backend.

pub mod delivery;
pub mod otp;
pub mod session;

pub use delivery::{FileDelivery, OtpDelivery};
pub use otp::{ChallengeHandle, OtpConfig, OtpService};
pub use session::{SessionConfig, SessionService};
