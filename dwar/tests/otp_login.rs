//! End-to-end tests for the two-step OTP login flow against the in-memory
//! storage backend.

use std::sync::Arc;

use async_trait::async_trait;
use dwar::{DeliveryChannel, Dwar, DwarError, JwtConfig, NewAccount, Role};
use dwar_core::{error::DeliveryError, services::OtpDelivery};
use dwar_storage_memory::MemoryRepositoryProvider;
use tokio::sync::Mutex;

const TEST_SECRET: &[u8] = b"integration_test_secret_key_not_for_production";

/// Delivery transport that records every dispatched code instead of sending it
#[derive(Clone, Default)]
struct RecordingDelivery {
    sent: Arc<Mutex<Vec<(DeliveryChannel, String, String)>>>,
}

impl RecordingDelivery {
    async fn last_code(&self) -> String {
        self.sent.lock().await.last().unwrap().2.clone()
    }
}

#[async_trait]
impl OtpDelivery for RecordingDelivery {
    async fn send_code(
        &self,
        channel: DeliveryChannel,
        to: &str,
        code: &str,
    ) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .await
            .push((channel, to.to_string(), code.to_string()));
        Ok(())
    }
}

/// Transport that always fails
struct BrokenDelivery;

#[async_trait]
impl OtpDelivery for BrokenDelivery {
    async fn send_code(
        &self,
        _channel: DeliveryChannel,
        _to: &str,
        _code: &str,
    ) -> Result<(), DeliveryError> {
        Err(DeliveryError::Transport("gateway unreachable".to_string()))
    }
}

async fn setup() -> (Dwar<MemoryRepositoryProvider>, RecordingDelivery) {
    let repositories = Arc::new(MemoryRepositoryProvider::new());
    let delivery = RecordingDelivery::default();
    let dwar = Dwar::new(
        repositories,
        Box::new(delivery.clone()),
        JwtConfig::new_hs256(TEST_SECRET.to_vec()),
    );

    dwar.register_account(
        NewAccount::new("asha", "asha@example.com").with_phone("+9779800000000"),
        "p1secret",
    )
    .await
    .unwrap();

    dwar.register_account(
        NewAccount::new("ward-admin", "admin@example.com").with_role(Role::WardAdmin),
        "adminsecret",
    )
    .await
    .unwrap();

    (dwar, delivery)
}

#[tokio::test]
async fn test_full_login_with_correct_code() {
    let (dwar, delivery) = setup().await;

    let challenge = dwar
        .send_otp("asha@example.com", "p1secret", DeliveryChannel::Email)
        .await
        .unwrap();
    let code = delivery.last_code().await;

    let account = dwar
        .verify_otp(&challenge.handle, &code, DeliveryChannel::Email)
        .await
        .unwrap();
    assert_eq!(account.email, "asha@example.com");

    let pair = dwar.issue_session(&account.id, false).await.unwrap();
    let claims = dwar.verify_access_token(&pair.access_token).unwrap();
    assert_eq!(claims.sub, account.id.to_string());
    assert_eq!(claims.username, "asha");
}

#[tokio::test]
async fn test_wrong_code_then_correct_code() {
    let (dwar, delivery) = setup().await;

    let challenge = dwar
        .send_otp("asha@example.com", "p1secret", DeliveryChannel::Email)
        .await
        .unwrap();
    let code = delivery.last_code().await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let result = dwar
        .verify_otp(&challenge.handle, wrong, DeliveryChannel::Email)
        .await;
    assert!(matches!(result, Err(DwarError::Auth(_))));

    // One wrong guess does not burn the handle
    let account = dwar
        .verify_otp(&challenge.handle, &code, DeliveryChannel::Email)
        .await
        .unwrap();
    assert_eq!(account.email, "asha@example.com");
}

#[tokio::test]
async fn test_handle_is_single_use() {
    let (dwar, delivery) = setup().await;

    let challenge = dwar
        .send_otp("asha@example.com", "p1secret", DeliveryChannel::Email)
        .await
        .unwrap();
    let code = delivery.last_code().await;

    dwar.verify_otp(&challenge.handle, &code, DeliveryChannel::Email)
        .await
        .unwrap();

    let replay = dwar
        .verify_otp(&challenge.handle, &code, DeliveryChannel::Email)
        .await;
    assert!(matches!(replay, Err(DwarError::NotFound(_))));
}

#[tokio::test]
async fn test_attempt_budget_exhaustion() {
    let (dwar, delivery) = setup().await;

    let challenge = dwar
        .send_otp("asha@example.com", "p1secret", DeliveryChannel::Email)
        .await
        .unwrap();
    let code = delivery.last_code().await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    for _ in 0..4 {
        let result = dwar
            .verify_otp(&challenge.handle, wrong, DeliveryChannel::Email)
            .await;
        assert!(matches!(result, Err(DwarError::Auth(_))));
    }

    // Fifth wrong guess invalidates the challenge
    let result = dwar
        .verify_otp(&challenge.handle, wrong, DeliveryChannel::Email)
        .await;
    assert!(matches!(result, Err(DwarError::Auth(_))));

    let result = dwar
        .verify_otp(&challenge.handle, &code, DeliveryChannel::Email)
        .await;
    assert!(matches!(result, Err(DwarError::NotFound(_))));
}

#[tokio::test]
async fn test_sms_channel_requires_phone() {
    let (dwar, delivery) = setup().await;

    // admin account has no phone registered
    let result = dwar
        .send_otp("admin@example.com", "adminsecret", DeliveryChannel::Sms)
        .await;
    assert!(matches!(result, Err(DwarError::Validation(_))));
    assert!(delivery.sent.lock().await.is_empty());

    let challenge = dwar
        .send_otp("asha@example.com", "p1secret", DeliveryChannel::Sms)
        .await
        .unwrap();
    assert_eq!(challenge.channel, DeliveryChannel::Sms);

    let sent = delivery.sent.lock().await;
    assert_eq!(sent[0].1, "+9779800000000");
}

#[tokio::test]
async fn test_bad_credentials_rejected() {
    let (dwar, delivery) = setup().await;

    let result = dwar
        .send_otp("asha@example.com", "wrong", DeliveryChannel::Email)
        .await;
    assert!(matches!(result, Err(DwarError::Auth(_))));

    let result = dwar
        .send_otp("nobody@example.com", "p1secret", DeliveryChannel::Email)
        .await;
    assert!(matches!(result, Err(DwarError::NotFound(_))));

    assert!(delivery.sent.lock().await.is_empty());
}

#[tokio::test]
async fn test_delivery_failure_is_retryable() {
    let repositories = Arc::new(MemoryRepositoryProvider::new());
    let dwar = Dwar::new(
        repositories,
        Box::new(BrokenDelivery),
        JwtConfig::new_hs256(TEST_SECRET.to_vec()),
    );
    dwar.register_account(NewAccount::new("asha", "asha@example.com"), "p1secret")
        .await
        .unwrap();

    let result = dwar
        .send_otp("asha@example.com", "p1secret", DeliveryChannel::Email)
        .await;
    assert!(matches!(result, Err(DwarError::Delivery(_))));
}

#[tokio::test]
async fn test_admin_flow_gates_on_role() {
    let (dwar, delivery) = setup().await;

    // Ordinary account cannot start an admin login
    let result = dwar
        .send_admin_otp("asha@example.com", "p1secret", DeliveryChannel::Email)
        .await;
    assert!(matches!(result, Err(DwarError::Forbidden(_))));
    assert!(delivery.sent.lock().await.is_empty());

    // Admin account completes the flow
    let challenge = dwar
        .send_admin_otp("admin@example.com", "adminsecret", DeliveryChannel::Email)
        .await
        .unwrap();
    let code = delivery.last_code().await;

    let account = dwar
        .verify_admin_otp(&challenge.handle, &code, DeliveryChannel::Email)
        .await
        .unwrap();
    assert_eq!(account.role, Role::WardAdmin);
}

#[tokio::test]
async fn test_channel_must_match_at_verification() {
    let (dwar, delivery) = setup().await;

    let challenge = dwar
        .send_otp("asha@example.com", "p1secret", DeliveryChannel::Email)
        .await
        .unwrap();
    let code = delivery.last_code().await;

    let result = dwar
        .verify_otp(&challenge.handle, &code, DeliveryChannel::Sms)
        .await;
    assert!(matches!(result, Err(DwarError::Validation(_))));
}
