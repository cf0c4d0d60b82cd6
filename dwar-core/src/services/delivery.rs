//! Outbound one-time-code delivery
//!
//! Delivery is an external collaborator: the OTP service hands a code to an
//! [`OtpDelivery`] implementation and treats any failure as grounds to roll
//! the challenge back. Production deployments plug in an SMTP or SMS gateway;
//! [`FileDelivery`] writes dispatches to disk for local development.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{challenge::DeliveryChannel, error::DeliveryError};

/// Transport for dispatching one-time codes out-of-band
#[async_trait]
pub trait OtpDelivery: Send + Sync + 'static {
    /// Deliver `code` to `to` over the given channel.
    async fn send_code(
        &self,
        channel: DeliveryChannel,
        to: &str,
        code: &str,
    ) -> Result<(), DeliveryError>;
}

#[async_trait]
impl OtpDelivery for Box<dyn OtpDelivery> {
    async fn send_code(
        &self,
        channel: DeliveryChannel,
        to: &str,
        code: &str,
    ) -> Result<(), DeliveryError> {
        (**self).send_code(channel, to, code).await
    }
}

/// Development transport writing each dispatch to a file
///
/// One file per dispatch, named by timestamp, containing the channel,
/// recipient, and code.
#[derive(Debug, Clone)]
pub struct FileDelivery {
    output_dir: PathBuf,
}

impl FileDelivery {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self, DeliveryError> {
        let output_dir = output_dir.as_ref().to_path_buf();

        if !output_dir.exists() {
            std::fs::create_dir_all(&output_dir)
                .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        }

        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl OtpDelivery for FileDelivery {
    async fn send_code(
        &self,
        channel: DeliveryChannel,
        to: &str,
        code: &str,
    ) -> Result<(), DeliveryError> {
        let path = self.output_dir.join(format!(
            "otp-{}.txt",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let body = format!("channel: {channel}\nto: {to}\ncode: {code}\n");

        tokio::fs::write(&path, body)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        tracing::debug!(?path, %channel, to, "wrote one-time code dispatch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_delivery_writes_dispatch() {
        let dir = std::env::temp_dir().join(format!(
            "dwar-delivery-test-{}",
            crate::id::generate_prefixed_id("tmp")
        ));
        let delivery = FileDelivery::new(&dir).unwrap();

        delivery
            .send_code(DeliveryChannel::Email, "asha@example.com", "482913")
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
        assert_eq!(entries.len(), 1);

        let content = std::fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap();
        assert!(content.contains("asha@example.com"));
        assert!(content.contains("482913"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
