use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::NotificationSink;
use crate::domain::types::DeliveryMethod;
use crate::error::OtpServiceError;

/// File delivery channel: appends one `user_id,code,method,timestamp` line
/// per send. SMS/email/chat integrations live outside this service; the
/// file channel is the one the service ships with.
#[derive(Clone)]
pub struct FileNotificationSink {
    path: PathBuf,
}

impl FileNotificationSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl NotificationSink for FileNotificationSink {
    async fn send(
        &self,
        user_id: Uuid,
        code: &str,
        method: DeliveryMethod,
    ) -> Result<(), OtpServiceError> {
        let line = format!("{user_id},{code},{},{}\n", method.as_str(), Utc::now());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| OtpServiceError::Delivery(e.into()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| OtpServiceError::Delivery(e.into()))?;
        tracing::info!(%user_id, method = method.as_str(), "otp written to delivery log");
        Ok(())
    }
}
