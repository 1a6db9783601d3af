use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use rand::RngExt;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::domain::repository::{NotificationSink, OtpStore, PolicyStore};
use crate::domain::types::{DeliveryMethod, OtpCode, OtpStatus};
use crate::error::OtpServiceError;

/// Draw `length` independent uniform decimal digits from the CSPRNG.
/// The result is a fixed-length string — leading zeros are legitimate and
/// the code is never parsed back into an integer.
fn generate_code(length: u8) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

// ── OperationLocks ───────────────────────────────────────────────────────────

/// Keyed async mutex serializing generate/validate per operation id.
///
/// Distinct operation ids never contend. Idle entries (no guard held, no
/// waiter) are pruned on the next acquire, so the map does not grow with
/// the lifetime set of operation ids.
#[derive(Default)]
pub struct OperationLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl OperationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, operation_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            // strong_count == 1 means only the map holds the Arc: idle entry.
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            Arc::clone(locks.entry(operation_id.to_owned()).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap().len()
    }
}

// ── GenerateOtp ──────────────────────────────────────────────────────────────

pub struct GenerateOtpInput {
    pub user_id: Uuid,
    pub operation_id: String,
    pub delivery_method: DeliveryMethod,
}

pub struct GenerateOtpUseCase<O, P, N>
where
    O: OtpStore,
    P: PolicyStore,
    N: NotificationSink,
{
    pub otp_codes: O,
    pub policy: P,
    pub notifier: N,
    pub locks: Arc<OperationLocks>,
}

impl<O, P, N> GenerateOtpUseCase<O, P, N>
where
    O: OtpStore,
    P: PolicyStore,
    N: NotificationSink,
{
    /// Issue a fresh code for an operation id, superseding any Active
    /// predecessor, and hand it to the delivery channel.
    ///
    /// The supersede-then-insert runs under the per-operation-id lock so two
    /// simultaneously-Active records are never observable. Delivery happens
    /// after the record is committed and outside the lock: a failed send is
    /// reported as a Delivery error, but the record stays Active and
    /// redeemable. Rolling it back would invalidate a code the user may
    /// still receive.
    pub async fn execute(&self, input: GenerateOtpInput) -> Result<String, OtpServiceError> {
        let policy = self.policy.get().await?;
        let code = generate_code(policy.code_length);
        let now = Utc::now();
        let record = OtpCode {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            operation_id: input.operation_id.clone(),
            code: code.clone(),
            status: OtpStatus::Active,
            delivery_method: input.delivery_method,
            created_at: now,
            expires_at: now + Duration::minutes(policy.expiry_minutes),
            used_at: None,
        };

        {
            let _guard = self.locks.acquire(&input.operation_id).await;
            if let Some(existing) = self.otp_codes.find_by_operation_id(&input.operation_id).await?
            {
                if existing.status == OtpStatus::Active {
                    self.otp_codes
                        .update_status(existing.id, OtpStatus::Expired, None)
                        .await?;
                }
            }
            self.otp_codes.save(&record).await?;
        }

        self.notifier
            .send(input.user_id, &code, input.delivery_method)
            .await?;

        Ok(input.operation_id)
    }
}

// ── ValidateOtp ──────────────────────────────────────────────────────────────

pub struct ValidateOtpUseCase<O: OtpStore> {
    pub otp_codes: O,
    pub locks: Arc<OperationLocks>,
}

impl<O: OtpStore> ValidateOtpUseCase<O> {
    /// Redeem a code. Every miss is `false` — unknown operation id, terminal
    /// status, past expiry (transitioned to Expired on the spot), or a code
    /// mismatch — so the boolean leaks nothing beyond redeemability. A
    /// mismatch leaves the record Active; retries are unbounded until expiry.
    pub async fn execute(
        &self,
        operation_id: &str,
        supplied_code: &str,
    ) -> Result<bool, OtpServiceError> {
        let _guard = self.locks.acquire(operation_id).await;

        let Some(record) = self.otp_codes.find_by_operation_id(operation_id).await? else {
            return Ok(false);
        };
        if record.status != OtpStatus::Active {
            return Ok(false);
        }
        let now = Utc::now();
        if record.is_expired_at(now) {
            // Lazy expiry; the periodic sweep reaching this row later is a no-op.
            self.otp_codes
                .update_status(record.id, OtpStatus::Expired, None)
                .await?;
            return Ok(false);
        }
        if record.code != supplied_code {
            return Ok(false);
        }

        self.otp_codes
            .update_status(record.id, OtpStatus::Used, Some(now))
            .await?;
        Ok(true)
    }
}

// ── SweepExpired ─────────────────────────────────────────────────────────────

pub struct SweepExpiredUseCase<O: OtpStore> {
    pub otp_codes: O,
}

impl<O: OtpStore> SweepExpiredUseCase<O> {
    /// Batch-expire overdue Active records. Idempotent — a second run over
    /// the same rows counts zero — and Used rows are never touched.
    pub async fn execute(&self) -> Result<u64, OtpServiceError> {
        self.otp_codes.bulk_expire(Utc::now()).await
    }
}
