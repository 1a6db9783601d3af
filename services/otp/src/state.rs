use std::sync::Arc;

use crate::infra::memory::{InMemoryOtpStore, InMemoryPolicyStore, InMemoryUserStore};
use crate::infra::notify::FileNotificationSink;
use crate::usecase::otp::OperationLocks;

/// Shared application state passed to every handler via axum `State`.
///
/// Stores are handles (Arc inside), so cloning the state clones views of
/// the same data.
#[derive(Clone)]
pub struct AppState {
    pub users: InMemoryUserStore,
    pub otp_codes: InMemoryOtpStore,
    pub policy: InMemoryPolicyStore,
    pub notifier: FileNotificationSink,
    pub locks: Arc<OperationLocks>,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl AppState {
    pub fn new(
        notifier: FileNotificationSink,
        jwt_secret: String,
        token_ttl_secs: u64,
    ) -> Self {
        Self {
            users: InMemoryUserStore::default(),
            otp_codes: InMemoryOtpStore::default(),
            policy: InMemoryPolicyStore::default(),
            notifier,
            locks: Arc::new(OperationLocks::new()),
            jwt_secret,
            token_ttl_secs,
        }
    }
}
