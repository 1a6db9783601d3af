use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use passgate_otp::domain::repository::{OtpStore, PolicyStore};
use passgate_otp::domain::types::{DeliveryMethod, OtpStatus};
use passgate_otp::error::OtpServiceError;
use passgate_otp::infra::memory::{InMemoryOtpStore, InMemoryPolicyStore};
use passgate_otp::usecase::otp::{
    GenerateOtpInput, GenerateOtpUseCase, OperationLocks, SweepExpiredUseCase, ValidateOtpUseCase,
};

use crate::helpers::{FailingSink, RecordingSink, seed_code};

fn generate_usecase(
    otp_codes: &InMemoryOtpStore,
    policy: &InMemoryPolicyStore,
    locks: &Arc<OperationLocks>,
) -> GenerateOtpUseCase<InMemoryOtpStore, InMemoryPolicyStore, RecordingSink> {
    GenerateOtpUseCase {
        otp_codes: otp_codes.clone(),
        policy: policy.clone(),
        notifier: RecordingSink::default(),
        locks: Arc::clone(locks),
    }
}

fn validate_usecase(
    otp_codes: &InMemoryOtpStore,
    locks: &Arc<OperationLocks>,
) -> ValidateOtpUseCase<InMemoryOtpStore> {
    ValidateOtpUseCase {
        otp_codes: otp_codes.clone(),
        locks: Arc::clone(locks),
    }
}

// ── Generation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_generate_policy_length_codes_for_every_valid_length() {
    let otp_codes = InMemoryOtpStore::default();
    let policy = InMemoryPolicyStore::default();
    let locks = Arc::new(OperationLocks::new());

    for length in 4..=8u8 {
        policy.update(length, 7).await.unwrap();
        let operation_id = format!("op-len-{length}");

        let uc = generate_usecase(&otp_codes, &policy, &locks);
        let returned = uc
            .execute(GenerateOtpInput {
                user_id: Uuid::now_v7(),
                operation_id: operation_id.clone(),
                delivery_method: DeliveryMethod::Email,
            })
            .await
            .unwrap();
        assert_eq!(returned, operation_id, "operation id is returned unchanged");

        let record = otp_codes
            .find_by_operation_id(&operation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, OtpStatus::Active);
        assert_eq!(record.code.len(), length as usize);
        assert!(
            record.code.chars().all(|c| c.is_ascii_digit()),
            "code {:?} should be all digits",
            record.code
        );
        assert_eq!(
            record.expires_at - record.created_at,
            Duration::minutes(7),
            "expiry follows the policy in force at creation"
        );
    }
}

#[tokio::test]
async fn should_hand_generated_code_to_the_sink() {
    let otp_codes = InMemoryOtpStore::default();
    let policy = InMemoryPolicyStore::default();
    let locks = Arc::new(OperationLocks::new());
    let sink = RecordingSink::default();
    let sent = sink.sent_handle();
    let user_id = Uuid::now_v7();

    let uc = GenerateOtpUseCase {
        otp_codes: otp_codes.clone(),
        policy: policy.clone(),
        notifier: sink,
        locks: Arc::clone(&locks),
    };
    uc.execute(GenerateOtpInput {
        user_id,
        operation_id: "op-1".to_owned(),
        delivery_method: DeliveryMethod::Sms,
    })
    .await
    .unwrap();

    let record = otp_codes.find_by_operation_id("op-1").await.unwrap().unwrap();
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], (user_id, record.code.clone(), DeliveryMethod::Sms));
}

#[tokio::test]
async fn should_supersede_active_code_on_regenerate() {
    let otp_codes = InMemoryOtpStore::default();
    let policy = InMemoryPolicyStore::default();
    let locks = Arc::new(OperationLocks::new());
    let user_id = Uuid::now_v7();

    for _ in 0..2 {
        let uc = generate_usecase(&otp_codes, &policy, &locks);
        uc.execute(GenerateOtpInput {
            user_id,
            operation_id: "op-2".to_owned(),
            delivery_method: DeliveryMethod::Sms,
        })
        .await
        .unwrap();
    }

    let history = otp_codes.list_by_operation_id("op-2").await.unwrap();
    assert_eq!(history.len(), 2, "both records remain queryable");
    assert_eq!(history[0].status, OtpStatus::Active, "newest is active");
    assert_eq!(history[1].status, OtpStatus::Expired, "earlier was superseded");

    let active: Vec<_> = history
        .iter()
        .filter(|c| c.status == OtpStatus::Active)
        .collect();
    assert_eq!(active.len(), 1, "exactly one active record per operation id");
}

#[tokio::test]
async fn should_report_delivery_failure_but_keep_code_redeemable() {
    let otp_codes = InMemoryOtpStore::default();
    let policy = InMemoryPolicyStore::default();
    let locks = Arc::new(OperationLocks::new());

    let uc = GenerateOtpUseCase {
        otp_codes: otp_codes.clone(),
        policy: policy.clone(),
        notifier: FailingSink,
        locks: Arc::clone(&locks),
    };
    let result = uc
        .execute(GenerateOtpInput {
            user_id: Uuid::now_v7(),
            operation_id: "op-3".to_owned(),
            delivery_method: DeliveryMethod::Email,
        })
        .await;
    assert!(
        matches!(result, Err(OtpServiceError::Delivery(_))),
        "expected Delivery, got {result:?}"
    );

    // The committed record is not rolled back by the failed send.
    let record = otp_codes.find_by_operation_id("op-3").await.unwrap().unwrap();
    assert_eq!(record.status, OtpStatus::Active);

    let uc = validate_usecase(&otp_codes, &locks);
    assert!(uc.execute("op-3", &record.code).await.unwrap());
}

// ── Validation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_false_for_unknown_operation_id() {
    let otp_codes = InMemoryOtpStore::default();
    let locks = Arc::new(OperationLocks::new());

    let uc = validate_usecase(&otp_codes, &locks);
    assert!(!uc.execute("no-such-op", "123456").await.unwrap());
}

#[tokio::test]
async fn should_leave_state_unchanged_on_wrong_code() {
    let otp_codes = InMemoryOtpStore::default();
    let locks = Arc::new(OperationLocks::new());
    let record = seed_code(
        &otp_codes,
        Uuid::now_v7(),
        "op-4",
        "123456",
        OtpStatus::Active,
        Utc::now() + Duration::minutes(5),
    )
    .await;

    let uc = validate_usecase(&otp_codes, &locks);
    for _ in 0..5 {
        assert!(!uc.execute("op-4", "654321").await.unwrap());
    }

    let current = otp_codes.find_by_operation_id("op-4").await.unwrap().unwrap();
    assert_eq!(current.status, OtpStatus::Active, "misses never burn the code");

    // Still redeemable after any number of misses.
    assert!(uc.execute("op-4", &record.code).await.unwrap());
}

#[tokio::test]
async fn should_redeem_exactly_once() {
    let otp_codes = InMemoryOtpStore::default();
    let locks = Arc::new(OperationLocks::new());
    seed_code(
        &otp_codes,
        Uuid::now_v7(),
        "op-5",
        "123456",
        OtpStatus::Active,
        Utc::now() + Duration::minutes(5),
    )
    .await;

    let uc = validate_usecase(&otp_codes, &locks);
    assert!(uc.execute("op-5", "123456").await.unwrap());
    assert!(
        !uc.execute("op-5", "123456").await.unwrap(),
        "a used code never validates again"
    );

    let current = otp_codes.find_by_operation_id("op-5").await.unwrap().unwrap();
    assert_eq!(current.status, OtpStatus::Used);
    assert!(current.used_at.is_some());
}

#[tokio::test]
async fn should_lazily_expire_overdue_code_without_sweep() {
    let otp_codes = InMemoryOtpStore::default();
    let locks = Arc::new(OperationLocks::new());
    seed_code(
        &otp_codes,
        Uuid::now_v7(),
        "op-6",
        "123456",
        OtpStatus::Active,
        Utc::now() - Duration::minutes(1),
    )
    .await;

    let uc = validate_usecase(&otp_codes, &locks);
    assert!(
        !uc.execute("op-6", "123456").await.unwrap(),
        "right code, but past expiry"
    );

    let current = otp_codes.find_by_operation_id("op-6").await.unwrap().unwrap();
    assert_eq!(current.status, OtpStatus::Expired);
}

// ── Sweep ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_sweep_only_overdue_active_rows_and_be_idempotent() {
    let otp_codes = InMemoryOtpStore::default();
    let user_id = Uuid::now_v7();
    let past = Utc::now() - Duration::minutes(1);
    let future = Utc::now() + Duration::minutes(5);

    seed_code(&otp_codes, user_id, "op-a", "111111", OtpStatus::Active, past).await;
    seed_code(&otp_codes, user_id, "op-b", "222222", OtpStatus::Active, past).await;
    seed_code(&otp_codes, user_id, "op-c", "333333", OtpStatus::Active, future).await;
    let mut used = crate::helpers::test_code(user_id, "op-d", "444444", OtpStatus::Used, past);
    used.used_at = Some(past);
    otp_codes.save(&used).await.unwrap();

    let uc = SweepExpiredUseCase {
        otp_codes: otp_codes.clone(),
    };
    assert_eq!(uc.execute().await.unwrap(), 2);
    assert_eq!(uc.execute().await.unwrap(), 0, "second run is a no-op");

    let still_used = otp_codes.find_by_operation_id("op-d").await.unwrap().unwrap();
    assert_eq!(still_used.status, OtpStatus::Used, "sweep never touches used rows");
    let fresh = otp_codes.find_by_operation_id("op-c").await.unwrap().unwrap();
    assert_eq!(fresh.status, OtpStatus::Active);
}

// ── Concurrency ──────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn should_redeem_exactly_once_under_concurrent_validates() {
    let otp_codes = InMemoryOtpStore::default();
    let locks = Arc::new(OperationLocks::new());
    seed_code(
        &otp_codes,
        Uuid::now_v7(),
        "op-race",
        "123456",
        OtpStatus::Active,
        Utc::now() + Duration::minutes(5),
    )
    .await;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let uc = validate_usecase(&otp_codes, &locks);
        tasks.push(tokio::spawn(
            async move { uc.execute("op-race", "123456").await },
        ));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap().unwrap() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1, "exactly one concurrent validate may win");
}

#[tokio::test(flavor = "multi_thread")]
async fn should_keep_single_active_record_under_concurrent_generates() {
    let otp_codes = InMemoryOtpStore::default();
    let policy = InMemoryPolicyStore::default();
    let locks = Arc::new(OperationLocks::new());
    let user_id = Uuid::now_v7();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let uc = generate_usecase(&otp_codes, &policy, &locks);
        tasks.push(tokio::spawn(async move {
            uc.execute(GenerateOtpInput {
                user_id,
                operation_id: "op-gen-race".to_owned(),
                delivery_method: DeliveryMethod::Chat,
            })
            .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let history = otp_codes.list_by_operation_id("op-gen-race").await.unwrap();
    assert_eq!(history.len(), 8);
    let active = history
        .iter()
        .filter(|c| c.status == OtpStatus::Active)
        .count();
    assert_eq!(active, 1, "every earlier record was superseded");
}

// ── End-to-end scenario ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_run_the_six_digit_five_minute_scenario() {
    let otp_codes = InMemoryOtpStore::default();
    let policy = InMemoryPolicyStore::default();
    let locks = Arc::new(OperationLocks::new());
    policy.update(6, 5).await.unwrap();

    let uc = generate_usecase(&otp_codes, &policy, &locks);
    uc.execute(GenerateOtpInput {
        user_id: Uuid::now_v7(),
        operation_id: "op-1".to_owned(),
        delivery_method: DeliveryMethod::Email,
    })
    .await
    .unwrap();

    let record = otp_codes.find_by_operation_id("op-1").await.unwrap().unwrap();
    assert_eq!(record.code.len(), 6);
    assert_eq!(record.expires_at - record.created_at, Duration::minutes(5));

    let uc = validate_usecase(&otp_codes, &locks);

    // A miss before redemption leaves the code live.
    let wrong = if record.code == "000000" { "111111" } else { "000000" };
    assert!(!uc.execute("op-1", wrong).await.unwrap());

    assert!(uc.execute("op-1", &record.code).await.unwrap());
    assert!(!uc.execute("op-1", &record.code).await.unwrap(), "immediate repeat fails");
}
