use std::time::Duration;

use tracing::{error, info};

use passgate_otp::config::OtpConfig;
use passgate_otp::infra::notify::FileNotificationSink;
use passgate_otp::router::build_router;
use passgate_otp::state::AppState;
use passgate_otp::usecase::otp::SweepExpiredUseCase;

#[tokio::main]
async fn main() {
    passgate_core::tracing::init_tracing();

    let config = OtpConfig::from_env();

    let state = AppState::new(
        FileNotificationSink::new(&config.delivery_log_path),
        config.jwt_secret,
        config.token_ttl_secs,
    );

    // Periodic sweep of overdue Active codes. Lazy expiry in validate covers
    // codes this timer has not reached yet.
    let sweep_codes = state.otp_codes.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(config.sweep_interval_secs));
        loop {
            interval.tick().await;
            let sweep = SweepExpiredUseCase {
                otp_codes: sweep_codes.clone(),
            };
            match sweep.execute().await {
                Ok(0) => {}
                Ok(count) => info!(count, "expired stale otp codes"),
                Err(e) => error!(error = %e, "otp sweep failed"),
            }
        }
    });

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.otp_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("otp service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
