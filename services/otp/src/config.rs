/// OTP service configuration loaded from environment variables.
#[derive(Debug)]
pub struct OtpConfig {
    /// HMAC secret for signing session tokens.
    pub jwt_secret: String,
    /// Session token time-to-live in seconds (default 3600). Env var: `TOKEN_TTL_SECS`.
    pub token_ttl_secs: u64,
    /// TCP port to listen on (default 8080). Env var: `OTP_PORT`.
    pub otp_port: u16,
    /// Interval between expiry sweeps in seconds (default 60). Env var: `SWEEP_INTERVAL_SECS`.
    pub sweep_interval_secs: u64,
    /// Path the file delivery channel appends to (default "otp-delivery.log").
    /// Env var: `DELIVERY_LOG_PATH`.
    pub delivery_log_path: String,
}

impl OtpConfig {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            token_ttl_secs: std::env::var("TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            otp_port: std::env::var("OTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            delivery_log_path: std::env::var("DELIVERY_LOG_PATH")
                .unwrap_or_else(|_| "otp-delivery.log".to_owned()),
        }
    }
}
