
mod otp_test;
