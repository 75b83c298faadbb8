//! Constants shared across the PayApp integration

/// Default PayApp REST endpoint
pub const PAYAPP_API_URL: &str = "https://api.payapp.kr/oapi/apiLoad.html";
/// Default location of the PayApp Lite browser SDK
pub const PAYAPP_SDK_URL: &str = "https://lite.payapp.kr/public/api/v2/payapp-lite.js";
/// Body PayApp expects in reply to a feedback notification
pub const FEEDBACK_SUCCESS: &str = "SUCCESS";
/// Body returned when a feedback notification is rejected
pub const FEEDBACK_FAILURE: &str = "FAIL";
/// Default HTTP timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// API commands accepted by the `cmd` form field
pub mod cmd {
    /// Create a one-time payment request
    pub const PAY_REQUEST: &str = "payrequest";
    /// Cancel an approved payment
    pub const PAY_CANCEL: &str = "paycancel";
    /// Request cancellation of a settled payment
    pub const PAY_CANCEL_REQ: &str = "paycancelreq";
    /// Register a recurring payment
    pub const REBILL_REGIST: &str = "rebillRegist";
    /// Cancel a recurring payment registration
    pub const REBILL_CANCEL: &str = "rebillCancel";
    /// Pause a recurring payment
    pub const REBILL_STOP: &str = "rebillStop";
    /// Resume a paused recurring payment
    pub const REBILL_START: &str = "rebillStart";
}

/// Convert a boolean into PayApp's `y`/`n` flag
pub fn yn(flag: bool) -> &'static str {
    if flag {
        "y"
    } else {
        "n"
    }
}
