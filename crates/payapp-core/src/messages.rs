//! PayApp error codes and human-readable messages
//!
//! [`PAYAPP_ERROR_MESSAGES`] maps every known error code to a message that is
//! safe to show to end users. Use [`get_payapp_error_message`] for lookups; it
//! falls back to [`DEFAULT_ERROR_MESSAGE`] for codes not in the table.
//!
//! [`is_payapp_error`] recognises the two error shapes a caller may hold as
//! JSON: a raw API reply (`state` of `0` with an `errorMessage`) and a
//! code/message pair produced by this crate or the browser SDK.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message returned for codes that are not in the table
pub const DEFAULT_ERROR_MESSAGE: &str = "An unknown payment error occurred.";

/// Error code to message table
pub const PAYAPP_ERROR_MESSAGES: &[(&str, &str)] = &[
    ("INVALID_USERID", "The PayApp seller id is invalid."),
    ("INVALID_LINKKEY", "The PayApp link key is invalid."),
    ("INVALID_PRICE", "The payment amount is invalid."),
    ("INVALID_PHONE", "The recipient phone number is invalid."),
    ("INVALID_GOODNAME", "A product name is required."),
    ("PAYMENT_NOT_FOUND", "The payment request could not be found."),
    ("ALREADY_PAID", "This payment has already been completed."),
    ("ALREADY_CANCELLED", "This payment has already been cancelled."),
    ("CANCEL_PERIOD_EXPIRED", "The cancellation period has expired."),
    (
        "PARTIAL_CANCEL_NOT_ALLOWED",
        "Partial cancellation is not available for this payment.",
    ),
    ("REBILL_NOT_FOUND", "The recurring payment could not be found."),
    ("INVALID_REBILL_CYCLE", "The recurring payment cycle is invalid."),
    ("SDK_NOT_LOADED", "The PayApp payment window could not be loaded."),
    ("USER_CANCELLED", "The payment was cancelled by the user."),
    ("NETWORK_ERROR", "Could not connect to PayApp. Please try again."),
    (
        "SERVER_ERROR",
        "PayApp is temporarily unavailable. Please try again later.",
    ),
    ("INVALID_FEEDBACK", "The payment notification could not be verified."),
];

/// Known PayApp error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayAppErrorCode {
    /// Seller id rejected
    #[serde(rename = "INVALID_USERID")]
    InvalidUserId,
    /// Link key rejected
    #[serde(rename = "INVALID_LINKKEY")]
    InvalidLinkKey,
    /// Invalid amount
    InvalidPrice,
    /// Invalid recipient phone number
    InvalidPhone,
    /// Missing product name
    #[serde(rename = "INVALID_GOODNAME")]
    InvalidGoodName,
    /// Unknown `mul_no`
    PaymentNotFound,
    /// Payment already completed
    AlreadyPaid,
    /// Payment already cancelled
    AlreadyCancelled,
    /// Too late to cancel
    CancelPeriodExpired,
    /// Partial cancel not supported for this payment
    PartialCancelNotAllowed,
    /// Unknown `rebill_no`
    RebillNotFound,
    /// Invalid recurring cycle
    InvalidRebillCycle,
    /// Browser SDK failed to load
    SdkNotLoaded,
    /// Payer closed the payment window
    UserCancelled,
    /// Transport failure
    NetworkError,
    /// PayApp server failure
    ServerError,
    /// Feedback rejected by validation
    InvalidFeedback,
    /// Unknown error code
    #[serde(other)]
    Unknown,
}

impl PayAppErrorCode {
    /// Wire representation of this code
    pub fn as_str(&self) -> &'static str {
        match self {
            PayAppErrorCode::InvalidUserId => "INVALID_USERID",
            PayAppErrorCode::InvalidLinkKey => "INVALID_LINKKEY",
            PayAppErrorCode::InvalidPrice => "INVALID_PRICE",
            PayAppErrorCode::InvalidPhone => "INVALID_PHONE",
            PayAppErrorCode::InvalidGoodName => "INVALID_GOODNAME",
            PayAppErrorCode::PaymentNotFound => "PAYMENT_NOT_FOUND",
            PayAppErrorCode::AlreadyPaid => "ALREADY_PAID",
            PayAppErrorCode::AlreadyCancelled => "ALREADY_CANCELLED",
            PayAppErrorCode::CancelPeriodExpired => "CANCEL_PERIOD_EXPIRED",
            PayAppErrorCode::PartialCancelNotAllowed => "PARTIAL_CANCEL_NOT_ALLOWED",
            PayAppErrorCode::RebillNotFound => "REBILL_NOT_FOUND",
            PayAppErrorCode::InvalidRebillCycle => "INVALID_REBILL_CYCLE",
            PayAppErrorCode::SdkNotLoaded => "SDK_NOT_LOADED",
            PayAppErrorCode::UserCancelled => "USER_CANCELLED",
            PayAppErrorCode::NetworkError => "NETWORK_ERROR",
            PayAppErrorCode::ServerError => "SERVER_ERROR",
            PayAppErrorCode::InvalidFeedback => "INVALID_FEEDBACK",
            PayAppErrorCode::Unknown => "UNKNOWN",
        }
    }

    /// Human-readable message for this code
    pub fn message(&self) -> &'static str {
        get_payapp_error_message(self.as_str())
    }

    /// Check if this error is retryable
    ///
    /// Only transport and server failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PayAppErrorCode::NetworkError | PayAppErrorCode::ServerError
        )
    }
}

impl fmt::Display for PayAppErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayAppErrorCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INVALID_USERID" => Ok(PayAppErrorCode::InvalidUserId),
            "INVALID_LINKKEY" => Ok(PayAppErrorCode::InvalidLinkKey),
            "INVALID_PRICE" => Ok(PayAppErrorCode::InvalidPrice),
            "INVALID_PHONE" => Ok(PayAppErrorCode::InvalidPhone),
            "INVALID_GOODNAME" => Ok(PayAppErrorCode::InvalidGoodName),
            "PAYMENT_NOT_FOUND" => Ok(PayAppErrorCode::PaymentNotFound),
            "ALREADY_PAID" => Ok(PayAppErrorCode::AlreadyPaid),
            "ALREADY_CANCELLED" => Ok(PayAppErrorCode::AlreadyCancelled),
            "CANCEL_PERIOD_EXPIRED" => Ok(PayAppErrorCode::CancelPeriodExpired),
            "PARTIAL_CANCEL_NOT_ALLOWED" => Ok(PayAppErrorCode::PartialCancelNotAllowed),
            "REBILL_NOT_FOUND" => Ok(PayAppErrorCode::RebillNotFound),
            "INVALID_REBILL_CYCLE" => Ok(PayAppErrorCode::InvalidRebillCycle),
            "SDK_NOT_LOADED" => Ok(PayAppErrorCode::SdkNotLoaded),
            "USER_CANCELLED" => Ok(PayAppErrorCode::UserCancelled),
            "NETWORK_ERROR" => Ok(PayAppErrorCode::NetworkError),
            "SERVER_ERROR" => Ok(PayAppErrorCode::ServerError),
            "INVALID_FEEDBACK" => Ok(PayAppErrorCode::InvalidFeedback),
            _ => Err(format!("Unknown PayApp error code: {}", s)),
        }
    }
}

/// Look up the message for an error code
///
/// Returns [`DEFAULT_ERROR_MESSAGE`] for unknown codes.
pub fn get_payapp_error_message(code: &str) -> &'static str {
    PAYAPP_ERROR_MESSAGES
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, message)| *message)
        .unwrap_or(DEFAULT_ERROR_MESSAGE)
}

/// Check whether a JSON value has the shape of a PayApp error
///
/// Accepts `{"state": 0 | "0", "errorMessage": "..."}` and
/// `{"code": "<known code>", "message": "..."}`.
pub fn is_payapp_error(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };

    let failed_state = match obj.get("state") {
        Some(Value::Number(n)) => n.as_u64() == Some(0),
        Some(Value::String(s)) => s == "0",
        _ => false,
    };
    if failed_state && obj.get("errorMessage").is_some_and(Value::is_string) {
        return true;
    }

    let known_code = obj
        .get("code")
        .and_then(Value::as_str)
        .is_some_and(|code| code.parse::<PayAppErrorCode>().is_ok());

    known_code && obj.get("message").is_some_and(Value::is_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_table_entry_resolves() {
        for (code, message) in PAYAPP_ERROR_MESSAGES {
            assert_eq!(get_payapp_error_message(code), *message);

            let parsed: PayAppErrorCode = code.parse().unwrap();
            assert_eq!(parsed.as_str(), *code);
            assert_eq!(parsed.message(), *message);
        }
    }

    #[test]
    fn test_unknown_code_falls_back() {
        assert_eq!(get_payapp_error_message("NOPE"), DEFAULT_ERROR_MESSAGE);
        assert_eq!(get_payapp_error_message(""), DEFAULT_ERROR_MESSAGE);
        assert_eq!(PayAppErrorCode::Unknown.message(), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_serde_matches_table_keys() {
        let code: PayAppErrorCode = serde_json::from_value(json!("INVALID_LINKKEY")).unwrap();
        assert_eq!(code, PayAppErrorCode::InvalidLinkKey);

        let code: PayAppErrorCode = serde_json::from_value(json!("SOMETHING_NEW")).unwrap();
        assert_eq!(code, PayAppErrorCode::Unknown);

        assert_eq!(
            serde_json::to_value(PayAppErrorCode::CancelPeriodExpired).unwrap(),
            json!("CANCEL_PERIOD_EXPIRED")
        );
    }

    #[test]
    fn test_is_payapp_error_api_shape() {
        assert!(is_payapp_error(&json!({"state": 0, "errorMessage": "fail"})));
        assert!(is_payapp_error(&json!({"state": "0", "errorMessage": "fail"})));
        assert!(!is_payapp_error(&json!({"state": 1, "errorMessage": ""})));
        assert!(!is_payapp_error(&json!({"state": "0"})));
    }

    #[test]
    fn test_is_payapp_error_code_shape() {
        assert!(is_payapp_error(
            &json!({"code": "USER_CANCELLED", "message": "closed"})
        ));
        assert!(!is_payapp_error(&json!({"code": "EACCES", "message": "no"})));
        assert!(!is_payapp_error(&json!({"code": "USER_CANCELLED"})));
    }

    #[test]
    fn test_is_payapp_error_rejects_non_objects() {
        assert!(!is_payapp_error(&json!(null)));
        assert!(!is_payapp_error(&json!("INVALID_PRICE")));
        assert!(!is_payapp_error(&json!([{"state": 0, "errorMessage": "x"}])));
    }

    #[test]
    fn test_retryable() {
        assert!(PayAppErrorCode::NetworkError.is_retryable());
        assert!(PayAppErrorCode::ServerError.is_retryable());
        assert!(!PayAppErrorCode::AlreadyCancelled.is_retryable());
    }
}
