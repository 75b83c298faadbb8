//! Feedback validation
//!
//! PayApp echoes the merchant's `userid`, `linkkey`, and `linkval` in every
//! feedback notification. A notification is accepted only when all three
//! match the configured merchant.
//!
//! PayApp does not sign feedback bodies, so the amount and order are not
//! otherwise protected. When a feedback secret is configured, requests carry
//! the order id in `var1` and an HMAC-SHA256 feedback key in `var2`:
//!
//! ```text
//! var2 = hex(HMAC-SHA256(secret, "{var1}:{price}"))
//! ```
//!
//! and validation recomputes it from the notification's own `var1` and
//! `price`, rejecting notifications whose amount was altered.

use ring::hmac;
use tracing::{debug, warn};

use crate::config::PayAppConfig;
use crate::error::FeedbackError;
use crate::types::{Feedback, PayState};

/// Generate the feedback key for an order
///
/// Deterministic for identical inputs.
pub fn generate_feedback_key(secret: &str, order_id: &str, price: u64) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let tag = hmac::sign(&key, feedback_message(order_id, price).as_bytes());
    hex::encode(tag.as_ref())
}

fn feedback_message(order_id: &str, price: u64) -> String {
    format!("{}:{}", order_id, price)
}

/// Verify a feedback key using a timing-safe comparison
fn verify_feedback_key(secret: &str, order_id: &str, price: u64, feedback_key: &str) -> bool {
    let Ok(tag) = hex::decode(feedback_key) else {
        return false;
    };
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    hmac::verify(&key, feedback_message(order_id, price).as_bytes(), &tag).is_ok()
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

/// Validate a feedback notification against the merchant configuration
pub fn validate_feedback(config: &PayAppConfig, feedback: &Feedback) -> Result<(), FeedbackError> {
    if feedback.userid != config.user_id {
        warn!("Feedback for unexpected user id: {}", feedback.userid);
        return Err(FeedbackError::UserIdMismatch);
    }

    if !constant_time_eq(&feedback.linkkey, &config.link_key) {
        warn!("Feedback link key mismatch for mul_no {}", feedback.mul_no);
        return Err(FeedbackError::LinkKeyMismatch);
    }

    if !constant_time_eq(&feedback.linkval, &config.link_val) {
        warn!("Feedback link value mismatch for mul_no {}", feedback.mul_no);
        return Err(FeedbackError::LinkValMismatch);
    }

    if let Some(secret) = &config.feedback_secret {
        let feedback_key = feedback
            .var2
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                warn!("Feedback for mul_no {} has no feedback key", feedback.mul_no);
                FeedbackError::MissingFeedbackKey
            })?;
        let order_id = feedback.var1.as_deref().unwrap_or_default();

        if !verify_feedback_key(secret, order_id, feedback.price, feedback_key) {
            warn!("Feedback key mismatch for mul_no {}", feedback.mul_no);
            return Err(FeedbackError::FeedbackKeyMismatch);
        }
    }

    debug!(
        "Feedback verified: mul_no {} state {:?}",
        feedback.mul_no, feedback.pay_state
    );

    Ok(())
}

/// Check if a payment state means the payment completed
pub fn is_payment_completed(state: impl Into<PayState>) -> bool {
    matches!(state.into(), PayState::Completed)
}

/// Check if a payment state means the payment was cancelled, fully or partially
pub fn is_payment_cancelled(state: impl Into<PayState>) -> bool {
    matches!(
        state.into(),
        PayState::RequestCancelled(_) | PayState::ApprovalCancelled(_) | PayState::PartialCancelled(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "feedback-secret";

    fn config() -> PayAppConfig {
        PayAppConfig::new("merchant", "link-key", "link-val")
    }

    fn feedback() -> Feedback {
        Feedback::from_form(
            b"userid=merchant&linkkey=link-key&linkval=link-val&price=4500&pay_state=4&mul_no=1001",
        )
        .unwrap()
    }

    #[test]
    fn test_generate_feedback_key_deterministic() {
        let a = generate_feedback_key(SECRET, "A-1", 4500);
        let b = generate_feedback_key(SECRET, "A-1", 4500);

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, generate_feedback_key(SECRET, "A-1", 4501));
        assert_ne!(a, generate_feedback_key(SECRET, "A-2", 4500));
        assert_ne!(a, generate_feedback_key("other", "A-1", 4500));
    }

    #[test]
    fn test_validate_credentials() {
        let config = config();
        assert!(validate_feedback(&config, &feedback()).is_ok());

        let mut wrong_user = feedback();
        wrong_user.userid = "someone".to_string();
        assert_eq!(
            validate_feedback(&config, &wrong_user),
            Err(FeedbackError::UserIdMismatch)
        );

        let mut wrong_key = feedback();
        wrong_key.linkkey = "link-kez".to_string();
        assert_eq!(
            validate_feedback(&config, &wrong_key),
            Err(FeedbackError::LinkKeyMismatch)
        );

        let mut wrong_val = feedback();
        wrong_val.linkval = String::new();
        assert_eq!(
            validate_feedback(&config, &wrong_val),
            Err(FeedbackError::LinkValMismatch)
        );
    }

    #[test]
    fn test_validate_feedback_key() {
        let config = config().with_feedback_secret(SECRET);

        let mut signed = feedback();
        signed.var1 = Some("A-1".to_string());
        signed.var2 = Some(generate_feedback_key(SECRET, "A-1", 4500));
        assert!(validate_feedback(&config, &signed).is_ok());

        let mut missing = feedback();
        missing.var1 = Some("A-1".to_string());
        assert_eq!(
            validate_feedback(&config, &missing),
            Err(FeedbackError::MissingFeedbackKey)
        );

        let mut tampered = signed.clone();
        tampered.price = 100;
        assert_eq!(
            validate_feedback(&config, &tampered),
            Err(FeedbackError::FeedbackKeyMismatch)
        );

        let mut garbage = signed;
        garbage.var2 = Some("not-hex".to_string());
        assert_eq!(
            validate_feedback(&config, &garbage),
            Err(FeedbackError::FeedbackKeyMismatch)
        );
    }

    #[test]
    fn test_status_predicates_partition() {
        let completed = [4u16];
        let cancelled = [8u16, 9, 32, 64, 70, 71];
        let neither = [1u16, 10, 0, 99];

        for code in completed {
            assert!(is_payment_completed(code));
            assert!(!is_payment_cancelled(code));
        }
        for code in cancelled {
            assert!(is_payment_cancelled(code));
            assert!(!is_payment_completed(code));
        }
        for code in neither {
            assert!(!is_payment_completed(code));
            assert!(!is_payment_cancelled(code));
        }

        assert!(is_payment_completed(PayState::Completed));
    }
}
