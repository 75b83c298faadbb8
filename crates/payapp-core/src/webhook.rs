//! PayApp feedback receiver
//!
//! PayApp posts a form-encoded [`Feedback`] to the `feedbackurl` of a
//! request whenever the payment state changes. The merchant must answer with
//! the literal body `SUCCESS`; anything else makes PayApp retry the
//! notification.
//!
//! # Flow
//!
//! 1. Decode the form body into [`Feedback`]
//! 2. Validate it with [`validate_feedback`]
//! 3. Forward it to the application over an `mpsc` channel
//! 4. Reply `SUCCESS`
//!
//! Rejected notifications get `FAIL` with a 4xx status so they show up in
//! PayApp's delivery log.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::PayAppConfig;
use crate::feedback::validate_feedback;
use crate::types::Feedback;
use crate::util::{FEEDBACK_FAILURE, FEEDBACK_SUCCESS};

/// State for the feedback handler
#[derive(Clone)]
pub struct WebhookState {
    /// Channel sender for validated feedback
    pub sender: mpsc::Sender<Feedback>,
    /// Merchant configuration used for validation
    pub config: Arc<PayAppConfig>,
}

fn reply(status: StatusCode, body: &'static str) -> Response {
    (status, body).into_response()
}

/// Handle a feedback notification
async fn handle_feedback(State(state): State<WebhookState>, body: Bytes) -> Response {
    let feedback = match Feedback::from_form(&body) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to parse PayApp feedback: {}", e);
            return reply(StatusCode::BAD_REQUEST, FEEDBACK_FAILURE);
        }
    };

    if let Err(e) = validate_feedback(&state.config, &feedback) {
        warn!("Rejected PayApp feedback for mul_no {}: {}", feedback.mul_no, e);
        return reply(StatusCode::UNAUTHORIZED, FEEDBACK_FAILURE);
    }

    debug!(
        "Received PayApp feedback: mul_no {} state {:?}",
        feedback.mul_no, feedback.pay_state
    );

    if let Err(e) = state.sender.send(feedback).await {
        warn!("Failed to send feedback to channel: {}", e);
        return reply(StatusCode::INTERNAL_SERVER_ERROR, FEEDBACK_FAILURE);
    }

    reply(StatusCode::OK, FEEDBACK_SUCCESS)
}

/// Create an Axum router for PayApp feedback
///
/// The router handles POST requests to `endpoint`, validates each
/// notification against `config`, and forwards accepted ones to `sender`.
pub fn create_webhook_handler(
    endpoint: &str,
    sender: mpsc::Sender<Feedback>,
    config: PayAppConfig,
) -> Router {
    let state = WebhookState {
        sender,
        config: Arc::new(config),
    };

    Router::new()
        .route(endpoint, post(handle_feedback))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::generate_feedback_key;
    use crate::types::PayState;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const ENDPOINT: &str = "/payapp/feedback";
    const SECRET: &str = "feedback-secret";

    fn config() -> PayAppConfig {
        PayAppConfig::new("merchant", "link-key", "link-val").with_feedback_secret(SECRET)
    }

    fn form(linkkey: &str, price: u64) -> String {
        let var2 = generate_feedback_key(SECRET, "A-1", 4500);
        format!(
            "userid=merchant&linkkey={linkkey}&linkval=link-val&goodname=Coffee\
             &price={price}&pay_state=4&mul_no=1001&var1=A-1&var2={var2}"
        )
    }

    async fn post_form(router: Router, body: String) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(ENDPOINT)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_accepts_valid_feedback() {
        let (tx, mut rx) = mpsc::channel(1);
        let router = create_webhook_handler(ENDPOINT, tx, config());

        let (status, body) = post_form(router, form("link-key", 4500)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, FEEDBACK_SUCCESS);

        let feedback = rx.recv().await.unwrap();
        assert_eq!(feedback.mul_no, "1001");
        assert_eq!(feedback.pay_state, PayState::Completed);
    }

    #[tokio::test]
    async fn test_rejects_wrong_link_key() {
        let (tx, mut rx) = mpsc::channel(1);
        let router = create_webhook_handler(ENDPOINT, tx, config());

        let (status, body) = post_form(router, form("forged", 4500)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, FEEDBACK_FAILURE);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_rejects_tampered_price() {
        let (tx, mut rx) = mpsc::channel(1);
        let router = create_webhook_handler(ENDPOINT, tx, config());

        let (status, _) = post_form(router, form("link-key", 10)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_rejects_malformed_body() {
        let (tx, _rx) = mpsc::channel(1);
        let router = create_webhook_handler(ENDPOINT, tx, config());

        let (status, body) = post_form(router, "userid=merchant&price=abc".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, FEEDBACK_FAILURE);
    }

    #[tokio::test]
    async fn test_closed_channel_fails() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let router = create_webhook_handler(ENDPOINT, tx, config());

        let (status, _) = post_form(router, form("link-key", 4500)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
