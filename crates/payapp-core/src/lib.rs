//! PayApp payment integration core library
//!
//! Framework-agnostic building blocks for accepting payments through
//! [PayApp](https://payapp.kr):
//!
//! - [`PayAppClient`] for the server-side REST commands (payment requests,
//!   cancellation, recurring payments)
//! - SDK helpers that render the browser SDK calls for a checkout page
//! - feedback (webhook) validation and payment status predicates
//! - an error-code table with human-readable messages
//!
//! The feedback receiver router lives in [`webhook`] behind the `webhook`
//! feature.
//!
//! ```no_run
//! use payapp_core::{create_payapp_client, PayAppConfig, PaymentRequest};
//!
//! # async fn run() -> Result<(), payapp_core::Error> {
//! let config = PayAppConfig::new("merchant", "link-key", "link-val").from_env();
//! let client = create_payapp_client(config)?;
//!
//! let response = client
//!     .request_payment(&PaymentRequest::new("Coffee", 4500, "01012345678"))
//!     .await?;
//! println!("pay at {}", response.pay_url);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod client;
pub mod config;
pub mod error;
pub mod feedback;
pub mod messages;
pub mod sdk;
pub mod types;
pub mod util;
#[cfg(feature = "webhook")]
pub mod webhook;

pub use client::{create_payapp_client, PayAppClient};
pub use config::{generate_feedback_secret, PayAppConfig};
pub use error::{Error, FeedbackError, PayAppApiError};
pub use feedback::{
    generate_feedback_key, is_payment_cancelled, is_payment_completed, validate_feedback,
};
pub use messages::{
    get_payapp_error_message, is_payapp_error, PayAppErrorCode, DEFAULT_ERROR_MESSAGE,
    PAYAPP_ERROR_MESSAGES,
};
pub use sdk::{
    init_payapp_sdk, load_payapp_sdk, render_payment_snippet, request_payment_with_sdk,
    request_recurring_payment_with_sdk,
};
pub use types::{
    CancelRequest, Feedback, PayState, PayType, PaymentRequest, PaymentResponse, RebillCycle,
    RecurringPaymentRequest, RecurringResponse,
};
#[cfg(feature = "webhook")]
pub use webhook::create_webhook_handler;
