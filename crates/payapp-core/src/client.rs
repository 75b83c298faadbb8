//! PayApp REST client
//!
//! All commands go to a single endpoint (`oapi/apiLoad.html`) as a
//! form-encoded `POST`. The `cmd` field selects the operation and `userid`
//! identifies the merchant. Commands that act on an existing payment or
//! registration also carry the merchant's `linkkey`.
//!
//! | Command | Method | Description |
//! |---------|--------|-------------|
//! | `payrequest` | [`PayAppClient::request_payment`] | Create a one-time payment request |
//! | `paycancel` | [`PayAppClient::cancel_payment`] | Cancel an approved payment (full or partial) |
//! | `paycancelreq` | [`PayAppClient::request_cancel`] | Request cancellation after settlement |
//! | `rebillRegist` | [`PayAppClient::register_recurring`] | Register a recurring payment |
//! | `rebillCancel` | [`PayAppClient::cancel_recurring`] | Cancel a recurring registration |
//! | `rebillStop` | [`PayAppClient::stop_recurring`] | Pause a recurring payment |
//! | `rebillStart` | [`PayAppClient::start_recurring`] | Resume a paused recurring payment |
//!
//! Replies are form-encoded too. `state=1` means success; any other state
//! carries `errorMessage` and is returned as [`Error::Api`].

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::PayAppConfig;
use crate::error::{Error, PayAppApiError};
use crate::types::{
    CancelRequest, Params, PaymentRequest, PaymentResponse, RecurringPaymentRequest,
    RecurringResponse,
};
use crate::util::cmd;

#[derive(Deserialize)]
struct ReplyState {
    state: String,
}

/// PayApp API client
#[derive(Debug, Clone)]
pub struct PayAppClient {
    config: PayAppConfig,
    api_url: Url,
    client: Client,
}

/// Create a PayApp client from configuration
pub fn create_payapp_client(config: PayAppConfig) -> Result<PayAppClient, Error> {
    PayAppClient::new(config)
}

impl PayAppClient {
    /// Create a new PayApp client
    pub fn new(config: PayAppConfig) -> Result<Self, Error> {
        if config.user_id.trim().is_empty() {
            return Err(Error::Config("PayApp user id is required".to_string()));
        }

        let api_url = Url::parse(&config.api_url)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            config,
            api_url,
            client,
        })
    }

    /// Merchant configuration
    pub fn config(&self) -> &PayAppConfig {
        &self.config
    }

    /// Send a command and return the raw reply body on success
    async fn call(&self, command: &str, params: Params) -> Result<String, Error> {
        debug!("PayApp {} -> {}", command, self.api_url);

        let mut form: Vec<(&str, String)> = Vec::with_capacity(params.len() + 2);
        form.push(("cmd", command.to_string()));
        form.push(("userid", self.config.user_id.clone()));
        form.extend(params);

        let response = self
            .client
            .post(self.api_url.clone())
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        let reply: ReplyState = serde_urlencoded::from_str(&text)?;

        if reply.state == "1" {
            Ok(text)
        } else {
            let error: PayAppApiError = serde_urlencoded::from_str(&text)?;
            warn!(
                "PayApp {} failed: state {} - {}",
                command, error.state, error.message
            );
            Err(Error::Api(error))
        }
    }

    fn link_key_param(&self) -> (&'static str, String) {
        ("linkkey", self.config.link_key.clone())
    }

    // ==================== Payment Commands ====================

    /// Create a one-time payment request
    ///
    /// Falls back to the configured feedback and return URLs when the request
    /// does not set its own.
    pub async fn request_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentResponse, Error> {
        request.validate()?;

        let mut request = request.clone();
        if request.feedback_url.is_none() {
            request.feedback_url = self.config.feedback_url.clone();
        }
        if request.return_url.is_none() {
            request.return_url = self.config.return_url.clone();
        }

        let text = self.call(cmd::PAY_REQUEST, request.params()).await?;
        Ok(serde_urlencoded::from_str(&text)?)
    }

    /// Cancel an approved payment
    pub async fn cancel_payment(&self, request: &CancelRequest) -> Result<(), Error> {
        self.cancel(cmd::PAY_CANCEL, request).await
    }

    /// Request cancellation of a payment that can no longer be cancelled directly
    pub async fn request_cancel(&self, request: &CancelRequest) -> Result<(), Error> {
        self.cancel(cmd::PAY_CANCEL_REQ, request).await
    }

    async fn cancel(&self, command: &str, request: &CancelRequest) -> Result<(), Error> {
        if request.partial_price == Some(0) {
            return Err(Error::InvalidRequest(
                "partial cancel amount must be positive".to_string(),
            ));
        }

        let mut params = vec![self.link_key_param()];
        params.extend(request.params());

        self.call(command, params).await?;
        Ok(())
    }

    // ==================== Recurring Commands ====================

    /// Register a recurring payment
    pub async fn register_recurring(
        &self,
        request: &RecurringPaymentRequest,
    ) -> Result<RecurringResponse, Error> {
        request.validate()?;

        let mut request = request.clone();
        if request.feedback_url.is_none() {
            request.feedback_url = self.config.feedback_url.clone();
        }
        if request.return_url.is_none() {
            request.return_url = self.config.return_url.clone();
        }

        let text = self.call(cmd::REBILL_REGIST, request.params()).await?;
        Ok(serde_urlencoded::from_str(&text)?)
    }

    /// Cancel a recurring registration
    pub async fn cancel_recurring(&self, rebill_no: &str) -> Result<(), Error> {
        self.manage_recurring(cmd::REBILL_CANCEL, rebill_no).await
    }

    /// Pause a recurring payment
    pub async fn stop_recurring(&self, rebill_no: &str) -> Result<(), Error> {
        self.manage_recurring(cmd::REBILL_STOP, rebill_no).await
    }

    /// Resume a paused recurring payment
    pub async fn start_recurring(&self, rebill_no: &str) -> Result<(), Error> {
        self.manage_recurring(cmd::REBILL_START, rebill_no).await
    }

    async fn manage_recurring(&self, command: &str, rebill_no: &str) -> Result<(), Error> {
        let params = vec![
            self.link_key_param(),
            ("rebill_no", rebill_no.to_string()),
        ];

        self.call(command, params).await?;
        Ok(())
    }
}
