//! PayApp type definitions
//!
//! Request types render to the form parameters PayApp expects via
//! `params()`. The same parameter list feeds both the REST client and the
//! browser SDK snippets, so both paths send identical field names.
//!
//! ## Payment States
//!
//! [`PayState`] covers the `pay_state` values delivered in feedback:
//! - `1` requested, `10` waiting (virtual account issued)
//! - `4` completed
//! - `8`/`32` request cancelled, `9`/`64` approval cancelled
//! - `70`/`71` partially cancelled
//!
//! ## Amounts
//!
//! All amounts are whole KRW.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::feedback::generate_feedback_key;
use crate::util::yn;

/// Form parameters in submission order
pub type Params = Vec<(&'static str, String)>;

fn require(value: &str, field: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::InvalidRequest(format!("{} is required", field)));
    }
    Ok(())
}

fn require_amount(amount: u64, field: &str) -> Result<(), Error> {
    if amount == 0 {
        return Err(Error::InvalidRequest(format!("{} must be positive", field)));
    }
    Ok(())
}

fn push_opt(params: &mut Params, key: &'static str, value: &Option<String>) {
    if let Some(value) = value {
        params.push((key, value.clone()));
    }
}

/// One-time payment request (`payrequest`)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Product name
    pub good_name: String,
    /// Amount in KRW
    pub price: u64,
    /// Recipient phone number
    pub recv_phone: String,
    /// Memo shown to the payer
    #[serde(default)]
    pub memo: Option<String>,
    /// Ask the payer for a shipping address
    #[serde(default)]
    pub req_addr: bool,
    /// Feedback URL; falls back to the configured default
    #[serde(default)]
    pub feedback_url: Option<String>,
    /// Return URL; falls back to the configured default
    #[serde(default)]
    pub return_url: Option<String>,
    /// Merchant variable 1, echoed in feedback (order id)
    #[serde(default)]
    pub var1: Option<String>,
    /// Merchant variable 2, echoed in feedback (feedback key)
    #[serde(default)]
    pub var2: Option<String>,
    /// Send the payment link by SMS
    #[serde(default)]
    pub sms_use: bool,
    /// Comma-separated payment methods to offer, e.g. `card,phone`
    #[serde(default)]
    pub open_pay_type: Option<String>,
    /// Allow the feedback to be retried on failure
    #[serde(default)]
    pub check_retry: Option<bool>,
}

impl PaymentRequest {
    /// Create a payment request
    pub fn new(good_name: impl Into<String>, price: u64, recv_phone: impl Into<String>) -> Self {
        Self {
            good_name: good_name.into(),
            price,
            recv_phone: recv_phone.into(),
            ..Default::default()
        }
    }

    /// Tag the request with an order id and its feedback key
    ///
    /// Sets `var1` to the order id and `var2` to
    /// [`generate_feedback_key`] over the order id and price.
    pub fn with_order(mut self, secret: &str, order_id: impl Into<String>) -> Self {
        let order_id = order_id.into();
        self.var2 = Some(generate_feedback_key(secret, &order_id, self.price));
        self.var1 = Some(order_id);
        self
    }

    /// Check the fields PayApp requires before sending
    pub fn validate(&self) -> Result<(), Error> {
        require(&self.good_name, "good_name")?;
        require_amount(self.price, "price")?;
        require(&self.recv_phone, "recv_phone")
    }

    /// Form parameters for this request
    pub fn params(&self) -> Params {
        let mut params = vec![
            ("goodname", self.good_name.clone()),
            ("price", self.price.to_string()),
            ("recvphone", self.recv_phone.clone()),
        ];
        push_opt(&mut params, "memo", &self.memo);
        params.push(("reqaddr", if self.req_addr { "1" } else { "0" }.to_string()));
        push_opt(&mut params, "feedbackurl", &self.feedback_url);
        push_opt(&mut params, "returnurl", &self.return_url);
        push_opt(&mut params, "var1", &self.var1);
        push_opt(&mut params, "var2", &self.var2);
        params.push(("smsuse", yn(self.sms_use).to_string()));
        push_opt(&mut params, "openpaytype", &self.open_pay_type);
        if let Some(check_retry) = self.check_retry {
            params.push(("checkretry", yn(check_retry).to_string()));
        }
        params
    }
}

/// Billing cycle for recurring payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebillCycle {
    /// Monthly on the given day (`1..=31`, or [`RebillCycle::MONTH_END`])
    Month(u8),
    /// Weekly on the given weekday (`1` Monday ..= `7` Sunday)
    Week(u8),
    /// Every given number of days
    Day(u8),
}

impl RebillCycle {
    /// Day value meaning "last day of the month"
    pub const MONTH_END: u8 = 90;

    /// Check the cycle value is one PayApp accepts
    pub fn is_valid(&self) -> bool {
        match *self {
            RebillCycle::Month(day) => (1..=31).contains(&day) || day == Self::MONTH_END,
            RebillCycle::Week(weekday) => (1..=7).contains(&weekday),
            RebillCycle::Day(days) => days >= 1,
        }
    }

    fn push_params(&self, params: &mut Params) {
        match *self {
            RebillCycle::Month(day) => {
                params.push(("rebillCycleType", "Month".to_string()));
                params.push(("rebillCycleMonth", day.to_string()));
            }
            RebillCycle::Week(weekday) => {
                params.push(("rebillCycleType", "Week".to_string()));
                params.push(("rebillCycleWeek", weekday.to_string()));
            }
            RebillCycle::Day(days) => {
                params.push(("rebillCycleType", "Day".to_string()));
                params.push(("rebillCycleDay", days.to_string()));
            }
        }
    }
}

/// Recurring payment registration (`rebillRegist`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringPaymentRequest {
    /// Product name
    pub good_name: String,
    /// Amount charged each cycle in KRW
    pub good_price: u64,
    /// Recipient phone number
    pub recv_phone: String,
    /// Billing cycle
    pub cycle: RebillCycle,
    /// Last billing date, `YYYY-MM-DD`
    pub expire_date: String,
    /// Memo shown to the payer
    #[serde(default)]
    pub memo: Option<String>,
    /// Feedback URL; falls back to the configured default
    #[serde(default)]
    pub feedback_url: Option<String>,
    /// URL notified when a cycle charge fails
    #[serde(default)]
    pub fail_url: Option<String>,
    /// Return URL; falls back to the configured default
    #[serde(default)]
    pub return_url: Option<String>,
    /// Merchant variable 1
    #[serde(default)]
    pub var1: Option<String>,
    /// Merchant variable 2
    #[serde(default)]
    pub var2: Option<String>,
    /// Send the registration link by SMS
    #[serde(default)]
    pub sms_use: bool,
    /// Comma-separated payment methods to offer
    #[serde(default)]
    pub open_pay_type: Option<String>,
}

impl RecurringPaymentRequest {
    /// Create a recurring payment registration
    pub fn new(
        good_name: impl Into<String>,
        good_price: u64,
        recv_phone: impl Into<String>,
        cycle: RebillCycle,
        expire_date: impl Into<String>,
    ) -> Self {
        Self {
            good_name: good_name.into(),
            good_price,
            recv_phone: recv_phone.into(),
            cycle,
            expire_date: expire_date.into(),
            memo: None,
            feedback_url: None,
            fail_url: None,
            return_url: None,
            var1: None,
            var2: None,
            sms_use: false,
            open_pay_type: None,
        }
    }

    /// Tag the registration with a subscription id and its feedback key
    pub fn with_order(mut self, secret: &str, order_id: impl Into<String>) -> Self {
        let order_id = order_id.into();
        self.var2 = Some(generate_feedback_key(secret, &order_id, self.good_price));
        self.var1 = Some(order_id);
        self
    }

    /// Check the fields PayApp requires before sending
    pub fn validate(&self) -> Result<(), Error> {
        require(&self.good_name, "good_name")?;
        require_amount(self.good_price, "good_price")?;
        require(&self.recv_phone, "recv_phone")?;
        require(&self.expire_date, "expire_date")?;
        if !self.cycle.is_valid() {
            return Err(Error::InvalidRequest(format!(
                "invalid rebill cycle: {:?}",
                self.cycle
            )));
        }
        Ok(())
    }

    /// Form parameters for this request
    pub fn params(&self) -> Params {
        let mut params = vec![
            ("goodname", self.good_name.clone()),
            ("goodprice", self.good_price.to_string()),
            ("recvphone", self.recv_phone.clone()),
        ];
        self.cycle.push_params(&mut params);
        params.push(("rebillExpire", self.expire_date.clone()));
        push_opt(&mut params, "memo", &self.memo);
        push_opt(&mut params, "feedbackurl", &self.feedback_url);
        push_opt(&mut params, "failurl", &self.fail_url);
        push_opt(&mut params, "returnurl", &self.return_url);
        push_opt(&mut params, "var1", &self.var1);
        push_opt(&mut params, "var2", &self.var2);
        params.push(("smsuse", yn(self.sms_use).to_string()));
        push_opt(&mut params, "openpaytype", &self.open_pay_type);
        params
    }
}

/// Payment cancellation (`paycancel` / `paycancelreq`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    /// Payment request number
    pub mul_no: String,
    /// Reason for cancelling
    pub cancel_memo: String,
    /// Amount to cancel for a partial cancellation
    #[serde(default)]
    pub partial_price: Option<u64>,
}

impl CancelRequest {
    /// Cancel the full amount
    pub fn full(mul_no: impl Into<String>, cancel_memo: impl Into<String>) -> Self {
        Self {
            mul_no: mul_no.into(),
            cancel_memo: cancel_memo.into(),
            partial_price: None,
        }
    }

    /// Cancel part of the amount
    pub fn partial(mul_no: impl Into<String>, cancel_memo: impl Into<String>, price: u64) -> Self {
        Self {
            partial_price: Some(price),
            ..Self::full(mul_no, cancel_memo)
        }
    }

    /// Form parameters for this request
    pub fn params(&self) -> Params {
        let mut params = vec![
            ("mul_no", self.mul_no.clone()),
            ("cancelmemo", self.cancel_memo.clone()),
        ];
        match self.partial_price {
            Some(price) => {
                params.push(("partcancel", "1".to_string()));
                params.push(("cancelprice", price.to_string()));
            }
            None => params.push(("partcancel", "0".to_string())),
        }
        params
    }
}

/// Successful `payrequest` reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResponse {
    /// Payment request number
    pub mul_no: String,
    /// Payment page URL
    #[serde(rename = "payurl")]
    pub pay_url: String,
    /// QR code image URL
    #[serde(rename = "qrurl", default)]
    pub qr_url: Option<String>,
}

/// Successful `rebillRegist` reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringResponse {
    /// Recurring registration number
    pub rebill_no: String,
    /// Registration page URL
    #[serde(rename = "payurl", default)]
    pub pay_url: Option<String>,
}

/// Payment state reported in feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum PayState {
    /// Payment requested (`1`)
    Requested,
    /// Payment completed (`4`)
    Completed,
    /// Request cancelled (`8`, `32`)
    RequestCancelled(u16),
    /// Approval cancelled (`9`, `64`)
    ApprovalCancelled(u16),
    /// Waiting for deposit (`10`)
    Waiting,
    /// Partially cancelled (`70`, `71`)
    PartialCancelled(u16),
    /// Unrecognised state
    Unknown(u16),
}

impl From<u16> for PayState {
    fn from(code: u16) -> Self {
        match code {
            1 => PayState::Requested,
            4 => PayState::Completed,
            8 | 32 => PayState::RequestCancelled(code),
            9 | 64 => PayState::ApprovalCancelled(code),
            10 => PayState::Waiting,
            70 | 71 => PayState::PartialCancelled(code),
            other => PayState::Unknown(other),
        }
    }
}

impl From<PayState> for u16 {
    fn from(state: PayState) -> Self {
        match state {
            PayState::Requested => 1,
            PayState::Completed => 4,
            PayState::Waiting => 10,
            PayState::RequestCancelled(code)
            | PayState::ApprovalCancelled(code)
            | PayState::PartialCancelled(code)
            | PayState::Unknown(code) => code,
        }
    }
}

/// Payment method reported in feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayType {
    /// Credit card (`1`)
    Card,
    /// Mobile phone billing (`2`)
    Phone,
    /// Overseas card (`3`)
    Overseas,
    /// Face-to-face card (`4`)
    FaceToFace,
    /// Bank transfer (`6`)
    BankTransfer,
    /// Virtual account (`7`)
    VirtualAccount,
    /// Kakao Pay (`15`)
    KakaoPay,
    /// Naver Pay (`16`)
    NaverPay,
    /// Registered card (`17`)
    Registered,
    /// Smile Pay (`21`)
    SmilePay,
    /// WeChat Pay (`22`)
    WeChatPay,
    /// Apple Pay (`23`)
    ApplePay,
    /// Toss Pay (`25`)
    TossPay,
    /// Unrecognised method
    Other(u16),
}

impl From<u16> for PayType {
    fn from(code: u16) -> Self {
        match code {
            1 => PayType::Card,
            2 => PayType::Phone,
            3 => PayType::Overseas,
            4 => PayType::FaceToFace,
            6 => PayType::BankTransfer,
            7 => PayType::VirtualAccount,
            15 => PayType::KakaoPay,
            16 => PayType::NaverPay,
            17 => PayType::Registered,
            21 => PayType::SmilePay,
            22 => PayType::WeChatPay,
            23 => PayType::ApplePay,
            25 => PayType::TossPay,
            other => PayType::Other(other),
        }
    }
}

/// Feedback notification posted by PayApp to the merchant's `feedbackurl`
///
/// Field names follow the form keys PayApp sends. Fields that PayApp leaves
/// empty for some states are kept as strings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Merchant id
    pub userid: String,
    /// Merchant link key
    pub linkkey: String,
    /// Merchant link value
    pub linkval: String,
    /// Product name
    #[serde(default)]
    pub goodname: String,
    /// Amount in KRW
    pub price: u64,
    /// Payer phone number
    #[serde(default)]
    pub recvphone: String,
    /// Request memo
    #[serde(default)]
    pub memo: Option<String>,
    /// Request date
    #[serde(default)]
    pub reqdate: Option<String>,
    /// Payer memo
    #[serde(default)]
    pub pay_memo: Option<String>,
    /// Payer address
    #[serde(default)]
    pub pay_addr: Option<String>,
    /// Payment date
    #[serde(default)]
    pub pay_date: Option<String>,
    /// Payment method code
    #[serde(default)]
    pub pay_type: Option<String>,
    /// Payment state
    pub pay_state: PayState,
    /// Merchant variable 1
    #[serde(default)]
    pub var1: Option<String>,
    /// Merchant variable 2
    #[serde(default)]
    pub var2: Option<String>,
    /// Payment request number
    pub mul_no: String,
    /// Payment page URL
    #[serde(default)]
    pub payurl: Option<String>,
    /// Receipt URL
    #[serde(default)]
    pub csturl: Option<String>,
    /// Card issuer name
    #[serde(default)]
    pub card_name: Option<String>,
    /// Recurring registration number
    #[serde(default)]
    pub rebill_no: Option<String>,
    /// Cancellation date
    #[serde(default)]
    pub canceldate: Option<String>,
    /// Cancellation memo
    #[serde(default)]
    pub cancelmemo: Option<String>,
}

impl Feedback {
    /// Parse a form-encoded feedback body
    pub fn from_form(body: &[u8]) -> Result<Self, serde_urlencoded::de::Error> {
        serde_urlencoded::from_bytes(body)
    }

    /// Payment method, when PayApp reported one
    pub fn pay_type(&self) -> Option<PayType> {
        self.pay_type
            .as_deref()
            .and_then(|code| code.trim().parse::<u16>().ok())
            .map(PayType::from)
    }

    /// Check whether this notification belongs to a recurring payment
    pub fn is_recurring(&self) -> bool {
        self.rebill_no.as_deref().is_some_and(|no| !no.is_empty())
    }
}

impl std::fmt::Debug for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feedback")
            .field("userid", &self.userid)
            .field("mul_no", &self.mul_no)
            .field("pay_state", &self.pay_state)
            .field("price", &self.price)
            .field("var1", &self.var1)
            .field("rebill_no", &self.rebill_no)
            .finish_non_exhaustive()
    }
}
