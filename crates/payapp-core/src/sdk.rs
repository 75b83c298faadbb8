//! PayApp browser SDK helpers
//!
//! The PayApp Lite SDK runs in the payer's browser. These helpers render the
//! markup a server embeds in its checkout page:
//!
//! 1. [`load_payapp_sdk`] - the `<script src>` tag that loads the SDK
//! 2. [`init_payapp_sdk`] - `PayApp.setDefault(...)` calls for merchant defaults
//! 3. [`request_payment_with_sdk`] / [`request_recurring_payment_with_sdk`] -
//!    `PayApp.setParam(...)` calls followed by `PayApp.payrequest()` or
//!    `PayApp.rebill()`
//!
//! ```html
//! <script src="https://lite.payapp.kr/public/api/v2/payapp-lite.js"></script>
//! <script>
//!   PayApp.setDefault("userid", "merchant");
//!   PayApp.setParam("goodname", "Coffee");
//!   PayApp.setParam("price", "4500");
//!   PayApp.payrequest();
//! </script>
//! ```
//!
//! Values are emitted as JSON string literals with `</` and `<!--` escaped,
//! so no value can close the surrounding `<script>` element.

use std::fmt::Write as _;

use crate::config::PayAppConfig;
use crate::error::Error;
use crate::types::{Params, PaymentRequest, RecurringPaymentRequest};

/// Quote a value as a JavaScript string literal safe inside `<script>`
fn js_string(value: &str) -> Result<String, Error> {
    let quoted = serde_json::to_string(value)?;
    Ok(quoted.replace("</", "<\\/").replace("<!--", "<\\!--"))
}

fn html_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn write_calls(out: &mut String, function: &str, params: &[(&str, String)]) -> Result<(), Error> {
    for (key, value) in params {
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "PayApp.{}({}, {});",
            function,
            js_string(key)?,
            js_string(value)?
        );
    }
    Ok(())
}

/// Render the `<script>` tag that loads the PayApp SDK
pub fn load_payapp_sdk(config: &PayAppConfig) -> String {
    format!("<script src=\"{}\"></script>", html_attr(&config.sdk_url))
}

/// Render the SDK initialisation calls for the merchant
pub fn init_payapp_sdk(config: &PayAppConfig) -> Result<String, Error> {
    if config.user_id.trim().is_empty() {
        return Err(Error::Config("PayApp user id is required".to_string()));
    }

    let mut defaults = vec![("userid", config.user_id.clone())];
    if let Some(shop_name) = &config.shop_name {
        defaults.push(("shopname", shop_name.clone()));
    }

    let mut out = String::new();
    write_calls(&mut out, "setDefault", &defaults)?;
    Ok(out)
}

fn with_default_urls(
    config: &PayAppConfig,
    mut params: Params,
    has_feedback: bool,
    has_return: bool,
) -> Params {
    if !has_feedback {
        if let Some(url) = &config.feedback_url {
            params.push(("feedbackurl", url.clone()));
        }
    }
    if !has_return {
        if let Some(url) = &config.return_url {
            params.push(("returnurl", url.clone()));
        }
    }
    params
}

/// Render the SDK calls that open the payment window for a one-time payment
pub fn request_payment_with_sdk(
    config: &PayAppConfig,
    request: &PaymentRequest,
) -> Result<String, Error> {
    request.validate()?;

    let params = with_default_urls(
        config,
        request.params(),
        request.feedback_url.is_some(),
        request.return_url.is_some(),
    );

    let mut out = String::new();
    write_calls(&mut out, "setParam", &params)?;
    out.push_str("PayApp.payrequest();\n");
    Ok(out)
}

/// Render the SDK calls that open the registration window for a recurring payment
pub fn request_recurring_payment_with_sdk(
    config: &PayAppConfig,
    request: &RecurringPaymentRequest,
) -> Result<String, Error> {
    request.validate()?;

    let params = with_default_urls(
        config,
        request.params(),
        request.feedback_url.is_some(),
        request.return_url.is_some(),
    );

    let mut out = String::new();
    write_calls(&mut out, "setParam", &params)?;
    out.push_str("PayApp.rebill();\n");
    Ok(out)
}

/// Render a complete checkout snippet: SDK loader plus an inline script that
/// initialises the SDK and opens the payment window
pub fn render_payment_snippet(
    config: &PayAppConfig,
    request: &PaymentRequest,
) -> Result<String, Error> {
    Ok(format!(
        "{}\n<script>\n{}{}</script>\n",
        load_payapp_sdk(config),
        init_payapp_sdk(config)?,
        request_payment_with_sdk(config, request)?
    ))
}
