//! Configuration types for PayApp integration

use std::env;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::util::{DEFAULT_TIMEOUT_MS, PAYAPP_API_URL, PAYAPP_SDK_URL};

/// Environment variable `PAYAPP_USERID`
pub const ENV_PAYAPP_USERID: &str = "PAYAPP_USERID";
/// Environment variable `PAYAPP_LINK_KEY`
pub const ENV_PAYAPP_LINK_KEY: &str = "PAYAPP_LINK_KEY";
/// Environment variable `PAYAPP_LINK_VAL`
pub const ENV_PAYAPP_LINK_VAL: &str = "PAYAPP_LINK_VAL";
/// Environment variable `PAYAPP_SHOP_NAME`
pub const ENV_PAYAPP_SHOP_NAME: &str = "PAYAPP_SHOP_NAME";
/// Environment variable `PAYAPP_API_URL`
pub const ENV_PAYAPP_API_URL: &str = "PAYAPP_API_URL";
/// Environment variable `PAYAPP_FEEDBACK_URL`
pub const ENV_PAYAPP_FEEDBACK_URL: &str = "PAYAPP_FEEDBACK_URL";
/// Environment variable `PAYAPP_RETURN_URL`
pub const ENV_PAYAPP_RETURN_URL: &str = "PAYAPP_RETURN_URL";
/// Environment variable `PAYAPP_FEEDBACK_SECRET`
pub const ENV_PAYAPP_FEEDBACK_SECRET: &str = "PAYAPP_FEEDBACK_SECRET";

const SECRET_LEN: usize = 32;

/// PayApp merchant configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct PayAppConfig {
    /// Merchant (seller) id issued by PayApp
    pub user_id: String,
    /// Link key from the merchant console, echoed in every feedback
    pub link_key: String,
    /// Link value from the merchant console, echoed in every feedback
    pub link_val: String,
    /// Shop name shown on the SDK payment window
    #[serde(default)]
    pub shop_name: Option<String>,
    /// REST endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Browser SDK location
    #[serde(default = "default_sdk_url")]
    pub sdk_url: String,
    /// Default feedback (webhook) URL for requests that don't set one
    #[serde(default)]
    pub feedback_url: Option<String>,
    /// Default return URL for requests that don't set one
    #[serde(default)]
    pub return_url: Option<String>,
    /// Secret used to sign `var2` with [`generate_feedback_key`](crate::generate_feedback_key).
    /// Feedback keys are not checked when unset.
    #[serde(default)]
    pub feedback_secret: Option<String>,
    /// HTTP timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_api_url() -> String {
    PAYAPP_API_URL.to_string()
}

fn default_sdk_url() -> String {
    PAYAPP_SDK_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl PayAppConfig {
    /// Create a configuration with default endpoints
    pub fn new(user_id: &str, link_key: &str, link_val: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            link_key: link_key.to_string(),
            link_val: link_val.to_string(),
            shop_name: None,
            api_url: default_api_url(),
            sdk_url: default_sdk_url(),
            feedback_url: None,
            return_url: None,
            feedback_secret: None,
            timeout_ms: default_timeout_ms(),
        }
    }

    /// Override fields from `PAYAPP_*` environment variables
    pub fn from_env(mut self) -> Self {
        if let Ok(user_id) = env::var(ENV_PAYAPP_USERID) {
            self.user_id = user_id;
        }

        if let Ok(link_key) = env::var(ENV_PAYAPP_LINK_KEY) {
            self.link_key = link_key;
        }

        if let Ok(link_val) = env::var(ENV_PAYAPP_LINK_VAL) {
            self.link_val = link_val;
        }

        if let Ok(shop_name) = env::var(ENV_PAYAPP_SHOP_NAME) {
            self.shop_name = Some(shop_name);
        }

        if let Ok(api_url) = env::var(ENV_PAYAPP_API_URL) {
            self.api_url = api_url;
        }

        if let Ok(feedback_url) = env::var(ENV_PAYAPP_FEEDBACK_URL) {
            self.feedback_url = Some(feedback_url);
        }

        if let Ok(return_url) = env::var(ENV_PAYAPP_RETURN_URL) {
            self.return_url = Some(return_url);
        }

        if let Ok(secret) = env::var(ENV_PAYAPP_FEEDBACK_SECRET) {
            self.feedback_secret = Some(secret);
        }

        self
    }

    /// Set the feedback secret
    pub fn with_feedback_secret(mut self, secret: impl Into<String>) -> Self {
        self.feedback_secret = Some(secret.into());
        self
    }
}

impl fmt::Debug for PayAppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayAppConfig")
            .field("user_id", &self.user_id)
            .field("link_key", &"<redacted>")
            .field("link_val", &"<redacted>")
            .field("shop_name", &self.shop_name)
            .field("api_url", &self.api_url)
            .field("sdk_url", &self.sdk_url)
            .field("feedback_url", &self.feedback_url)
            .field("return_url", &self.return_url)
            .field(
                "feedback_secret",
                &self.feedback_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Generate a random alphanumeric secret for feedback keys
pub fn generate_feedback_secret() -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    let mut rng = rand::rng();
    (0..SECRET_LEN)
        .map(|_| CHARS[rng.random_range(0..CHARS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_defaults() {
        let config: PayAppConfig = serde_json::from_value(serde_json::json!({
            "user_id": "merchant",
            "link_key": "key",
            "link_val": "val"
        }))
        .unwrap();

        assert_eq!(config.api_url, PAYAPP_API_URL);
        assert_eq!(config.sdk_url, PAYAPP_SDK_URL);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(config.feedback_secret.is_none());
    }

    // The only test that touches PAYAPP_* variables
    #[test]
    fn test_from_env_overrides() {
        let all = [
            (ENV_PAYAPP_USERID, "env-merchant"),
            (ENV_PAYAPP_LINK_KEY, "env-key"),
            (ENV_PAYAPP_LINK_VAL, "env-val"),
            (ENV_PAYAPP_SHOP_NAME, "Env Shop"),
            (ENV_PAYAPP_API_URL, "https://api.example/oapi/apiLoad.html"),
            (ENV_PAYAPP_FEEDBACK_URL, "https://shop.example/feedback"),
            (ENV_PAYAPP_RETURN_URL, "https://shop.example/done"),
            (ENV_PAYAPP_FEEDBACK_SECRET, "env-secret"),
        ];
        for (name, _) in all {
            env::remove_var(name);
        }

        let untouched = PayAppConfig::new("merchant", "key", "val").from_env();
        assert_eq!(untouched.user_id, "merchant");
        assert_eq!(untouched.link_key, "key");
        assert_eq!(untouched.link_val, "val");
        assert_eq!(untouched.api_url, PAYAPP_API_URL);
        assert!(untouched.shop_name.is_none());
        assert!(untouched.feedback_url.is_none());
        assert!(untouched.return_url.is_none());
        assert!(untouched.feedback_secret.is_none());

        for (name, value) in all {
            env::set_var(name, value);
        }
        let config = PayAppConfig::new("merchant", "key", "val").from_env();
        for (name, _) in all {
            env::remove_var(name);
        }

        assert_eq!(config.user_id, "env-merchant");
        assert_eq!(config.link_key, "env-key");
        assert_eq!(config.link_val, "env-val");
        assert_eq!(config.shop_name.as_deref(), Some("Env Shop"));
        assert_eq!(config.api_url, "https://api.example/oapi/apiLoad.html");
        assert_eq!(
            config.feedback_url.as_deref(),
            Some("https://shop.example/feedback")
        );
        assert_eq!(config.return_url.as_deref(), Some("https://shop.example/done"));
        assert_eq!(config.feedback_secret.as_deref(), Some("env-secret"));
        assert_eq!(config.sdk_url, PAYAPP_SDK_URL);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = PayAppConfig::new("merchant", "secret-key", "secret-val")
            .with_feedback_secret("hmac-secret");
        let debug = format!("{:?}", config);

        assert!(debug.contains("merchant"));
        assert!(!debug.contains("secret-key"));
        assert!(!debug.contains("secret-val"));
        assert!(!debug.contains("hmac-secret"));
    }

    #[test]
    fn test_generate_feedback_secret() {
        let a = generate_feedback_secret();
        let b = generate_feedback_secret();

        assert_eq!(a.len(), SECRET_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
