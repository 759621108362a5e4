#![allow(dead_code)]

pub mod api_server;

use scalepad_core::{ClientConfig, RetryConfig, ScalePadClient};

/// Client against `base_url` with short timeouts and millisecond backoff.
pub fn client(base_url: &str, max_retries: u32, timeout_ms: u64) -> ScalePadClient {
    let config = ClientConfig {
        base_url: base_url.to_string(),
        timeout_ms,
        retry: Some(RetryConfig {
            max_retries,
            base_delay_ms: 5,
            max_delay_ms: 20,
            ..RetryConfig::default()
        }),
        ..ClientConfig::new("c4d67eca-3b32ed26-b2412e47-2f634617")
    };
    ScalePadClient::new(&config).expect("valid config")
}
