//! HTTP client factory with consistent timeout configuration.
//!
//! Identity provider adapters MUST obtain their client from `build_client()` rather
//! than constructing `reqwest::Client` directly, so no outbound call can hang a request.

use reqwest::Client;
use std::time::Duration;

/// Connect timeout (TCP handshake + TLS).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total request/response time for a single provider call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build an HTTP client with the given total request timeout.
///
/// The connect timeout never exceeds the request timeout.
pub fn build_client(request_timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(request_timeout))
        .timeout(request_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
}
