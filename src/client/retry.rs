use reqwest::{header::HeaderMap, Method, StatusCode};
use std::time::Duration;

/// Which failed requests are retried, and how long to wait between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total attempts = 1 + `limit`.
    pub limit: u32,
    pub methods: Vec<Method>,
    pub status_codes: Vec<StatusCode>,
    /// Delay before the first retry, doubled for each further one.
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            limit: 2,
            methods: vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH],
            status_codes: [408, 500, 502, 503, 504]
                .into_iter()
                .filter_map(|code| StatusCode::from_u16(code).ok())
                .collect(),
            backoff_base: Duration::from_millis(300),
            backoff_max: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            limit: 0,
            ..Self::default()
        }
    }

    /// `attempt` is 1-based: the attempt that just failed.
    pub fn retries_status(&self, method: &Method, status: StatusCode, attempt: u32) -> bool {
        attempt <= self.limit && self.methods.contains(method) && self.status_codes.contains(&status)
    }

    /// Transport failures (refused, reset, DNS) are retried; timeouts are not.
    pub fn retries_transport(&self, method: &Method, error: &reqwest::Error, attempt: u32) -> bool {
        attempt <= self.limit && self.methods.contains(method) && !error.is_timeout() && (error.is_connect() || error.is_request())
    }

    /// Wait before retry number `attempt` (1-based). `Retry-After` in seconds wins.
    pub fn delay(&self, attempt: u32, headers: Option<&HeaderMap>) -> Duration {
        if let Some(seconds) = headers.and_then(retry_after_secs) {
            return Duration::from_secs(seconds);
        }
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.backoff_base.saturating_mul(factor).min(self.backoff_max)
    }
}

fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
