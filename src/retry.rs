//! Retrying of requests.

use crate::error::{Error, Result};
use crate::helpers::is_login;
use std::future::Future;
use std::time::Duration;
use async_std::task::sleep;
use reqwest::{Response, StatusCode};

/// How requests are retried. Every network call made by the client goes through one policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// The number of attempts after the first one.
    pub max_retries: u32,
    /// The delay before the first retry.
    pub delay: Duration,
    /// The delay is multiplied by this after each retry. `1.0` keeps the delay fixed.
    pub backoff_factor: f64,
    /// Statuses that fail immediately without retrying.
    pub non_retryable: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_secs(2),
            backoff_factor: 1.0,
            non_retryable: vec![
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::UNAUTHORIZED,
            ],
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with a fixed delay between attempts.
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            delay,
            ..Self::default()
        }
    }

    /// A policy that makes a single attempt.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Multiplies the delay after each retry.
    pub fn backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.backoff_factor = backoff_factor;
        self
    }

    /// The delay before retry number `retry` (starting at 0).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.backoff_factor.max(0.0).powi(retry as i32);

        self.delay.mul_f64(factor)
    }

    /// Executes a request, retrying on network errors and unexpected statuses. Errors from
    /// building the request fail immediately.
    ///
    /// `attempt` is called once per attempt. Build the request inside it when the body holds
    /// anything single-use so that it is regenerated on every attempt.
    pub async fn execute<F, Fut, E>(&self, mut attempt: F) -> Result<Response>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<Response, E>>,
        E: Into<Error>,
    {
        let mut retry = 0;

        loop {
            let error = match attempt().await {
                Ok(response) => match self.check_status(&response) {
                    Ok(()) => return Ok(response),
                    Err(error) if self.is_retryable(response.status()) => error,
                    Err(error) => return Err(error),
                },
                Err(error) => match error.into() {
                    error if error.is_transient() => error,
                    error => return Err(error),
                },
            };

            if retry >= self.max_retries {
                return Err(error);
            }

            let delay = self.delay_for(retry);

            log::warn!("Request failed ({error}), retrying in {}ms", delay.as_millis());
            retry += 1;
            sleep(delay).await;
        }
    }

    fn is_retryable(&self, status: StatusCode) -> bool {
        !self.non_retryable.contains(&status) && !status.is_redirection()
    }

    fn check_status(&self, response: &Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimitExceeded),
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
            StatusCode::BAD_REQUEST => Err(Error::BadRequest),
            status if status.is_redirection() => {
                if is_login(response.headers().get(reqwest::header::LOCATION)) {
                    Err(Error::CookieExpired)
                } else {
                    Ok(())
                }
            },
            status => Err(Error::from_status(status)),
        }
    }
}
