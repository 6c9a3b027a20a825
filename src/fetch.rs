// 🌐 Fetch adapter - HTTP GET of the listing page with bounded retries
//
// The retry policy is explicit data (attempts + delay), not decoration:
// after the last attempt fails, the caller gets a typed `Exhausted` error
// and the runner skips the cycle. No partial batch ever reaches the
// reconciler.

use std::thread;
use std::time::Duration;

use log::warn;

use crate::error::FetchError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            delay,
        }
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    pub fn run<T>(
        &self,
        mut op: impl FnMut() -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= self.max_attempts => {
                    return Err(FetchError::Exhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    warn!(
                        "fetch attempt {}/{} failed: {} (retrying in {:?})",
                        attempt, self.max_attempts, err, self.delay
                    );
                    thread::sleep(self.delay);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(3, Duration::from_secs(2))
    }
}

/// Fetch the raw listing page body.
pub fn fetch_page(url: &str, policy: &RetryPolicy) -> Result<String, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    policy.run(|| {
        let response = client
            .get(url)
            .send()
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16) -> FetchError {
        FetchError::Status {
            url: "http://example.test".to_string(),
            status,
        }
    }

    #[test]
    fn test_retry_succeeds_mid_budget() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let mut attempts = 0;

        let result = policy.run(|| {
            attempts += 1;
            if attempts < 2 {
                Err(status_error(503))
            } else {
                Ok("body".to_string())
            }
        });

        assert_eq!(result.unwrap(), "body");
        assert_eq!(attempts, 2);
    }

    #[test]
    fn test_retry_exhaustion_is_typed() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let mut attempts = 0;

        let result: Result<String, FetchError> = policy.run(|| {
            attempts += 1;
            Err(status_error(500))
        });

        assert_eq!(attempts, 3);
        match result {
            Err(FetchError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, FetchError::Status { status: 500, .. }));
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_attempt_budget_still_runs_once() {
        let policy = RetryPolicy::new(0, Duration::from_millis(1));
        let mut attempts = 0;

        let result: Result<(), FetchError> = policy.run(|| {
            attempts += 1;
            Err(status_error(500))
        });

        assert_eq!(attempts, 1);
        assert!(matches!(result, Err(FetchError::Exhausted { .. })));
    }
}
