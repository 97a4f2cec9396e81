//! 선형 backoff 재시도.
//!
//! 임의의 `FnMut() -> Future<Output = Result<T, CoreError>>` 작업을 감싼다.
//! k번째 대기 시간은 `initial_delay + (k-1) * step` 이다.
//! 모든 시도와 대기는 종료 신호와 경쟁하며, 종료가 먼저 오면
//! 원래 에러 대신 `CoreError::Cancelled`를 반환한다.

use pulse_core::config::RetryConfig;
use pulse_core::error::CoreError;
use pulse_core::shutdown::Shutdown;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// 재시도 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최대 재시도 횟수 (총 시도 = max_retries + 1)
    pub max_retries: u32,
    /// 첫 대기 시간
    pub initial_delay: Duration,
    /// 대기마다 늘어나는 증분
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration, step: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            step,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            step: Duration::from_millis(config.step_ms),
        }
    }

    /// k번째(1부터) 재시도 전 대기 시간
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.initial_delay + self.step * retry.saturating_sub(1)
    }

    /// 정책에 따라 작업 실행
    ///
    /// 성공하면 즉시 반환. 재시도 불가 에러이거나 재시도를 모두 쓰면
    /// 마지막 에러를 반환한다.
    pub async fn run<F, Fut, T>(&self, shutdown: &Shutdown, mut op: F) -> Result<T, CoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut shutdown = shutdown.clone();
        let mut retries = 0u32;

        loop {
            if shutdown.is_cancelled() {
                return Err(CoreError::Cancelled);
            }

            let result = tokio::select! {
                biased;
                _ = shutdown.cancelled() => return Err(CoreError::Cancelled),
                result = op() => result,
            };

            let err = match result {
                Ok(value) => {
                    if retries > 0 {
                        debug!("재시도 {retries}회 후 성공");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if err.is_cancelled() || !err.is_retryable() || retries >= self.max_retries {
                return Err(err);
            }

            retries += 1;
            let delay = self.delay_for(retries);
            warn!(
                "작업 실패 (시도 {}/{}), {}ms 후 재시도: {err}",
                retries,
                self.max_retries + 1,
                delay.as_millis()
            );

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => return Err(CoreError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
