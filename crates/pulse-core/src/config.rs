//! 에이전트 설정 구조체.
//!
//! 전송 타임아웃, 수집/리포트 주기, 수집기 주소, 공유 비밀, 채널 용량을 정의한다.
//! `config` crate를 통해 파일/환경변수/CLI에서 로드한 뒤 [`AgentConfig::validate`]로
//! 한 번 검증하고, 이후에는 변경하지 않는다.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 에이전트 설정
///
/// 필수 항목이 빠지면 0 또는 빈 문자열로 역직렬화되고 검증에서 거부된다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// 전송 타임아웃 (밀리초)
    #[serde(default)]
    pub timeout_ms: u64,
    /// 수집 주기 (밀리초)
    #[serde(default)]
    pub poll_interval_ms: u64,
    /// 리포트 주기 (밀리초)
    #[serde(default)]
    pub report_interval_ms: u64,
    /// 수집기 주소 (`host:port` 또는 전체 URL)
    #[serde(default)]
    pub address: String,
    /// 무결성 해시용 공유 비밀 (비어 있으면 해시 비활성)
    #[serde(default)]
    pub key: Option<String>,
    /// 핸드오프 채널 용량
    #[serde(default)]
    pub rate_limit: usize,
    /// 전송 재시도 설정
    #[serde(default)]
    pub retry: RetryConfig,
}

/// 전송 재시도 설정 (선형 backoff)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// 최대 재시도 횟수 (총 시도 = max_retries + 1)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// 첫 대기 시간 (밀리초)
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// 실패할 때마다 늘어나는 대기 증분 (밀리초)
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            step_ms: default_step_ms(),
        }
    }
}

impl AgentConfig {
    /// 로컬 수집기 기준 예시 설정
    ///
    /// 코드에서 직접 에이전트를 구성할 때 쓴다. 설정 로더는 필수 항목에
    /// 기본값을 채우지 않는다.
    pub fn default_config() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            report_interval_ms: default_report_interval_ms(),
            address: default_address(),
            key: None,
            rate_limit: default_rate_limit(),
            retry: RetryConfig::default(),
        }
    }

    /// 필수 항목 검증
    ///
    /// 처음 발견한 누락 항목을 `CoreError::Config`로 반환한다.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.timeout_ms == 0 {
            return Err(missing("timeout"));
        }
        if self.poll_interval_ms == 0 {
            return Err(missing("poll_interval"));
        }
        if self.report_interval_ms == 0 {
            return Err(missing("report_interval"));
        }
        if self.address.trim().is_empty() {
            return Err(missing("address"));
        }
        if self.rate_limit == 0 {
            return Err(missing("rate_limit"));
        }
        Ok(())
    }

    /// 전송 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 수집 주기를 Duration으로 반환
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// 리포트 주기를 Duration으로 반환
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    /// 해시용 비밀 (빈 문자열은 없음으로 취급)
    pub fn hash_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }
}

fn missing(field: &str) -> CoreError {
    CoreError::Config(format!("필수 설정 누락: {field}"))
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_timeout_ms() -> u64 {
    5_000
}
fn default_poll_interval_ms() -> u64 {
    2_000
}
fn default_report_interval_ms() -> u64 {
    10_000
}
fn default_address() -> String {
    "localhost:8080".to_string()
}
fn default_rate_limit() -> usize {
    1
}
fn default_max_retries() -> u32 {
    3
}
fn default_initial_delay_ms() -> u64 {
    1_000
}
fn default_step_ms() -> u64 {
    2_000
}
