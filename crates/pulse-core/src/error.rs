//! PULSE 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 이 타입을 그대로 반환한다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 설정, 수집, 전송, 종료 등 에이전트 공통 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 필수 설정 누락/오류 (시작 시 치명적)
    #[error("설정 에러: {0}")]
    Config(String),

    /// 통계 제공자 읽기 실패 (스냅샷 축소, 비치명적)
    #[error("통계 수집 실패: {0}")]
    Provider(String),

    /// 보낼 메트릭이 없음
    #[error("빈 메트릭 배열, 전송할 데이터 없음")]
    EmptyReport,

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 200 이외의 응답 상태 코드
    #[error("잘못된 상태 코드: {status}")]
    UnexpectedStatus {
        /// 수신한 HTTP 상태 코드
        status: u16,
    },

    /// 페이로드 압축 실패
    #[error("압축 에러: {0}")]
    Compression(String),

    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 종료 신호에 의해 중단됨 (에러 상황 아님)
    #[error("작업 취소됨")]
    Cancelled,

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 재시도로 회복 가능한 에러인지 판별
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_) | CoreError::UnexpectedStatus { .. }
        )
    }

    /// 종료 신호로 인한 중단인지 여부
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Cancelled)
    }
}
