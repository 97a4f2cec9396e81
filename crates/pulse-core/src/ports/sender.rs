//! 메트릭 전송 포트.
//!
//! 구현: `pulse-network` crate (reqwest)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::wire::WireRecord;

/// 수집기로 레코드 배치 전송
///
/// 한 번만 시도한다. 재시도는 바깥의 `RetryPolicy`가 담당한다.
#[async_trait]
pub trait MetricsSender: Send + Sync {
    /// 레코드 배치를 한 번의 요청으로 전송
    async fn send_batch(&self, records: &[WireRecord]) -> Result<(), CoreError>;
}
