//! 통계 제공자 포트.
//!
//! 구현: `pulse-monitor` crate (sysinfo + tokio 런타임 메트릭)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::metrics::Gauges;

/// 런타임/프로세스 내부 통계
#[async_trait]
pub trait RuntimeStatsProvider: Send + Sync {
    /// 현재 내부 통계 읽기 (항상 값을 돌려준다)
    async fn read_internal_stats(&self) -> Gauges;
}

/// 호스트 OS 통계 (코어별 CPU, 메모리)
#[async_trait]
pub trait HostStatsProvider: Send + Sync {
    /// 현재 호스트 통계 읽기
    async fn read_host_stats(&self) -> Result<Gauges, CoreError>;
}
