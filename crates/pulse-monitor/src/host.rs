//! 호스트 OS 통계.
//!
//! `HostStatsProvider` 포트 구현. sysinfo 기반 코어별 CPU 사용률과
//! 전체/여유 메모리.

use async_trait::async_trait;
use pulse_core::error::CoreError;
use pulse_core::models::metrics::{names, Gauges};
use pulse_core::ports::monitor::HostStatsProvider;
use std::sync::Mutex;
use sysinfo::System;
use tracing::debug;

/// sysinfo 기반 호스트 모니터 — `HostStatsProvider` 포트 구현
pub struct HostStatsMonitor {
    sys: Mutex<System>,
}

impl HostStatsMonitor {
    /// 새 호스트 모니터 생성
    pub fn new() -> Self {
        Self {
            sys: Mutex::new(System::new_all()),
        }
    }
}

impl Default for HostStatsMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostStatsProvider for HostStatsMonitor {
    async fn read_host_stats(&self) -> Result<Gauges, CoreError> {
        let mut sys = self
            .sys
            .lock()
            .map_err(|e| CoreError::Provider(format!("시스템 잠금 실패: {e}")))?;
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let cpus = sys.cpus();
        if cpus.is_empty() {
            return Err(CoreError::Provider("CPU 정보를 읽을 수 없음".to_string()));
        }

        let mut gauges: Gauges = cpus
            .iter()
            .enumerate()
            .map(|(core, cpu)| (names::cpu_utilization(core), f64::from(cpu.cpu_usage())))
            .collect();

        let total = sys.total_memory();
        if total > 0 {
            gauges.insert(names::TOTAL_MEMORY.to_string(), total as f64);
            gauges.insert(names::FREE_MEMORY.to_string(), sys.free_memory() as f64);
        }

        debug!(
            "호스트 통계: CPU {}코어, 메모리 {}/{}MB",
            cpus.len(),
            sys.free_memory() / 1_048_576,
            total / 1_048_576
        );
        Ok(gauges)
    }
}
