//! 런타임/프로세스 내부 통계.
//!
//! `RuntimeStatsProvider` 포트 구현. 에이전트 자신의 프로세스(sysinfo)와
//! 현재 tokio 런타임의 통계를 게이지로 돌려준다. 실패하지 않는다:
//! 읽지 못한 항목은 결과에서 빠질 뿐이다.

use async_trait::async_trait;
use pulse_core::models::metrics::{names, Gauges};
use pulse_core::ports::monitor::RuntimeStatsProvider;
use std::sync::Mutex;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, warn};

/// sysinfo 기반 프로세스 통계 — `RuntimeStatsProvider` 포트 구현
pub struct ProcessStatsMonitor {
    sys: Mutex<System>,
    pid: Option<Pid>,
}

impl ProcessStatsMonitor {
    /// 현재 프로세스를 추적하는 모니터 생성
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                warn!("현재 PID 조회 실패, 프로세스 통계 생략: {e}");
                None
            }
        };
        Self {
            sys: Mutex::new(System::new()),
            pid,
        }
    }

    fn collect_process(&self, gauges: &mut Gauges) {
        let Some(pid) = self.pid else {
            return;
        };
        let mut sys = self.sys.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let Some(process) = sys.process(pid) else {
            warn!("프로세스 {pid} 정보 없음");
            return;
        };

        let disk = process.disk_usage();
        gauges.insert(names::RESIDENT_MEMORY.to_string(), process.memory() as f64);
        gauges.insert(
            names::VIRTUAL_MEMORY.to_string(),
            process.virtual_memory() as f64,
        );
        gauges.insert(
            names::PROCESS_CPU_USAGE.to_string(),
            f64::from(process.cpu_usage()),
        );
        gauges.insert(names::PROCESS_UPTIME.to_string(), process.run_time() as f64);
        gauges.insert(
            names::DISK_READ_BYTES.to_string(),
            disk.total_read_bytes as f64,
        );
        gauges.insert(
            names::DISK_WRITTEN_BYTES.to_string(),
            disk.total_written_bytes as f64,
        );
    }
}

impl Default for ProcessStatsMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// 현재 tokio 런타임 통계 (런타임 밖이면 생략)
fn collect_runtime(gauges: &mut Gauges) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        return;
    };
    let metrics = handle.metrics();
    gauges.insert(
        names::RUNTIME_WORKERS.to_string(),
        metrics.num_workers() as f64,
    );
    gauges.insert(
        names::RUNTIME_ALIVE_TASKS.to_string(),
        metrics.num_alive_tasks() as f64,
    );
}

#[async_trait]
impl RuntimeStatsProvider for ProcessStatsMonitor {
    async fn read_internal_stats(&self) -> Gauges {
        let mut gauges = Gauges::new();
        self.collect_process(&mut gauges);
        collect_runtime(&mut gauges);

        debug!(
            "런타임 통계: {}개 (RSS {}MB)",
            gauges.len(),
            gauges
                .get(names::RESIDENT_MEMORY)
                .map(|rss| *rss as u64 / 1_048_576)
                .unwrap_or_default()
        );
        gauges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_own_process() {
        let monitor = ProcessStatsMonitor::new();
        let gauges = monitor.read_internal_stats().await;

        assert!(gauges[names::RESIDENT_MEMORY] > 0.0);
        assert!(gauges.contains_key(names::PROCESS_UPTIME));
        assert!(gauges[names::RUNTIME_WORKERS] >= 1.0);
    }

    #[test]
    fn outside_runtime_skips_runtime_gauges() {
        let mut gauges = Gauges::new();
        collect_runtime(&mut gauges);
        assert!(gauges.is_empty());
    }
}
