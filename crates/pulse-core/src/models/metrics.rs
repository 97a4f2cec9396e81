//! 메트릭 스냅샷 모델.
//!
//! 게이지(최신 값만 유지)와 카운터(주기 간 누적)의 한 시점 묶음.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 잘 알려진 메트릭 이름
pub mod names {
    /// 런타임 샘플러 주기 카운터
    pub const POLL_COUNT: &str = "PollCount";
    /// 주기마다 새로 뽑는 [0, 1) 난수 게이지
    pub const RANDOM_VALUE: &str = "RandomValue";

    /// 프로세스 상주 메모리 (바이트)
    pub const RESIDENT_MEMORY: &str = "ResidentMemory";
    /// 프로세스 가상 메모리 (바이트)
    pub const VIRTUAL_MEMORY: &str = "VirtualMemory";
    /// 프로세스 CPU 사용률 (%)
    pub const PROCESS_CPU_USAGE: &str = "ProcessCpuUsage";
    /// 프로세스 실행 시간 (초)
    pub const PROCESS_UPTIME: &str = "ProcessUptime";
    /// 누적 디스크 읽기 (바이트)
    pub const DISK_READ_BYTES: &str = "DiskReadBytes";
    /// 누적 디스크 쓰기 (바이트)
    pub const DISK_WRITTEN_BYTES: &str = "DiskWrittenBytes";
    /// tokio 워커 스레드 수
    pub const RUNTIME_WORKERS: &str = "RuntimeWorkers";
    /// tokio 활성 태스크 수
    pub const RUNTIME_ALIVE_TASKS: &str = "RuntimeAliveTasks";

    /// 호스트 전체 메모리 (바이트)
    pub const TOTAL_MEMORY: &str = "TotalMemory";
    /// 호스트 여유 메모리 (바이트)
    pub const FREE_MEMORY: &str = "FreeMemory";
    /// 코어별 CPU 사용률 접두사 (`CPUutilization0`, `CPUutilization1`, ...)
    pub const CPU_UTILIZATION_PREFIX: &str = "CPUutilization";

    /// 코어 번호로 CPU 사용률 메트릭 이름 생성
    pub fn cpu_utilization(core: usize) -> String {
        format!("{CPU_UTILIZATION_PREFIX}{core}")
    }
}

/// 이름 → 게이지 값
pub type Gauges = BTreeMap<String, f64>;

/// 이름 → 카운터 값
pub type Counters = BTreeMap<String, i64>;

/// 메트릭 스냅샷
///
/// 샘플러 한 번의 호출로 통째로 만들어지며, 발행 후에는 수정되지 않는다.
/// 소유권은 핸드오프 채널을 거쳐 리포터로 넘어간다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 수집 시각
    pub collected_at: DateTime<Utc>,
    /// 게이지 (이름 유일)
    #[serde(default)]
    pub gauges: Gauges,
    /// 카운터 (이름 유일)
    #[serde(default)]
    pub counters: Counters,
}

impl Snapshot {
    /// 현재 시각의 빈 스냅샷
    pub fn new() -> Self {
        Self {
            collected_at: Utc::now(),
            gauges: Gauges::new(),
            counters: Counters::new(),
        }
    }

    /// 게이지 묶음으로 스냅샷 생성
    pub fn with_gauges(gauges: Gauges) -> Self {
        Self {
            gauges,
            ..Self::new()
        }
    }

    /// 게이지 설정 (덮어쓰기)
    pub fn set_gauge(&mut self, name: impl Into<String>, value: f64) {
        self.gauges.insert(name.into(), value);
    }

    /// 카운터 설정
    pub fn set_counter(&mut self, name: impl Into<String>, value: i64) {
        self.counters.insert(name.into(), value);
    }

    /// 전체 측정값 수
    pub fn len(&self) -> usize {
        self.gauges.len() + self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty() && self.counters.is_empty()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}
