//! 샘플러 태스크.
//!
//! 수집 주기마다 통계 제공자를 읽어 스냅샷을 만들고 핸드오프 채널에 발행한다.
//! 첫 수집은 시작 후 한 주기 뒤. 틱은 한 샘플러 안에서 겹치지 않는다.

use async_trait::async_trait;
use pulse_core::models::metrics::{names, Snapshot};
use pulse_core::ports::monitor::{HostStatsProvider, RuntimeStatsProvider};
use pulse_core::shutdown::Shutdown;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::handoff::SnapshotPublisher;

/// 한 주기의 스냅샷 생성기
#[async_trait]
pub trait Sampler: Send {
    /// 로그용 이름
    fn name(&self) -> &'static str;

    /// 스냅샷 하나 생성 (실패하지 않음, 실패한 항목은 빠진다)
    async fn sample(&mut self) -> Snapshot;

    /// 발행 성공 후 호출
    fn on_published(&mut self) {}
}

/// 런타임 내부 통계 샘플러
///
/// 제공자 게이지에 `RandomValue`(0 이상 1 미만)와 `PollCount` 카운터를 더한다.
/// `PollCount`는 마지막 발행 이후 수집 횟수이며 발행하면 0으로 돌아간다.
pub struct RuntimeSampler {
    provider: Arc<dyn RuntimeStatsProvider>,
    pending_polls: i64,
}

impl RuntimeSampler {
    pub fn new(provider: Arc<dyn RuntimeStatsProvider>) -> Self {
        Self {
            provider,
            pending_polls: 0,
        }
    }

    /// 아직 발행되지 않은 수집 횟수
    pub fn pending_polls(&self) -> i64 {
        self.pending_polls
    }
}

#[async_trait]
impl Sampler for RuntimeSampler {
    fn name(&self) -> &'static str {
        "runtime"
    }

    async fn sample(&mut self) -> Snapshot {
        self.pending_polls += 1;

        let gauges = self.provider.read_internal_stats().await;
        let mut snapshot = Snapshot::with_gauges(gauges);
        snapshot.set_gauge(names::RANDOM_VALUE, rand::random::<f64>());
        snapshot.set_counter(names::POLL_COUNT, self.pending_polls);
        snapshot
    }

    fn on_published(&mut self) {
        self.pending_polls = 0;
    }
}

/// 호스트 OS 통계 샘플러
///
/// 제공자가 실패하면 빈 스냅샷을 돌려준다.
pub struct HostSampler {
    provider: Arc<dyn HostStatsProvider>,
}

impl HostSampler {
    pub fn new(provider: Arc<dyn HostStatsProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Sampler for HostSampler {
    fn name(&self) -> &'static str {
        "host"
    }

    async fn sample(&mut self) -> Snapshot {
        match self.provider.read_host_stats().await {
            Ok(gauges) => Snapshot::with_gauges(gauges),
            Err(e) => {
                warn!("호스트 통계 수집 실패: {e}");
                Snapshot::new()
            }
        }
    }
}

/// 샘플러 루프 실행 (종료 신호까지)
pub async fn run_sampler<S: Sampler>(
    mut sampler: S,
    period: Duration,
    publisher: SnapshotPublisher,
    mut shutdown: Shutdown,
) {
    let name = sampler.name();
    info!("{name} 샘플러 시작: 주기 {}ms", period.as_millis());

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let snapshot = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            snapshot = sampler.sample() => snapshot,
        };

        if snapshot.is_empty() {
            warn!("{name} 샘플러: 수집된 측정값 없음, 이번 주기 발행 생략");
            continue;
        }

        let count = snapshot.len();
        match publisher.publish(snapshot, &mut shutdown).await {
            Ok(()) => {
                sampler.on_published();
                debug!("{name} 샘플러: 스냅샷 발행 ({count}개)");
            }
            Err(e) if e.is_cancelled() => break,
            Err(e) => {
                error!("{name} 샘플러: 발행 실패, 종료: {e}");
                break;
            }
        }
    }

    info!("{name} 샘플러 종료");
}
