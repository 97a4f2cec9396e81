//! 에이전트 조립 및 실행.
//!
//! 검증된 설정으로 어댑터를 만들고(DI), 샘플러 2개와 리포터 1개를 띄운 뒤
//! 종료 트리거가 오면 모든 태스크를 정리한다.

use futures::future::join_all;
use pulse_core::config::AgentConfig;
use pulse_core::error::CoreError;
use pulse_core::ports::monitor::{HostStatsProvider, RuntimeStatsProvider};
use pulse_core::ports::sender::MetricsSender;
use pulse_monitor::host::HostStatsMonitor;
use pulse_monitor::runtime::ProcessStatsMonitor;
use pulse_network::http_client::HttpMetricsSender;
use pulse_network::retry::RetryPolicy;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::handoff::handoff_channel;
use crate::lifecycle::{LifecycleManager, LifecycleState, ShutdownSignals};
use crate::reporter::Reporter;
use crate::sampler::{run_sampler, HostSampler, RuntimeSampler};

/// 종료 신호 후 태스크 정리 대기 한도
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// 메트릭 에이전트
pub struct Agent {
    config: Arc<AgentConfig>,
    runtime_stats: Arc<dyn RuntimeStatsProvider>,
    host_stats: Arc<dyn HostStatsProvider>,
    sender: Arc<dyn MetricsSender>,
    retry: RetryPolicy,
    drain_timeout: Duration,
    lifecycle: LifecycleManager,
}

impl Agent {
    /// 설정 검증 후 sysinfo 제공자와 HTTP 전송기로 에이전트 생성
    pub fn new(config: AgentConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let sender = HttpMetricsSender::new(&config.address, config.timeout())?;
        info!("수집기: {}", sender.base_url());

        Self::with_components(
            config,
            Arc::new(ProcessStatsMonitor::new()),
            Arc::new(HostStatsMonitor::new()),
            Arc::new(sender),
        )
    }

    /// 제공자/전송기를 직접 주입해 생성
    pub fn with_components(
        config: AgentConfig,
        runtime_stats: Arc<dyn RuntimeStatsProvider>,
        host_stats: Arc<dyn HostStatsProvider>,
        sender: Arc<dyn MetricsSender>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let retry = RetryPolicy::from_config(&config.retry);

        Ok(Self {
            config: Arc::new(config),
            runtime_stats,
            host_stats,
            sender,
            retry,
            drain_timeout: DRAIN_TIMEOUT,
            lifecycle: LifecycleManager::new(),
        })
    }

    /// 재시도 정책 교체
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 정리 대기 한도 교체
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// 라이프사이클 상태 구독 (실행 전에 호출)
    pub fn watch_state(&self) -> watch::Receiver<LifecycleState> {
        self.lifecycle.watch_state()
    }

    /// OS 종료 시그널까지 실행
    ///
    /// 핸들러는 태스크 기동 전에 등록한다. 등록에 실패하면 아무 태스크도
    /// 띄우지 않고 에러를 반환한다.
    pub async fn run(self) -> Result<(), CoreError> {
        let mut signals = ShutdownSignals::register()?;
        self.run_until(async move {
            signals.recv().await;
        })
        .await;
        Ok(())
    }

    /// `stop`이 끝날 때까지 실행한 뒤 정리
    pub async fn run_until<F>(self, stop: F)
    where
        F: Future<Output = ()>,
    {
        let Agent {
            config,
            runtime_stats,
            host_stats,
            sender,
            retry,
            drain_timeout,
            lifecycle,
        } = self;

        // Starting
        let (publisher, receiver) = handoff_channel(config.rate_limit);
        let poll = config.poll_interval();

        let tasks = vec![
            tokio::spawn(run_sampler(
                RuntimeSampler::new(runtime_stats),
                poll,
                publisher.clone(),
                lifecycle.subscribe(),
            )),
            tokio::spawn(run_sampler(
                HostSampler::new(host_stats),
                poll,
                publisher,
                lifecycle.subscribe(),
            )),
            tokio::spawn(
                Reporter::new(
                    receiver,
                    sender,
                    retry,
                    config.hash_key().map(str::to_string),
                    config.report_interval(),
                )
                .run(lifecycle.subscribe()),
            ),
        ];

        // Running
        lifecycle.transition(LifecycleState::Running);
        info!(
            "에이전트 실행: 수집 {}ms, 리포트 {}ms, 채널 용량 {}, 해시 {}",
            config.poll_interval_ms,
            config.report_interval_ms,
            config.rate_limit,
            if config.hash_key().is_some() { "on" } else { "off" }
        );
        stop.await;

        // Draining
        lifecycle.transition(LifecycleState::Draining);
        lifecycle.shutdown();

        let abort_handles: Vec<_> = tasks.iter().map(|t| t.abort_handle()).collect();
        match tokio::time::timeout(drain_timeout, join_all(tasks)).await {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        error!("태스크 비정상 종료: {e}");
                    }
                }
            }
            Err(_) => {
                warn!(
                    "정리 한도 {}ms 초과, 남은 태스크 중단",
                    drain_timeout.as_millis()
                );
                for handle in abort_handles {
                    handle.abort();
                }
            }
        }

        // Stopped
        lifecycle.transition(LifecycleState::Stopped);
        info!("에이전트 종료 완료");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pulse_core::models::metrics::{names, Gauges};
    use pulse_core::models::wire::{MetricValue, WireRecord};
    use std::sync::Mutex;

    struct StubRuntime;

    #[async_trait]
    impl RuntimeStatsProvider for StubRuntime {
        async fn read_internal_stats(&self) -> Gauges {
            Gauges::from([(names::RESIDENT_MEMORY.to_string(), 1.0)])
        }
    }

    struct StubHost;

    #[async_trait]
    impl HostStatsProvider for StubHost {
        async fn read_host_stats(&self) -> Result<Gauges, CoreError> {
            Ok(Gauges::from([(names::TOTAL_MEMORY.to_string(), 8.0)]))
        }
    }

    /// 읽기가 항상 실패하는 호스트 (호스트 스냅샷 없음)
    struct UnavailableHost;

    #[async_trait]
    impl HostStatsProvider for UnavailableHost {
        async fn read_host_stats(&self) -> Result<Gauges, CoreError> {
            Err(CoreError::Provider("no host data".to_string()))
        }
    }

    #[derive(Default)]
    struct CollectingSender {
        batches: Mutex<Vec<Vec<WireRecord>>>,
    }

    #[async_trait]
    impl MetricsSender for CollectingSender {
        async fn send_batch(&self, records: &[WireRecord]) -> Result<(), CoreError> {
            self.batches.lock().unwrap().push(records.to_vec());
            Ok(())
        }
    }

    /// 응답이 오지 않는 전송기
    struct HangingSender;

    #[async_trait]
    impl MetricsSender for HangingSender {
        async fn send_batch(&self, _records: &[WireRecord]) -> Result<(), CoreError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    fn test_config() -> AgentConfig {
        AgentConfig {
            poll_interval_ms: 1_000,
            report_interval_ms: 2_000,
            rate_limit: 4,
            key: Some("secret".to_string()),
            ..AgentConfig::default_config()
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = AgentConfig {
            address: String::new(),
            ..AgentConfig::default_config()
        };
        let err = Agent::new(config).err().unwrap();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[tokio::test]
    async fn new_builds_default_adapters() {
        let agent = Agent::new(AgentConfig::default_config()).unwrap();
        assert_eq!(agent.state(), LifecycleState::Starting);
        assert_eq!(agent.config().rate_limit, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pipeline_runs_and_stops() {
        let sender = Arc::new(CollectingSender::default());
        let agent = Agent::with_components(
            test_config(),
            Arc::new(StubRuntime),
            Arc::new(StubHost),
            sender.clone(),
        )
        .unwrap();
        let mut states = agent.watch_state();

        agent
            .run_until(tokio::time::sleep(Duration::from_millis(6_500)))
            .await;

        assert_eq!(*states.borrow_and_update(), LifecycleState::Stopped);

        // 리포트 틱 2s, 4s, 6s
        let batches = sender.batches.lock().unwrap();
        assert_eq!(batches.len(), 3);
        for record in batches.iter().flatten() {
            assert!(pulse_core::hash::verify("secret", record));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn single_report_window_sends_one_batch() {
        // 수집 1s, 리포트 2s, 용량 1, 2.5s에 종료
        let config = AgentConfig {
            poll_interval_ms: 1_000,
            report_interval_ms: 2_000,
            rate_limit: 1,
            key: None,
            ..AgentConfig::default_config()
        };
        let sender = Arc::new(CollectingSender::default());
        let agent = Agent::with_components(
            config,
            Arc::new(StubRuntime),
            Arc::new(UnavailableHost),
            sender.clone(),
        )
        .unwrap();

        agent
            .run_until(tokio::time::sleep(Duration::from_millis(2_500)))
            .await;

        let batches = sender.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);

        let poll_counts: Vec<_> = batches[0]
            .iter()
            .filter(|r| r.id == names::POLL_COUNT)
            .collect();
        assert_eq!(poll_counts.len(), 1);
        assert_eq!(poll_counts[0].value, MetricValue::Counter(1));
        assert!(batches[0].iter().all(|r| r.hash.is_none()));
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_send_is_abandoned_on_stop() {
        let agent = Agent::with_components(
            test_config(),
            Arc::new(StubRuntime),
            Arc::new(StubHost),
            Arc::new(HangingSender),
        )
        .unwrap()
        .with_retry_policy(RetryPolicy::new(0, Duration::ZERO, Duration::ZERO))
        .with_drain_timeout(Duration::from_millis(200));
        let states = agent.watch_state();

        let start = tokio::time::Instant::now();
        agent
            .run_until(tokio::time::sleep(Duration::from_millis(2_500)))
            .await;

        assert!(start.elapsed() < Duration::from_secs(3));
        assert_eq!(*states.borrow(), LifecycleState::Stopped);
    }
}
