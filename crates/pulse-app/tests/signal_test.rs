//! 시그널 종료 통합 테스트
//!
//! 프로세스에 실제 SIGTERM을 보내 에이전트가 정리 과정을 거쳐 멈추는지 검증합니다.
//! 시그널은 프로세스 전체에 전달되므로 별도 테스트 바이너리로 둡니다.

#![cfg(unix)]

use async_trait::async_trait;
use pulse_app::agent::Agent;
use pulse_app::lifecycle::LifecycleState;
use pulse_core::config::AgentConfig;
use pulse_core::error::CoreError;
use pulse_core::models::metrics::{names, Gauges};
use pulse_core::models::wire::WireRecord;
use pulse_core::ports::monitor::{HostStatsProvider, RuntimeStatsProvider};
use pulse_core::ports::sender::MetricsSender;
use std::sync::Arc;
use std::time::Duration;

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

struct NullSender;

#[async_trait]
impl MetricsSender for NullSender {
    async fn send_batch(&self, _records: &[WireRecord]) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Running 진입 직후 도착한 SIGTERM도 정리 후 종료
#[tokio::test]
async fn sigterm_right_after_running_drains() {
    let config = AgentConfig {
        poll_interval_ms: 50,
        report_interval_ms: 60_000,
        ..AgentConfig::default_config()
    };
    let agent = Agent::with_components(
        config,
        Arc::new(StubRuntime),
        Arc::new(StubHost),
        Arc::new(NullSender),
    )
    .unwrap();
    let mut states = agent.watch_state();

    let (result, ()) = tokio::time::timeout(Duration::from_secs(10), async {
        tokio::join!(agent.run(), async {
            states
                .wait_for(|s| *s == LifecycleState::Running)
                .await
                .unwrap();
            let pid = std::process::id().to_string();
            std::process::Command::new("kill")
                .args(["-TERM", &pid])
                .status()
                .unwrap();
        })
    })
    .await
    .expect("SIGTERM 후 종료되지 않음");

    assert!(result.is_ok());
    assert_eq!(*states.borrow(), LifecycleState::Stopped);
}
