//! 리포터 태스크.
//!
//! 리포트 주기마다 핸드오프 채널에서 스냅샷 하나를 꺼내 전송 레코드로 바꾸고,
//! 재시도 정책으로 감싼 전송기에 넘긴다. 실패한 리포트는 로그만 남기고 버린다.

use pulse_core::error::CoreError;
use pulse_core::hash;
use pulse_core::models::metrics::Snapshot;
use pulse_core::models::wire::WireRecord;
use pulse_core::ports::sender::MetricsSender;
use pulse_core::shutdown::Shutdown;
use pulse_network::retry::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::handoff::SnapshotReceiver;

/// 스냅샷 → 전송 레코드 (게이지 먼저, 그다음 카운터)
///
/// `key`가 있으면 레코드마다 무결성 해시를 붙인다.
pub fn to_wire_records(snapshot: &Snapshot, key: Option<&str>) -> Vec<WireRecord> {
    let gauges = snapshot
        .gauges
        .iter()
        .map(|(id, value)| WireRecord::gauge(id.as_str(), *value));
    let counters = snapshot
        .counters
        .iter()
        .map(|(id, delta)| WireRecord::counter(id.as_str(), *delta));

    let mut records: Vec<WireRecord> = gauges.chain(counters).collect();

    if let Some(key) = key {
        for record in &mut records {
            if let Err(e) = hash::sign_record(key, record) {
                warn!("{} 해시 계산 실패, 해시 없이 전송: {e}", record.id);
            }
        }
    }
    records
}

/// 리포터
pub struct Reporter {
    receiver: SnapshotReceiver,
    sender: Arc<dyn MetricsSender>,
    retry: RetryPolicy,
    key: Option<String>,
    period: Duration,
}

impl Reporter {
    pub fn new(
        receiver: SnapshotReceiver,
        sender: Arc<dyn MetricsSender>,
        retry: RetryPolicy,
        key: Option<String>,
        period: Duration,
    ) -> Self {
        Self {
            receiver,
            sender,
            retry,
            key: key.filter(|k| !k.is_empty()),
            period,
        }
    }

    /// 스냅샷 하나 전송. 성공하면 보낸 레코드 수를 반환.
    ///
    /// 빈 스냅샷은 전송기를 호출하지 않고 `CoreError::EmptyReport`.
    pub async fn report(&self, snapshot: &Snapshot, shutdown: &Shutdown) -> Result<usize, CoreError> {
        let records = to_wire_records(snapshot, self.key.as_deref());
        if records.is_empty() {
            return Err(CoreError::EmptyReport);
        }

        let sender = &self.sender;
        self.retry
            .run(shutdown, || sender.send_batch(&records))
            .await?;
        Ok(records.len())
    }

    /// 리포터 루프 실행 (종료 신호까지)
    pub async fn run(mut self, mut shutdown: Shutdown) {
        info!("리포터 시작: 주기 {}ms", self.period.as_millis());

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let snapshot = match self.receiver.receive(&mut shutdown).await {
                Ok(snapshot) => snapshot,
                Err(e) if e.is_cancelled() => break,
                Err(e) => {
                    error!("리포터: 스냅샷 수신 실패, 종료: {e}");
                    break;
                }
            };

            match self.report(&snapshot, &shutdown).await {
                Ok(count) => info!("리포트 전송 완료: {count}개 메트릭"),
                Err(e) if e.is_cancelled() => break,
                Err(CoreError::EmptyReport) => debug!("리포트 생략: {}", CoreError::EmptyReport),
                Err(e) => error!("리포트 전송 실패, 이번 주기 폐기: {e}"),
            }
        }

        info!("리포터 종료");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::handoff_channel;
    use async_trait::async_trait;
    use pulse_core::models::metrics::names;
    use pulse_core::models::wire::MetricValue;
    use pulse_core::shutdown::ShutdownTrigger;
    use std::sync::Mutex;

    /// 받은 배치를 기록하고, 처음 `failures`번은 실패하는 전송기
    #[derive(Default)]
    struct RecordingSender {
        batches: Mutex<Vec<Vec<WireRecord>>>,
        calls: Mutex<u32>,
        failures: u32,
    }

    impl RecordingSender {
        fn failing(failures: u32) -> Self {
            Self {
                failures,
                ..Self::default()
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }

        fn batches(&self) -> Vec<Vec<WireRecord>> {
            self.batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MetricsSender for RecordingSender {
        async fn send_batch(&self, records: &[WireRecord]) -> Result<(), CoreError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls <= self.failures {
                return Err(CoreError::UnexpectedStatus { status: 503 });
            }
            self.batches.lock().unwrap().push(records.to_vec());
            Ok(())
        }
    }

    fn sample_snapshot() -> Snapshot {
        let mut s = Snapshot::new();
        s.set_gauge(names::RANDOM_VALUE, 0.5);
        s.set_gauge(names::TOTAL_MEMORY, 2048.0);
        s.set_gauge(names::cpu_utilization(0), 33.0);
        s.set_counter(names::POLL_COUNT, 1);
        s
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(10))
    }

    #[test]
    fn every_measurement_once_gauges_first() {
        let records = to_wire_records(&sample_snapshot(), None);

        assert_eq!(records.len(), 4);
        assert!(records[..3]
            .iter()
            .all(|r| matches!(r.value, MetricValue::Gauge(_))));
        assert_eq!(records[3].id, names::POLL_COUNT);
        assert_eq!(records[3].value, MetricValue::Counter(1));
        assert!(records.iter().all(|r| r.hash.is_none()));

        let mut ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn key_attaches_verifiable_hash() {
        let records = to_wire_records(&sample_snapshot(), Some("secret"));
        assert!(records.iter().all(|r| hash::verify("secret", r)));
        assert!(!records.iter().any(|r| hash::verify("other", r)));

        let again = to_wire_records(&sample_snapshot(), Some("secret"));
        assert_eq!(records[0].hash, again[0].hash);
    }

    #[tokio::test]
    async fn empty_snapshot_never_calls_sender() {
        let sender = Arc::new(RecordingSender::default());
        let (_tx, rx) = handoff_channel(1);
        let reporter = Reporter::new(rx, sender.clone(), fast_retry(), None, Duration::from_secs(1));
        let trigger = ShutdownTrigger::new();

        let err = reporter
            .report(&Snapshot::new(), &trigger.subscribe())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::EmptyReport));
        assert_eq!(sender.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried() {
        let sender = Arc::new(RecordingSender::failing(2));
        let (_tx, rx) = handoff_channel(1);
        let reporter = Reporter::new(rx, sender.clone(), fast_retry(), None, Duration::from_secs(1));
        let trigger = ShutdownTrigger::new();

        let sent = reporter
            .report(&sample_snapshot(), &trigger.subscribe())
            .await
            .unwrap();

        assert_eq!(sent, 4);
        assert_eq!(sender.calls(), 3);
        assert_eq!(sender.batches().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_survives_terminal_failure() {
        // 첫 리포트는 4번 모두 실패, 두 번째 리포트는 성공
        let sender = Arc::new(RecordingSender::failing(4));
        let (tx, rx) = handoff_channel(2);
        let trigger = ShutdownTrigger::new();
        let mut shutdown = trigger.subscribe();

        tx.publish(sample_snapshot(), &mut shutdown).await.unwrap();
        tx.publish(sample_snapshot(), &mut shutdown).await.unwrap();

        let reporter = Reporter::new(
            rx,
            sender.clone(),
            fast_retry(),
            Some("secret".to_string()),
            Duration::from_secs(1),
        );
        let handle = tokio::spawn(reporter.run(trigger.subscribe()));

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(sender.calls(), 5);
        let batches = sender.batches();
        assert_eq!(batches.len(), 1);
        assert!(batches[0].iter().all(|r| hash::verify("secret", r)));

        trigger.trigger();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_reporter_exits_on_shutdown() {
        let sender = Arc::new(RecordingSender::default());
        let (_tx, rx) = handoff_channel(1);
        let trigger = ShutdownTrigger::new();
        let reporter = Reporter::new(rx, sender.clone(), fast_retry(), None, Duration::from_secs(1));
        let handle = tokio::spawn(reporter.run(trigger.subscribe()));

        // 첫 틱 이후 빈 채널에서 수신 대기 중
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        trigger.trigger();

        tokio::time::timeout(Duration::from_millis(100), handle)
            .await
            .expect("수신 대기 중에도 즉시 종료해야 함")
            .unwrap();
        assert_eq!(sender.calls(), 0);
    }
}
