//! 샘플러 → 리포터 핸드오프 채널.
//!
//! 용량이 제한된 FIFO(tokio mpsc). 가득 차면 발행측이 대기한다(backpressure).
//! 발행과 수신 모두 종료 신호와 경쟁하므로 종료 후에 막히지 않는다.

use pulse_core::error::CoreError;
use pulse_core::models::metrics::Snapshot;
use pulse_core::shutdown::Shutdown;
use tokio::sync::mpsc;

/// 용량 `capacity`의 핸드오프 채널 생성 (최소 1)
pub fn handoff_channel(capacity: usize) -> (SnapshotPublisher, SnapshotReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (SnapshotPublisher { tx }, SnapshotReceiver { rx })
}

/// 발행측 (샘플러마다 복제)
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    tx: mpsc::Sender<Snapshot>,
}

impl SnapshotPublisher {
    /// 스냅샷 발행. 채널이 가득 차면 자리가 나거나 종료될 때까지 대기.
    pub async fn publish(
        &self,
        snapshot: Snapshot,
        shutdown: &mut Shutdown,
    ) -> Result<(), CoreError> {
        if shutdown.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => Err(CoreError::Cancelled),
            result = self.tx.send(snapshot) => result
                .map_err(|_| CoreError::Internal("핸드오프 채널 수신측 닫힘".to_string())),
        }
    }

    /// 대기 없이 들어갈 수 있는 남은 자리
    pub fn remaining_capacity(&self) -> usize {
        self.tx.capacity()
    }
}

/// 수신측 (리포터 전용)
#[derive(Debug)]
pub struct SnapshotReceiver {
    rx: mpsc::Receiver<Snapshot>,
}

impl SnapshotReceiver {
    /// 다음 스냅샷 수신. 비어 있으면 도착하거나 종료될 때까지 대기.
    pub async fn receive(&mut self, shutdown: &mut Shutdown) -> Result<Snapshot, CoreError> {
        if shutdown.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => Err(CoreError::Cancelled),
            received = self.rx.recv() => received
                .ok_or_else(|| CoreError::Internal("핸드오프 채널 발행측 모두 종료".to_string())),
        }
    }

    /// 현재 쌓인 스냅샷 수
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
