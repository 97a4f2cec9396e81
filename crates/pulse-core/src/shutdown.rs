//! 협조적 종료 신호.
//!
//! `watch` 채널 하나를 모든 태스크가 구독한다. 신호는 한 번 켜지면 꺼지지 않으며,
//! 구독 시점과 무관하게 모든 수신자가 같은 상태를 본다.

use tokio::sync::watch;

/// 종료 신호 발신측 (라이프사이클 관리자가 소유)
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// 새 수신자 생성
    pub fn subscribe(&self) -> Shutdown {
        Shutdown {
            rx: self.tx.subscribe(),
        }
    }

    /// 종료 신호 발송 (멱등)
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ShutdownTrigger {
    fn default() -> Self {
        Self::new()
    }
}

/// 종료 신호 수신측
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// 이미 종료 신호가 켜졌는지 확인
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// 종료 신호가 켜질 때까지 대기
    ///
    /// 발신측이 사라져도 종료로 간주한다.
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}
