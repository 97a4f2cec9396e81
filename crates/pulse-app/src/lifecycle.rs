//! 라이프사이클 관리.
//!
//! 상태 전이(Starting → Running → Draining → Stopped), 시그널 핸들링,
//! 종료 신호 팬아웃.

use pulse_core::error::CoreError;
use pulse_core::shutdown::{Shutdown, ShutdownTrigger};
use std::fmt;
use tokio::sync::watch;
use tracing::info;

/// 에이전트 라이프사이클 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    /// 채널 생성, 태스크 기동
    Starting,
    /// 종료 시그널 대기
    Running,
    /// 종료 신호 발송, 태스크 정리 대기
    Draining,
    /// 종료 완료
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Starting => "starting",
            LifecycleState::Running => "running",
            LifecycleState::Draining => "draining",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// 라이프사이클 관리자
pub struct LifecycleManager {
    shutdown: ShutdownTrigger,
    state_tx: watch::Sender<LifecycleState>,
}

impl LifecycleManager {
    /// 새 라이프사이클 관리자 생성 (Starting 상태)
    pub fn new() -> Self {
        let (state_tx, _rx) = watch::channel(LifecycleState::Starting);
        Self {
            shutdown: ShutdownTrigger::new(),
            state_tx,
        }
    }

    /// 종료 수신기 생성
    pub fn subscribe(&self) -> Shutdown {
        self.shutdown.subscribe()
    }

    /// 현재 상태
    pub fn state(&self) -> LifecycleState {
        *self.state_tx.borrow()
    }

    /// 상태 변화 구독
    pub fn watch_state(&self) -> watch::Receiver<LifecycleState> {
        self.state_tx.subscribe()
    }

    /// 다음 상태로 전이 (역방향 전이는 무시)
    pub fn transition(&self, next: LifecycleState) {
        let changed = self.state_tx.send_if_modified(|state| {
            if next > *state {
                *state = next;
                true
            } else {
                false
            }
        });
        if changed {
            info!("라이프사이클 상태: {next}");
        }
    }

    /// 종료 신호 발송
    pub fn shutdown(&self) {
        if !self.shutdown.is_triggered() {
            info!("종료 신호 발송");
        }
        self.shutdown.trigger();
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

/// 종료 시그널 구독 (SIGINT, SIGTERM, SIGQUIT)
///
/// 핸들러는 [`ShutdownSignals::register`] 시점에 등록된다. 이후 도착한
/// 시그널은 기본 동작(프로세스 종료) 대신 [`ShutdownSignals::recv`]로 전달된다.
pub struct ShutdownSignals {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigquit: tokio::signal::unix::Signal,
    #[cfg(windows)]
    ctrl_c: tokio::signal::windows::CtrlC,
}

impl ShutdownSignals {
    /// 시그널 핸들러 등록
    pub fn register() -> Result<Self, CoreError> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                sigint: signal(SignalKind::interrupt())?,
                sigterm: signal(SignalKind::terminate())?,
                sigquit: signal(SignalKind::quit())?,
            })
        }

        #[cfg(windows)]
        {
            Ok(Self {
                ctrl_c: tokio::signal::windows::ctrl_c()?,
            })
        }
    }

    /// 다음 시그널 대기. 받은 시그널 이름을 반환.
    pub async fn recv(&mut self) -> &'static str {
        #[cfg(unix)]
        let name = tokio::select! {
            _ = self.sigint.recv() => "SIGINT",
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigquit.recv() => "SIGQUIT",
        };

        #[cfg(windows)]
        let name = {
            self.ctrl_c.recv().await;
            "Ctrl+C"
        };

        info!("{name} 수신");
        name
    }
}
