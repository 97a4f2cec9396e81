//! # pulse-monitor
//!
//! 통계 제공자 어댑터.
//! 에이전트 자신의 프로세스/tokio 런타임 통계와 호스트 CPU/메모리 통계를
//! sysinfo 기반으로 수집한다.

pub mod host;
pub mod runtime;
