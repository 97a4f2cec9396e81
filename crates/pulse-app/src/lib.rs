//! # pulse-app
//!
//! PULSE 에이전트 조립 계층.
//! 핸드오프 채널, 샘플러/리포터 태스크, 라이프사이클, 설정 로드, DI.
//!
//! 데이터 흐름: 통계 제공자 → 샘플러 → 핸드오프 채널 → 리포터 → 전송기 → 수집기

pub mod agent;
pub mod config_loader;
pub mod handoff;
pub mod lifecycle;
pub mod reporter;
pub mod sampler;
