//! # pulse-core
//!
//! PULSE 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 스냅샷/전송 레코드 (serde Serialize/Deserialize)
//! - [`ports`] — Hexagonal Architecture 포트 인터페이스 (async_trait)
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 에이전트 설정 구조체 + 검증
//! - [`hash`] — 레코드 무결성 해시 (HMAC-SHA256)
//! - [`shutdown`] — 협조적 종료 신호

pub mod config;
pub mod error;
pub mod hash;
pub mod models;
pub mod ports;
pub mod shutdown;
