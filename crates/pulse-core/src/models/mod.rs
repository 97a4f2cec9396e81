//! PULSE 도메인 모델.
//!
//! 샘플러가 만드는 스냅샷과 수집기로 나가는 전송 레코드를 정의한다.

pub mod metrics;
pub mod wire;
