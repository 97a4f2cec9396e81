//! # pulse-network
//!
//! HTTP 전송 어댑터.
//! 수집기의 배치(`/updates/`) 및 단건(`/update/`) 엔드포인트로 메트릭을 보내며,
//! gzip 압축과 선형 backoff 재시도를 제공한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use pulse_network::http_client::HttpMetricsSender;
//! use pulse_network::retry::RetryPolicy;
//!
//! let sender = HttpMetricsSender::new("localhost:8080", Duration::from_secs(5))?;
//! RetryPolicy::default()
//!     .run(&shutdown, || sender.send_batch(&records))
//!     .await?;
//! ```

pub mod compression;
pub mod http_client;
pub mod retry;
