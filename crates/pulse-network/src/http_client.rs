//! HTTP 메트릭 전송 클라이언트.
//!
//! `MetricsSender` 포트 구현. 배치 전송(`POST /updates/`, JSON 배열)과
//! 단건 전송(`POST /update/`, gzip 압축 JSON 객체)을 제공한다.
//! 이 클라이언트는 재시도하지 않는다.

use async_trait::async_trait;
use pulse_core::error::CoreError;
use pulse_core::models::wire::WireRecord;
use pulse_core::ports::compressor::Compressor;
use pulse_core::ports::sender::MetricsSender;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::compression::GzipCompressor;

/// 배치 엔드포인트 경로
const BATCH_PATH: &str = "/updates/";

/// 단건 엔드포인트 경로
const SINGLE_PATH: &str = "/update/";

const APPLICATION_JSON: &str = "application/json";

/// `host:port` 또는 전체 URL에서 기본 URL 생성
fn base_url(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}

/// reqwest 기반 메트릭 전송기 — `MetricsSender` 포트 구현
pub struct HttpMetricsSender {
    client: reqwest::Client,
    base_url: String,
    compressor: Arc<dyn Compressor>,
}

impl HttpMetricsSender {
    /// 새 전송기 생성 (요청 타임아웃 = 전송 타임아웃)
    pub fn new(address: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url(address),
            compressor: Arc::new(GzipCompressor::new()),
        })
    }

    /// 단건 전송 압축기 교체
    pub fn with_compressor(mut self, compressor: Arc<dyn Compressor>) -> Self {
        self.compressor = compressor;
        self
    }

    /// 수집기 기본 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 레코드 하나를 압축된 단건 본문으로 인코딩
    pub fn encode_single(&self, record: &WireRecord) -> Result<Vec<u8>, CoreError> {
        let json = serde_json::to_vec(record)?;
        self.compressor.compress(&json)
    }

    /// 단건 전송 (`POST /update/`, gzip 본문)
    pub async fn send_single(&self, record: &WireRecord) -> Result<(), CoreError> {
        let body = self.encode_single(record)?;
        let url = format!("{}{}", self.base_url, SINGLE_PATH);
        debug!("단건 전송: {} ({} bytes)", record.id, body.len());

        let resp = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(CONTENT_ENCODING, self.compressor.encoding())
            .header(ACCEPT_ENCODING, "gzip")
            .body(body)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("단건 전송 요청 실패: {e}")))?;

        check_status(resp.status())
    }
}

/// 200 이외의 상태 코드는 에러
fn check_status(status: StatusCode) -> Result<(), CoreError> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(CoreError::UnexpectedStatus {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl MetricsSender for HttpMetricsSender {
    async fn send_batch(&self, records: &[WireRecord]) -> Result<(), CoreError> {
        let body = serde_json::to_vec(records)?;
        let url = format!("{}{}", self.base_url, BATCH_PATH);
        debug!("배치 전송: {}개 레코드 → {url}", records.len());

        let resp = self
            .client
            .post(&url)
            .header(ACCEPT, APPLICATION_JSON)
            .header(ACCEPT_ENCODING, "gzip")
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .body(body)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("배치 전송 요청 실패: {e}")))?;

        check_status(resp.status())
    }
}
