//! 전송 레코드 모델.
//!
//! 측정값 하나당 한 행. 수집기 JSON 형식:
//! `{"id": "...", "type": "gauge"|"counter", "value"?: f64, "delta"?: i64, "hash"?: "..."}`

use serde::{Deserialize, Serialize};

/// 측정값 종류별 값 (게이지 값 또는 카운터 증분)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// 게이지 값
    Gauge(f64),
    /// 카운터 증분
    Counter(i64),
}

impl MetricValue {
    /// 와이어 형식의 `type` 태그
    pub fn kind(&self) -> &'static str {
        match self {
            MetricValue::Gauge(_) => KIND_GAUGE,
            MetricValue::Counter(_) => KIND_COUNTER,
        }
    }
}

const KIND_GAUGE: &str = "gauge";
const KIND_COUNTER: &str = "counter";

/// 전송 레코드 (리포트 시점에만 존재)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RawWireRecord", try_from = "RawWireRecord")]
pub struct WireRecord {
    /// 메트릭 이름
    pub id: String,
    /// 종류별 값
    pub value: MetricValue,
    /// 무결성 해시 (공유 비밀이 설정된 경우)
    pub hash: Option<String>,
}

impl WireRecord {
    /// 게이지 레코드
    pub fn gauge(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            value: MetricValue::Gauge(value),
            hash: None,
        }
    }

    /// 카운터 레코드
    pub fn counter(id: impl Into<String>, delta: i64) -> Self {
        Self {
            id: id.into(),
            value: MetricValue::Counter(delta),
            hash: None,
        }
    }
}

/// 와이어 형식 그대로의 평면 구조
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawWireRecord {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delta: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
}

impl From<WireRecord> for RawWireRecord {
    fn from(record: WireRecord) -> Self {
        let (delta, value) = match record.value {
            MetricValue::Gauge(v) => (None, Some(v)),
            MetricValue::Counter(d) => (Some(d), None),
        };
        Self {
            id: record.id,
            kind: record.value.kind().to_string(),
            delta,
            value,
            hash: record.hash.filter(|h| !h.is_empty()),
        }
    }
}

impl TryFrom<RawWireRecord> for WireRecord {
    type Error = String;

    fn try_from(raw: RawWireRecord) -> Result<Self, Self::Error> {
        let value = match (raw.kind.as_str(), raw.value, raw.delta) {
            (KIND_GAUGE, Some(v), None) => MetricValue::Gauge(v),
            (KIND_COUNTER, None, Some(d)) => MetricValue::Counter(d),
            (KIND_GAUGE, _, _) => {
                return Err(format!("{}: gauge 레코드에는 value만 있어야 함", raw.id))
            }
            (KIND_COUNTER, _, _) => {
                return Err(format!("{}: counter 레코드에는 delta만 있어야 함", raw.id))
            }
            (other, _, _) => return Err(format!("{}: 알 수 없는 메트릭 종류 {other}", raw.id)),
        };
        Ok(Self {
            id: raw.id,
            value,
            hash: raw.hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauge_serializes_value_only() {
        let json = serde_json::to_value(WireRecord::gauge("Alloc", 1.5)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "Alloc", "type": "gauge", "value": 1.5})
        );
    }

    #[test]
    fn counter_serializes_delta_only() {
        let mut record = WireRecord::counter("PollCount", 1);
        record.hash = Some("deadbeef".to_string());
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "PollCount", "type": "counter", "delta": 1, "hash": "deadbeef"})
        );
    }

    #[test]
    fn empty_hash_is_omitted() {
        let mut record = WireRecord::gauge("Alloc", 2.0);
        record.hash = Some(String::new());
        let json = serde_json::to_value(record).unwrap();
        assert!(json.get("hash").is_none());
    }

    #[test]
    fn mismatched_kind_is_rejected() {
        let result: Result<WireRecord, _> =
            serde_json::from_str(r#"{"id":"PollCount","type":"counter","value":1.0}"#);
        assert!(result.is_err());

        let result: Result<WireRecord, _> =
            serde_json::from_str(r#"{"id":"Alloc","type":"histogram","value":1.0}"#);
        assert!(result.is_err());
    }
}
