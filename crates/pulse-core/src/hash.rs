//! 레코드 무결성 해시.
//!
//! hex(HMAC-SHA256(secret, payload)), payload 형식:
//! - gauge: `"{id}:gauge:{value}"` (f64 최단 왕복 표기, 손실 없음)
//! - counter: `"{id}:counter:{delta}"`
//!
//! 수신 측은 같은 비밀로 같은 payload를 만들어 검증한다.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CoreError;
use crate::models::wire::{MetricValue, WireRecord};

type HmacSha256 = Hmac<Sha256>;

/// 서명 대상 문자열
pub fn payload(id: &str, value: &MetricValue) -> String {
    match value {
        MetricValue::Gauge(v) => format!("{id}:gauge:{v}"),
        MetricValue::Counter(d) => format!("{id}:counter:{d}"),
    }
}

fn mac_for(key: &str, id: &str, value: &MetricValue) -> Result<HmacSha256, CoreError> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| CoreError::Internal(format!("HMAC 키 초기화 실패: {e}")))?;
    mac.update(payload(id, value).as_bytes());
    Ok(mac)
}

/// 측정값 하나의 해시 계산
pub fn sign(key: &str, id: &str, value: &MetricValue) -> Result<String, CoreError> {
    let mac = mac_for(key, id, value)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// 레코드에 해시 부착
pub fn sign_record(key: &str, record: &mut WireRecord) -> Result<(), CoreError> {
    record.hash = Some(sign(key, &record.id, &record.value)?);
    Ok(())
}

/// 레코드 해시 검증 (상수 시간 비교)
///
/// 해시가 없거나 hex가 아니면 false.
pub fn verify(key: &str, record: &WireRecord) -> bool {
    let Some(expected) = record.hash.as_deref() else {
        return false;
    };
    let Ok(expected) = hex::decode(expected) else {
        return false;
    };
    match mac_for(key, &record.id, &record.value) {
        Ok(mac) => mac.verify_slice(&expected).is_ok(),
        Err(_) => false,
    }
}
