//! 설정 로드.
//!
//! 우선순위 (뒤가 앞을 덮어씀):
//! 1. TOML 설정 파일 (없으면 건너뜀)
//! 2. `PULSE_` 접두사 환경변수 (`PULSE_ADDRESS`, `PULSE_RETRY__MAX_RETRIES` 등)
//! 3. CLI 인자
//!
//! 필수 항목에는 기본값이 없다. 어느 소스에도 없으면 검증에서 거부된다.
//! `retry` 섹션만 기본값을 가진다.

use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use pulse_core::config::AgentConfig;
use pulse_core::error::CoreError;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// 설정 파일 이름
pub const CONFIG_FILE_NAME: &str = "agent.toml";

/// 환경변수 접두사
pub const ENV_PREFIX: &str = "PULSE";

/// CLI에서 넘어온 덮어쓰기 값
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// 설정 파일 경로 (없으면 플랫폼 기본 경로)
    pub config_path: Option<PathBuf>,
    pub address: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub report_interval_ms: Option<u64>,
    pub key: Option<String>,
    pub rate_limit: Option<u64>,
    pub timeout_ms: Option<u64>,
}

/// 플랫폼별 기본 설정 파일 경로
///
/// - macOS: `~/Library/Application Support/com.pulse.agent/agent.toml`
/// - Linux: `~/.config/agent/agent.toml` (XDG)
/// - Windows: `%APPDATA%\pulse\agent\config\agent.toml`
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "pulse", "agent").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// 프로세스 환경변수로 설정 로드
pub fn load(overrides: &ConfigOverrides) -> Result<AgentConfig, CoreError> {
    load_with_env(overrides, None)
}

/// 환경변수 맵을 지정해 설정 로드 (`None`이면 프로세스 환경)
pub fn load_with_env(
    overrides: &ConfigOverrides,
    env: Option<HashMap<String, String>>,
) -> Result<AgentConfig, CoreError> {
    let path = overrides.config_path.clone().or_else(default_config_path);

    let mut builder = Config::builder();

    if let Some(path) = path.as_deref() {
        debug!("설정 파일: {}", path.display());
        // 명시한 경로는 반드시 있어야 하고, 기본 경로는 없어도 된다
        builder = builder.add_source(
            File::from(path)
                .format(FileFormat::Toml)
                .required(overrides.config_path.is_some()),
        );
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env),
    );

    let config: AgentConfig = builder
        .set_override_option("address", overrides.address.clone())
        .and_then(|b| b.set_override_option("poll_interval_ms", overrides.poll_interval_ms))
        .and_then(|b| b.set_override_option("report_interval_ms", overrides.report_interval_ms))
        .and_then(|b| b.set_override_option("key", overrides.key.clone()))
        .and_then(|b| b.set_override_option("rate_limit", overrides.rate_limit))
        .and_then(|b| b.set_override_option("timeout_ms", overrides.timeout_ms))
        .and_then(|b| b.build())
        .and_then(|c| c.try_deserialize())
        .map_err(config_error)?;

    config.validate()?;
    Ok(config)
}

fn config_error(e: config::ConfigError) -> CoreError {
    CoreError::Config(e.to_string())
}
