//! # pulse-agent
//!
//! PULSE 메트릭 에이전트 바이너리 진입점.
//! 설정 로드, tracing 초기화, 에이전트 실행.

use anyhow::{Context, Result};
use clap::Parser;
use pulse_app::agent::Agent;
use pulse_app::config_loader::{self, ConfigOverrides};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// PULSE 메트릭 에이전트
///
/// 프로세스/호스트 메트릭을 주기적으로 수집해 원격 수집기로 전송
#[derive(Parser, Debug)]
#[command(name = "pulse-agent")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉터리의 agent.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 수집기 주소 (host:port 또는 URL)
    #[arg(long, short = 'a')]
    address: Option<String>,

    /// 수집 주기 (밀리초)
    #[arg(long, short = 'p')]
    poll_interval: Option<u64>,

    /// 리포트 주기 (밀리초)
    #[arg(long, short = 'r')]
    report_interval: Option<u64>,

    /// 무결성 해시용 공유 비밀
    #[arg(long, short = 'k')]
    key: Option<String>,

    /// 핸드오프 채널 용량
    #[arg(long, short = 'l')]
    rate_limit: Option<u64>,

    /// 전송 타임아웃 (밀리초)
    #[arg(long, short = 't')]
    timeout: Option<u64>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            address: self.address.clone(),
            poll_interval_ms: self.poll_interval,
            report_interval_ms: self.report_interval,
            key: self.key.clone(),
            rate_limit: self.rate_limit,
            timeout_ms: self.timeout,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "pulse_agent={level},pulse_app={level},pulse_core={level},pulse_monitor={level},pulse_network={level}",
        level = args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    info!("PULSE 에이전트 시작 (v{})", env!("CARGO_PKG_VERSION"));

    let config = config_loader::load(&args.overrides()).context("설정 로드 실패")?;
    let agent = Agent::new(config).context("에이전트 초기화 실패")?;

    agent.run().await.context("에이전트 실행 실패")?;

    info!("PULSE 에이전트 종료");
    Ok(())
}
