//! DCA 봇 CLI.
//!
//! 설정된 금액만큼 Kraken에서 BTC를 시장가로 매수합니다.
//! 스케줄러(cron 등)가 주기적으로 실행하는 것을 전제로 합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 설정 파일로 매수 실행
//! dca --config config/dca.toml
//!
//! # 환경 변수로 설정 위치 지정, 수량만 확인
//! CONFIG_FILE=config/dca.json dca --dry-run
//!
//! # 사람이 읽기 쉬운 로그 형식
//! dca -c config/dca.toml --log-format pretty
//! ```

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use dca_cli::{run_buy, shutdown_signal, ParameterStore};
use dca_core::{build_info, init_logging, AppConfig, LogConfig, LogFormat};
use dca_exchange::{KrakenClient, KrakenConfig, KrakenProvider};

#[derive(Parser)]
#[command(name = "dca")]
#[command(about = "DCA bot - Kraken 정액 분할 매수", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 또는 원격 참조 (awsssm://, awsssme://)
    #[arg(short, long, env = "CONFIG_FILE")]
    config: Option<String>,

    /// 로그 형식 (json, pretty, compact). 설정 파일 값보다 우선
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// 드라이런 모드 (수량만 계산, 주문 미실행)
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (없으면 무시)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let build = build_info!();

    // awsssm:// 참조가 있을 때만 AWS 클라이언트를 생성
    let secrets = ParameterStore::new();
    let source = cli.config.unwrap_or_default();

    let config = AppConfig::load_from(&source, &secrets)
        .await
        .context("failed to load configuration")?;
    let resolved = config
        .resolve(&secrets)
        .await
        .context("invalid configuration")?;

    if resolved.logging.enabled {
        let mut log_config = LogConfig::from_settings(&resolved.logging);
        if let Some(format) = cli.log_format {
            log_config = log_config.with_format(format);
        }
        init_logging(log_config, &build)
            .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;
    }

    info!(
        version = %build.version,
        amount_in_cents = resolved.order.amount_in_cents,
        dry_run = cli.dry_run,
        "Starting DCA run"
    );

    let client = KrakenClient::new(
        KrakenConfig::from_settings(&resolved.kraken),
        resolved.credentials,
    )?;
    let provider = KrakenProvider::from_client(client)
        .with_query_order_info(resolved.kraken.query_order_info);

    let shutdown_token = CancellationToken::new();
    let signal_task = tokio::spawn(shutdown_signal(shutdown_token.clone()));

    let outcome = run_buy(&provider, &resolved.order, cli.dry_run, &shutdown_token).await;

    // 시그널 대기 태스크 정리
    shutdown_token.cancel();
    let _ = signal_task.await;

    match outcome {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, steps = ?e.contexts(), "DCA run failed");
            Err(e.into())
        }
    }
}
