//! 주식 분석기 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 종목명으로 전체 분석 (지표, 뉴스, AI 리포트)
//! analyzer analyze 삼성전자 --purchase-price 65000
//!
//! # 미국 종목, 6개월 기간, JSON 출력
//! analyzer analyze AAPL --period 6mo --json
//!
//! # 티커 해석만
//! analyzer resolve 카카오
//!
//! # 뉴스만
//! analyzer news 005930
//!
//! # 시세만 (최근 10개 바)
//! analyzer quote 005930 --tail 10
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tracing::info;

use analyzer_analytics::AnalysisPipeline;
use analyzer_core::{init_logging, AnalyzerConfig, LogConfig};

mod commands;

use commands::analyze::{run_analyze, AnalyzeArgs};
use commands::news::run_news;
use commands::quote::run_quote;
use commands::resolve::run_resolve;

/// 설정 파일에 키가 없을 때 읽는 환경 변수.
const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Parser)]
#[command(name = "analyzer")]
#[command(about = "주식 분석기 - 시세 정합화, 기술적 지표, 뉴스, AI 리포트", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (없으면 기본값 + 환경 변수)
    #[arg(short, long, global = true, default_value = "config/analyzer.toml")]
    config: String,

    /// Gemini API 키 (기본: 설정의 llm.api_key 또는 GEMINI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 전체 분석 실행 (해석 → 시세 → 지표 → 뉴스 → AI 리포트)
    Analyze {
        /// 종목명, 종목코드 또는 티커 (예: 삼성전자, 005930, AAPL)
        input: String,

        /// 조회 기간 (1mo, 3mo, 6mo, 1y, 2y, 5y, max 등)
        #[arg(short, long)]
        period: Option<String>,

        /// 평균 매수 가격 (보유 중일 때)
        #[arg(long)]
        purchase_price: Option<f64>,

        /// 결과를 JSON으로 출력
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// 입력을 티커로 해석
    Resolve {
        /// 종목명, 종목코드 또는 티커
        input: String,
    },

    /// 종목 뉴스 조회
    News {
        /// 종목명, 종목코드 또는 티커
        input: String,
    },

    /// 정합화된 시세 조회
    Quote {
        /// 종목명, 종목코드 또는 티커
        input: String,

        /// 조회 기간
        #[arg(short, long)]
        period: Option<String>,

        /// 출력할 최근 바 개수
        #[arg(long, default_value = "5")]
        tail: usize,
    },
}

/// API 키 우선순위: 명령행 → 설정 → 환경 변수.
fn resolve_api_key(cli_key: Option<String>, config: &AnalyzerConfig) -> Option<SecretString> {
    cli_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .map(|k| SecretString::new(k.into()))
        .or_else(|| config.llm.api_key())
        .or_else(|| {
            std::env::var(API_KEY_ENV)
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .map(|k| SecretString::new(k.into()))
        })
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일은 없어도 됨
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AnalyzerConfig::load(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config))?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    let api_key = resolve_api_key(cli.api_key, &config);
    info!(
        config = %cli.config,
        ai_enabled = api_key.is_some(),
        language = %config.llm.report_language,
        "analyzer 시작"
    );

    let pipeline = AnalysisPipeline::from_config(&config).context("파이프라인 구성 실패")?;

    match cli.command {
        Commands::Analyze {
            input,
            period,
            purchase_price,
            json,
        } => {
            let args = AnalyzeArgs {
                input,
                period,
                purchase_price,
                json,
            };
            run_analyze(&pipeline, args, api_key).await?;
        }

        Commands::Resolve { input } => {
            run_resolve(&pipeline, &input, api_key.as_ref()).await;
        }

        Commands::News { input } => {
            run_news(&pipeline, &input, api_key.as_ref()).await;
        }

        Commands::Quote {
            input,
            period,
            tail,
        } => {
            run_quote(&pipeline, &input, period.as_deref(), tail, api_key.as_ref()).await?;
        }
    }

    Ok(())
}
