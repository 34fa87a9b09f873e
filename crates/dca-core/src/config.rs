//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 로드/검증합니다.
//! 설정 파일(JSON, TOML 등 확장자로 판별)에 `DCA__` 접두사 환경 변수를 덮어씁니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::credentials::{self, Credentials, SecretReference, SecretResolver};
use crate::domain::PurchaseRequest;
use crate::error::{DcaError, DcaResult};

/// 애플리케이션 설정 (파일에서 읽은 원본 값).
///
/// 기존 배포의 camelCase 키(`krakenApiKey`, `enableLogging` 등)도 받습니다.
/// `config` 크레이트가 키를 소문자로 바꾸므로 소문자 별칭도 함께 둡니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Kraken API 키 (평문 또는 원격 참조)
    #[serde(default, alias = "krakenApiKey", alias = "krakenapikey")]
    pub kraken_api_key: String,
    /// Kraken 시크릿 키 (base64 평문 또는 원격 참조)
    #[serde(default, alias = "krakenPrivateKey", alias = "krakenprivatekey")]
    pub kraken_private_key: String,
    /// 매수 금액 (센트 단위)
    #[serde(default, alias = "orderAmountInCents", alias = "orderamountincents")]
    pub order_amount_in_cents: i64,
    /// 최상위 로깅 스위치. 지정되면 `logging.enabled`보다 우선
    #[serde(
        default,
        alias = "enableLogging",
        alias = "enablelogging",
        skip_serializing_if = "Option::is_none"
    )]
    pub enable_logging: Option<bool>,
    /// Kraken 연결 설정
    #[serde(default)]
    pub kraken: KrakenSettings,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Kraken 연결 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KrakenSettings {
    /// REST API 기본 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 연결 타임아웃 (DNS, TCP, TLS 핸드셰이크 포함, 초)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 요청 전체 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// 주문 후 정산 정보 조회 여부
    #[serde(default = "default_query_order_info")]
    pub query_order_info: bool,
}

fn default_base_url() -> String {
    "https://api.kraken.com".to_string()
}
fn default_connect_timeout() -> u64 {
    5
}
fn default_request_timeout() -> u64 {
    10
}
fn default_query_order_info() -> bool {
    true
}

impl Default for KrakenSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            query_order_info: default_query_order_info(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로깅 활성화 여부
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,
    /// 로그 레벨
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// 파일명과 줄 번호 출력
    #[serde(default)]
    pub with_file: bool,
    /// 대상(모듈 경로) 출력
    #[serde(default = "default_log_with_target")]
    pub with_target: bool,
}

fn default_logging_enabled() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_log_with_target() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            level: default_log_level(),
            format: default_log_format(),
            with_file: false,
            with_target: default_log_with_target(),
        }
    }
}

/// 검증과 시크릿 해석을 마친 실행 설정.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub credentials: Credentials,
    pub order: PurchaseRequest,
    pub kraken: KrakenSettings,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> DcaResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(Self::env_source());

        Ok(builder.build()?.try_deserialize()?)
    }

    /// JSON 문자열에서 설정을 로드합니다. 환경 변수 덮어쓰기도 적용됩니다.
    pub fn from_json_str(json: &str) -> DcaResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(json, config::FileFormat::Json))
            .add_source(Self::env_source());

        Ok(builder.build()?.try_deserialize()?)
    }

    /// 설정 위치(파일 경로 또는 원격 참조)에서 설정을 로드합니다.
    ///
    /// 원격 참조인 경우 저장된 값을 JSON 설정 문서로 취급합니다.
    pub async fn load_from(source: &str, resolver: &dyn SecretResolver) -> DcaResult<Self> {
        if source.is_empty() {
            return Err(DcaError::Config(
                "CONFIG_FILE 환경 변수 또는 --config 플래그로 설정 파일 경로를 지정해야 합니다"
                    .to_string(),
            ));
        }

        match SecretReference::parse(source)? {
            Some(reference) => {
                let document = resolver.resolve(&reference).await?;
                Self::from_json_str(&document)
            }
            None => Self::load(source),
        }
    }

    /// 최상위 `enable_logging`을 반영한 로깅 활성화 여부.
    pub fn logging_enabled(&self) -> bool {
        self.enable_logging.unwrap_or(self.logging.enabled)
    }

    fn env_source() -> config::Environment {
        config::Environment::with_prefix("DCA")
            .separator("__")
            .try_parsing(true)
    }

    /// 필수 값과 범위를 검증합니다.
    pub fn validate(&self) -> DcaResult<()> {
        PurchaseRequest {
            amount_in_cents: self.order_amount_in_cents,
        }
        .validate()?;

        if self.kraken_api_key.is_empty() {
            return Err(DcaError::MissingField("kraken_api_key"));
        }
        if self.kraken_private_key.is_empty() {
            return Err(DcaError::MissingField("kraken_private_key"));
        }
        if self.kraken.request_timeout_secs == 0 || self.kraken.connect_timeout_secs == 0 {
            return Err(DcaError::InvalidInput(
                "kraken 타임아웃은 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(())
    }

    /// 검증 후 원격 참조를 해석하고 시크릿 키를 디코딩합니다.
    pub async fn resolve(self, resolver: &dyn SecretResolver) -> DcaResult<ResolvedConfig> {
        self.validate()?;

        let api_key = credentials::resolve_value(&self.kraken_api_key, resolver).await?;
        let private_key = credentials::resolve_value(&self.kraken_private_key, resolver).await?;

        let mut logging = self.logging;
        logging.enabled = self.enable_logging.unwrap_or(logging.enabled);

        Ok(ResolvedConfig {
            credentials: Credentials::from_encoded(api_key, &private_key),
            order: PurchaseRequest::new(self.order_amount_in_cents)?,
            kraken: self.kraken,
            logging,
        })
    }
}
