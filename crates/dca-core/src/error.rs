//! DCA 봇의 핵심 에러 타입.
//!
//! 설정 로드, 자격증명 해석, 입력 검증 단계에서 발생하는 에러를 정의합니다.
//! 거래소 통신 에러는 `dca-exchange` 크레이트의 `ExchangeError`가 담당합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum DcaError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필수 설정 누락
    #[error("필수 설정 누락: {0}")]
    MissingField(&'static str),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 원격 시크릿 조회 실패
    #[error("시크릿 조회 실패 ({reference}): {message}")]
    SecretResolution { reference: String, message: String },
}

/// 핵심 작업을 위한 Result 타입.
pub type DcaResult<T> = Result<T, DcaError>;

impl DcaError {
    /// 설정 파일/값 문제로 인한 에러인지 확인합니다.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DcaError::Config(_) | DcaError::MissingField(_) | DcaError::InvalidInput(_)
        )
    }
}

impl From<config::ConfigError> for DcaError {
    fn from(err: config::ConfigError) -> Self {
        DcaError::Config(err.to_string())
    }
}
