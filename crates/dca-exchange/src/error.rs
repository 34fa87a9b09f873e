//! 거래소 에러 타입.
//!
//! 에러는 네 종류로 나뉩니다:
//! - 전송 에러: `Network`, `Timeout`, `Http`, `Cancelled`
//! - 디코딩 에러: `ParseError`, `InvalidNumber`, `OrderNotFound`
//! - 거래소 거부: `Provider(ProviderError)`
//! - 검증 에러: `InvalidQuantity`
//!
//! 각 단계는 `Context`로 단계 이름을 덧붙여 전달하며,
//! `root()`로 원인 에러의 종류를 언제든 확인할 수 있습니다.

use thiserror::Error;

/// 거래소가 반환한 에러 메시지의 분류.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// 최소 주문 수량 미달
    #[error("order is too small")]
    OrderTooSmall,

    /// 잘못된 API 자격증명
    #[error("invalid auth")]
    InvalidAuth,

    /// 분류되지 않은 거래소 에러 (원문 메시지)
    #[error("{0}")]
    Opaque(String),
}

/// 거래소 에러 문자열을 도메인 에러로 분류합니다.
///
/// 거래소 문구가 바뀌면 이 테이블만 수정합니다.
pub fn classify(message: &str) -> ProviderError {
    match message {
        "EGeneral:Invalid arguments:volume minimum not met" => ProviderError::OrderTooSmall,
        "EAPI:Invalid key" => ProviderError::InvalidAuth,
        other => ProviderError::Opaque(other.to_string()),
    }
}

/// 거래소 관련 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 성공이 아닌 HTTP 상태와 해석할 수 없는 본문
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// 호출자가 작업을 취소함
    #[error("Request cancelled")]
    Cancelled,

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 숫자 필드 변환 실패
    #[error("failed to parse {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// 응답에 요청한 주문이 없음
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// 거래소가 요청을 거부함
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// 유효하지 않은 수량/금액
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// 실패한 단계 이름이 붙은 에러
    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        #[source]
        source: Box<ExchangeError>,
    },
}

impl ExchangeError {
    /// 거래소 에러 메시지에서 분류된 에러를 생성합니다.
    pub fn from_provider_message(message: &str) -> Self {
        ExchangeError::Provider(classify(message))
    }

    /// 단계 이름을 덧붙입니다.
    pub fn context(self, context: &'static str) -> Self {
        ExchangeError::Context {
            context,
            source: Box::new(self),
        }
    }

    /// 모든 `Context`를 벗겨낸 원인 에러.
    pub fn root(&self) -> &ExchangeError {
        let mut current = self;
        while let ExchangeError::Context { source, .. } = current {
            current = source.as_ref();
        }
        current
    }

    /// 원인이 거래소 거부라면 그 분류를 반환합니다.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self.root() {
            ExchangeError::Provider(e) => Some(e),
            _ => None,
        }
    }

    /// 최소 주문 수량 미달로 거부되었는지 확인.
    pub fn is_order_too_small(&self) -> bool {
        matches!(self.provider_error(), Some(ProviderError::OrderTooSmall))
    }

    /// 인증 에러인지 확인.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.provider_error(), Some(ProviderError::InvalidAuth))
    }

    /// 전송 계층 에러(네트워크, 타임아웃, 취소)인지 확인.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.root(),
            ExchangeError::Network(_)
                | ExchangeError::Timeout(_)
                | ExchangeError::Http { .. }
                | ExchangeError::Cancelled
        )
    }

    /// 응답 디코딩 에러인지 확인.
    pub fn is_decode(&self) -> bool {
        matches!(
            self.root(),
            ExchangeError::ParseError(_)
                | ExchangeError::InvalidNumber { .. }
                | ExchangeError::OrderNotFound(_)
        )
    }

    /// 실패한 단계 이름 목록 (바깥쪽부터).
    pub fn contexts(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        let mut current = self;
        while let ExchangeError::Context { context, source } = current {
            labels.push(*context);
            current = source.as_ref();
        }
        labels
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else if err.is_decode() {
            ExchangeError::ParseError(err.to_string())
        } else {
            ExchangeError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}

/// 거래소 작업 결과에 단계 이름을 덧붙이는 확장 trait.
pub trait ExchangeResultExt<T> {
    fn context(self, context: &'static str) -> Result<T, ExchangeError>;
}

impl<T> ExchangeResultExt<T> for Result<T, ExchangeError> {
    fn context(self, context: &'static str) -> Result<T, ExchangeError> {
        self.map_err(|e| e.context(context))
    }
}
