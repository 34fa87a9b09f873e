//! # 자격증명 모듈
//!
//! Kraken API 자격증명을 보관하고 설정값을 평문 자격증명으로 해석합니다.
//!
//! ## 보안 고려사항
//! - API 키와 시크릿은 `secrecy` 타입으로 감싸 `Debug` 출력에서 가려짐
//! - 시크릿 키는 base64 디코딩을 시도하며, 실패하면 원문 바이트를 그대로 사용
//! - 원격 저장소 참조(`awsssm://`, `awsssme://`)는 `SecretResolver`로 해석

use async_trait::async_trait;
use base64::Engine;
use secrecy::{ExposeSecret, SecretSlice, SecretString};

use crate::error::{DcaError, DcaResult};

/// 원격 파라미터 저장소 참조를 나타내는 공통 접두사
pub const PARAM_STORE_PREFIX: &str = "awsssm";

/// 평문 파라미터 참조 접두사
pub const PARAM_STORE_PLAINTEXT_PREFIX: &str = "awsssm://";

/// 암호화된 파라미터 참조 접두사
pub const PARAM_STORE_ENCRYPTED_PREFIX: &str = "awsssme://";

/// 설정값의 원격 시크릿 참조.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretReference {
    /// 평문 파라미터 (`awsssm://name`)
    Plaintext(String),
    /// 암호화된 파라미터 (`awsssme://name`), 조회 시 복호화 필요
    Encrypted(String),
}

impl SecretReference {
    /// 설정값이 원격 참조 접두사를 갖는지 확인합니다.
    pub fn is_reference(value: &str) -> bool {
        value.starts_with(PARAM_STORE_PREFIX)
    }

    /// 설정값을 원격 참조로 파싱합니다.
    ///
    /// 공통 접두사는 있지만 알려진 형식이 아니면 에러를 반환하고,
    /// 접두사가 없으면 `None`을 반환합니다.
    pub fn parse(value: &str) -> DcaResult<Option<Self>> {
        if let Some(name) = value.strip_prefix(PARAM_STORE_ENCRYPTED_PREFIX) {
            Ok(Some(Self::Encrypted(name.to_string())))
        } else if let Some(name) = value.strip_prefix(PARAM_STORE_PLAINTEXT_PREFIX) {
            Ok(Some(Self::Plaintext(name.to_string())))
        } else if Self::is_reference(value) {
            Err(DcaError::Config(format!(
                "파라미터 저장소 참조 {}의 접두사가 올바르지 않습니다",
                value
            )))
        } else {
            Ok(None)
        }
    }

    /// 접두사를 제외한 파라미터 이름.
    pub fn name(&self) -> &str {
        match self {
            Self::Plaintext(name) | Self::Encrypted(name) => name,
        }
    }

    /// 조회 시 복호화가 필요한지 여부.
    pub fn with_decryption(&self) -> bool {
        matches!(self, Self::Encrypted(_))
    }
}

impl std::fmt::Display for SecretReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plaintext(name) => write!(f, "{}{}", PARAM_STORE_PLAINTEXT_PREFIX, name),
            Self::Encrypted(name) => write!(f, "{}{}", PARAM_STORE_ENCRYPTED_PREFIX, name),
        }
    }
}

/// 원격 시크릿 저장소.
///
/// 실제 저장소 연동은 바이너리 쪽에서 구현합니다.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// 참조가 가리키는 값을 조회합니다.
    async fn resolve(&self, reference: &SecretReference) -> DcaResult<String>;
}

/// 원격 저장소가 구성되지 않은 경우의 기본 구현.
///
/// 모든 참조 조회를 에러로 처리합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSecretStore;

#[async_trait]
impl SecretResolver for NoSecretStore {
    async fn resolve(&self, reference: &SecretReference) -> DcaResult<String> {
        Err(DcaError::SecretResolution {
            reference: reference.to_string(),
            message: "원격 시크릿 저장소가 구성되지 않았습니다".to_string(),
        })
    }
}

/// 값이 원격 참조이면 조회하고, 아니면 그대로 반환합니다.
pub async fn resolve_value(value: &str, resolver: &dyn SecretResolver) -> DcaResult<String> {
    match SecretReference::parse(value)? {
        Some(reference) => resolver.resolve(&reference).await,
        None => Ok(value.to_string()),
    }
}

/// base64 디코딩을 시도하고, 실패하면 원문 바이트를 반환합니다.
///
/// Kraken 시크릿 키는 기본적으로 base64로 발급되지만
/// 이미 디코딩된 값이 들어와도 에러로 취급하지 않습니다.
pub fn decode_secret_best_effort(value: &str) -> Vec<u8> {
    base64::engine::general_purpose::STANDARD
        .decode(value)
        .unwrap_or_else(|_| value.as_bytes().to_vec())
}

/// Kraken API 자격증명.
///
/// 클라이언트 수명 동안 소유되며 변경되지 않습니다.
#[derive(Debug)]
pub struct Credentials {
    api_key: SecretString,
    secret_key: SecretSlice<u8>,
}

impl Credentials {
    /// 이미 디코딩된 시크릿 바이트로 자격증명을 생성합니다.
    pub fn new(api_key: impl Into<String>, secret_key: Vec<u8>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            secret_key: SecretSlice::from(secret_key),
        }
    }

    /// 설정 형식의 시크릿 문자열로 자격증명을 생성합니다.
    ///
    /// 시크릿은 `decode_secret_best_effort` 규칙으로 디코딩됩니다.
    pub fn from_encoded(api_key: impl Into<String>, encoded_secret: &str) -> Self {
        Self::new(api_key, decode_secret_best_effort(encoded_secret))
    }

    /// API 키 (`API-Key` 헤더 값).
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// HMAC 서명 키.
    pub fn secret_key(&self) -> &[u8] {
        self.secret_key.expose_secret()
    }
}
