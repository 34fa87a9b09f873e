//! AWS Systems Manager Parameter Store 기반 시크릿 조회.
//!
//! `awsssm://name`은 평문으로, `awsssme://name`은 복호화하여 조회합니다.
//! AWS 설정 로드와 조회를 합쳐 한 번의 제한 시간 안에 끝내야 합니다.

use async_trait::async_trait;
use aws_sdk_ssm::error::DisplayErrorContext;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

use dca_core::{DcaError, DcaResult, SecretReference, SecretResolver};

/// 파라미터 조회 제한 시간
pub const PARAMETER_TIMEOUT: Duration = Duration::from_secs(5);

/// `GetParameter` 요청 입력.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterQuery {
    /// 접두사를 제외한 파라미터 이름
    pub name: String,
    /// SecureString 복호화 여부
    pub with_decryption: bool,
}

impl From<&SecretReference> for ParameterQuery {
    fn from(reference: &SecretReference) -> Self {
        Self {
            name: reference.name().to_string(),
            with_decryption: reference.with_decryption(),
        }
    }
}

/// Parameter Store 시크릿 조회기.
///
/// AWS 클라이언트는 첫 참조 조회 시점에 한 번만 생성합니다.
pub struct ParameterStore {
    client: OnceCell<aws_sdk_ssm::Client>,
    timeout: Duration,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterStore {
    /// 기본 제한 시간(5초)으로 생성.
    pub fn new() -> Self {
        Self {
            client: OnceCell::new(),
            timeout: PARAMETER_TIMEOUT,
        }
    }

    /// 제한 시간 변경.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn client(&self) -> &aws_sdk_ssm::Client {
        self.client
            .get_or_init(|| async {
                let sdk_config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                aws_sdk_ssm::Client::new(&sdk_config)
            })
            .await
    }

    async fn get_parameter(&self, query: &ParameterQuery) -> Result<String, String> {
        let output = self
            .client()
            .await
            .get_parameter()
            .name(query.name.as_str())
            .with_decryption(query.with_decryption)
            .send()
            .await
            .map_err(|e| {
                format!(
                    "failed to retrieve parameter from ssm: {}",
                    DisplayErrorContext(&e)
                )
            })?;

        output
            .parameter()
            .and_then(|parameter| parameter.value())
            .map(str::to_string)
            .ok_or_else(|| "parameter has no value".to_string())
    }
}

#[async_trait]
impl SecretResolver for ParameterStore {
    async fn resolve(&self, reference: &SecretReference) -> DcaResult<String> {
        let query = ParameterQuery::from(reference);
        debug!(
            name = %query.name,
            with_decryption = query.with_decryption,
            "fetching parameter"
        );

        resolve_within(reference, self.timeout, self.get_parameter(&query)).await
    }
}

/// 조회 결과와 제한 시간 초과를 `DcaError::SecretResolution`으로 변환합니다.
async fn resolve_within<F>(
    reference: &SecretReference,
    timeout: Duration,
    fetch: F,
) -> DcaResult<String>
where
    F: Future<Output = Result<String, String>>,
{
    match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(message)) => Err(DcaError::SecretResolution {
            reference: reference.to_string(),
            message,
        }),
        Err(_) => Err(DcaError::SecretResolution {
            reference: reference.to_string(),
            message: format!("timed out after {:?}", timeout),
        }),
    }
}
