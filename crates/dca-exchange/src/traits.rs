//! 매수 실행 trait 정의.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use dca_core::{ExecutionResult, PurchaseRequest};

use crate::ExchangeError;

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 정액 매수를 실행하는 거래소 인터페이스.
#[async_trait]
pub trait DcaProvider: Send + Sync {
    /// 거래소 이름 반환.
    fn name(&self) -> &str;

    /// 매수 수량 계산만 수행 (주문 없음).
    async fn preview_volume(
        &self,
        request: &PurchaseRequest,
        cancel: &CancellationToken,
    ) -> ExchangeResult<f64>;

    /// 시세 조회 → 수량 계산 → 시장가 매수 → (주문 조회) 를 한 번에 실행.
    ///
    /// 어느 단계든 실패하면 이전 단계를 재시도하지 않고 즉시 중단합니다.
    /// `cancel`이 취소되면 진행 중인 요청을 버리고 `ExchangeError::Cancelled`를 반환합니다.
    async fn place_order(
        &self,
        request: &PurchaseRequest,
        cancel: &CancellationToken,
    ) -> ExchangeResult<ExecutionResult>;
}
