//! 매수 주문 타입.
//!
//! 이 모듈은 한 번의 정액 매수(`place_order`) 호출 동안 생성되고 소비되는 타입을 정의합니다:
//! - `PurchaseRequest` - 매수 요청 (센트 단위 금액)
//! - `PlacementResult` - 거래소가 접수한 주문 식별 정보
//! - `OrderInfo` - 체결된 주문의 정산 정보
//! - `ExecutionResult` - 호출자에게 반환되는 최종 결과
//! - `OrderStage` - 주문 처리 단계

use serde::{Deserialize, Serialize};

use crate::error::{DcaError, DcaResult};

/// 매수 요청.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    /// 매수 금액 (센트 단위, 0보다 커야 함)
    pub amount_in_cents: i64,
}

impl PurchaseRequest {
    /// 검증된 매수 요청을 생성합니다.
    pub fn new(amount_in_cents: i64) -> DcaResult<Self> {
        let request = Self { amount_in_cents };
        request.validate()?;
        Ok(request)
    }

    /// 금액이 양수인지 검증합니다.
    pub fn validate(&self) -> DcaResult<()> {
        if self.amount_in_cents <= 0 {
            return Err(DcaError::InvalidInput(format!(
                "order_amount_in_cents는 0보다 커야 합니다: {}",
                self.amount_in_cents
            )));
        }
        Ok(())
    }
}

/// 거래소가 접수한 주문.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementResult {
    /// 거래소 트랜잭션 ID
    pub transaction_id: String,
    /// 거래소가 반환한 주문 설명 (예: "buy 0.00200000 XBTUSD @ market")
    pub description: String,
}

/// 체결된 주문의 정산 정보.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderInfo {
    /// 평균 체결 가격
    pub price: f64,
    /// 총 체결 금액
    pub cost: f64,
    /// 수수료
    pub fee: f64,
    /// 실제 매수 수량
    pub volume_purchased: f64,
}

/// `place_order` 호출의 최종 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// 요청한 매수 수량
    pub volume_requested: f64,
    /// 주문 접수 결과
    pub placement: PlacementResult,
    /// 정산 정보 (조회를 끈 경우 `None`)
    pub order_info: Option<OrderInfo>,
}

/// 주문 처리 단계.
///
/// `Requested → VolumeComputed → Submitted → (InfoQueried) → Completed`
/// 순서로만 진행되며, 어느 단계에서든 실패하면 `Failed`로 끝납니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStage {
    Requested,
    VolumeComputed,
    Submitted,
    InfoQueried,
    Completed,
    Failed,
}

impl OrderStage {
    /// 최종 상태인지 확인합니다.
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStage::Completed | OrderStage::Failed)
    }

    /// 허용된 전이인지 확인합니다.
    pub fn can_transition_to(&self, next: OrderStage) -> bool {
        use OrderStage::*;
        match (self, next) {
            (Requested, VolumeComputed)
            | (VolumeComputed, Submitted)
            | (Submitted, InfoQueried)
            | (Submitted, Completed)
            | (InfoQueried, Completed) => true,
            (current, Failed) => !current.is_final(),
            _ => false,
        }
    }
}

impl std::fmt::Display for OrderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStage::Requested => "requested",
            OrderStage::VolumeComputed => "volume_computed",
            OrderStage::Submitted => "submitted",
            OrderStage::InfoQueried => "info_queried",
            OrderStage::Completed => "completed",
            OrderStage::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}
