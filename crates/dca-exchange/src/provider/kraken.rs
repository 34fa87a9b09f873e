//! Kraken DcaProvider 구현.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use dca_core::{ExecutionResult, OrderStage, PurchaseRequest};

use crate::error::{ExchangeError, ExchangeResultExt};
use crate::kraken::KrakenClient;
use crate::traits::{DcaProvider, ExchangeResult};

/// Kraken DcaProvider 구현.
///
/// KrakenClient를 래핑하여 시세 조회부터 주문 조회까지의 매수 과정을 실행합니다.
pub struct KrakenProvider {
    client: Arc<KrakenClient>,
    query_order_info: bool,
}

impl KrakenProvider {
    /// 새 KrakenProvider 생성.
    pub fn new(client: Arc<KrakenClient>) -> Self {
        Self {
            client,
            query_order_info: true,
        }
    }

    /// KrakenClient에서 생성.
    pub fn from_client(client: KrakenClient) -> Self {
        Self::new(Arc::new(client))
    }

    /// 주문 접수 후 정산 정보 조회 여부 설정.
    pub fn with_query_order_info(mut self, enabled: bool) -> Self {
        self.query_order_info = enabled;
        self
    }

    async fn execute(
        &self,
        request: &PurchaseRequest,
        stage: &mut StageTracker,
    ) -> ExchangeResult<ExecutionResult> {
        validate_request(request)?;

        let volume = self
            .client
            .fetch_buy_volume(request.amount_in_cents)
            .await?;
        stage.advance(OrderStage::VolumeComputed);

        let placement = self.client.add_order(volume).await?;
        stage.submitted(&placement.transaction_id);

        let order_info = if self.query_order_info {
            let info = self.client.query_order(&placement.transaction_id).await?;
            stage.advance(OrderStage::InfoQueried);
            Some(info)
        } else {
            None
        };

        stage.advance(OrderStage::Completed);

        Ok(ExecutionResult {
            volume_requested: volume,
            placement,
            order_info,
        })
    }
}

fn validate_request(request: &PurchaseRequest) -> ExchangeResult<()> {
    request
        .validate()
        .map_err(|e| ExchangeError::InvalidQuantity(e.to_string()))
}

#[async_trait]
impl DcaProvider for KrakenProvider {
    fn name(&self) -> &str {
        "kraken"
    }

    async fn preview_volume(
        &self,
        request: &PurchaseRequest,
        cancel: &CancellationToken,
    ) -> ExchangeResult<f64> {
        validate_request(request).context("kraken.preview_volume")?;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ExchangeError::Cancelled),
            volume = self.client.fetch_buy_volume(request.amount_in_cents) => volume,
        };

        result.context("kraken.preview_volume")
    }

    async fn place_order(
        &self,
        request: &PurchaseRequest,
        cancel: &CancellationToken,
    ) -> ExchangeResult<ExecutionResult> {
        let mut stage = StageTracker::new(request.amount_in_cents);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ExchangeError::Cancelled),
            result = self.execute(request, &mut stage) => result,
        };

        if let Err(e) = &result {
            stage.fail(e);
        }

        result.context("kraken.place_order")
    }
}

/// 한 번의 매수 호출에 대한 단계 기록.
#[derive(Debug)]
struct StageTracker {
    amount_in_cents: i64,
    stage: OrderStage,
    transaction_id: Option<String>,
}

impl StageTracker {
    fn new(amount_in_cents: i64) -> Self {
        info!(amount_in_cents, stage = %OrderStage::Requested, "매수 요청 시작");
        Self {
            amount_in_cents,
            stage: OrderStage::Requested,
            transaction_id: None,
        }
    }

    fn advance(&mut self, next: OrderStage) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "invalid stage transition {} -> {}",
            self.stage,
            next
        );
        info!(
            amount_in_cents = self.amount_in_cents,
            from = %self.stage,
            to = %next,
            "order stage transition"
        );
        self.stage = next;
    }

    fn submitted(&mut self, transaction_id: &str) {
        self.transaction_id = Some(transaction_id.to_string());
        self.advance(OrderStage::Submitted);
    }

    fn fail(&mut self, error: &ExchangeError) {
        if self.stage.is_final() {
            return;
        }

        // 접수 이후 실패는 주문이 이미 거래소에 있음을 알림
        if let Some(txid) = &self.transaction_id {
            warn!(
                txid = %txid,
                from = %self.stage,
                error = %error,
                "주문 접수 후 실패"
            );
        } else {
            warn!(
                amount_in_cents = self.amount_in_cents,
                from = %self.stage,
                error = %error,
                "매수 실패"
            );
        }
        self.stage = OrderStage::Failed;
    }
}
