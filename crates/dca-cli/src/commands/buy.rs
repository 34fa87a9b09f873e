//! 정액 매수 명령.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use dca_core::{ExecutionResult, PurchaseRequest};
use dca_exchange::{DcaProvider, ExchangeResult};

/// 매수 명령 실행 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BuyOutcome {
    /// 드라이런: 수량만 계산
    Preview { amount_in_cents: i64, volume: f64 },
    /// 실제 주문 실행
    Executed(ExecutionResult),
}

/// 매수를 실행하거나 (드라이런이면) 수량만 계산합니다.
pub async fn run_buy(
    provider: &dyn DcaProvider,
    request: &PurchaseRequest,
    dry_run: bool,
    cancel: &CancellationToken,
) -> ExchangeResult<BuyOutcome> {
    if dry_run {
        info!(
            exchange = provider.name(),
            amount_in_cents = request.amount_in_cents,
            "드라이런 모드: 주문을 제출하지 않습니다"
        );
        let volume = provider.preview_volume(request, cancel).await?;
        return Ok(BuyOutcome::Preview {
            amount_in_cents: request.amount_in_cents,
            volume,
        });
    }

    let result = provider.place_order(request, cancel).await?;

    info!(
        exchange = provider.name(),
        txid = %result.placement.transaction_id,
        volume = result.volume_requested,
        "매수 완료"
    );
    Ok(BuyOutcome::Executed(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dca_core::{OrderInfo, PlacementResult};
    use dca_exchange::ExchangeError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeProvider {
        placed: AtomicUsize,
    }

    #[async_trait]
    impl DcaProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn preview_volume(
            &self,
            request: &PurchaseRequest,
            _cancel: &CancellationToken,
        ) -> ExchangeResult<f64> {
            Ok(request.amount_in_cents as f64 / 5_000_000.0)
        }

        async fn place_order(
            &self,
            request: &PurchaseRequest,
            cancel: &CancellationToken,
        ) -> ExchangeResult<ExecutionResult> {
            if cancel.is_cancelled() {
                return Err(ExchangeError::Cancelled);
            }
            self.placed.fetch_add(1, Ordering::SeqCst);
            Ok(ExecutionResult {
                volume_requested: request.amount_in_cents as f64 / 5_000_000.0,
                placement: PlacementResult {
                    transaction_id: "OTEST".to_string(),
                    description: "buy".to_string(),
                },
                order_info: Some(OrderInfo {
                    price: 50_000.0,
                    cost: 100.0,
                    fee: 0.26,
                    volume_purchased: 0.002,
                }),
            })
        }
    }

    #[tokio::test]
    async fn test_dry_run_does_not_place_order() {
        let provider = FakeProvider::default();
        let outcome = run_buy(
            &provider,
            &PurchaseRequest::new(10_000).unwrap(),
            true,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            BuyOutcome::Preview {
                amount_in_cents: 10_000,
                volume: 0.002
            }
        );
        assert_eq!(provider.placed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_buy_places_order() {
        let provider = FakeProvider::default();
        let outcome = run_buy(
            &provider,
            &PurchaseRequest::new(10_000).unwrap(),
            false,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        match &outcome {
            BuyOutcome::Executed(result) => {
                assert_eq!(result.placement.transaction_id, "OTEST");
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(provider.placed.load(Ordering::SeqCst), 1);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["mode"], "executed");
        assert_eq!(json["placement"]["transaction_id"], "OTEST");
    }

    #[tokio::test]
    async fn test_cancelled_buy_returns_error() {
        let provider = FakeProvider::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = run_buy(&provider, &PurchaseRequest::new(100).unwrap(), false, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ExchangeError::Cancelled));
    }
}
