//! Kraken REST 클라이언트.
//!
//! 공개 시세 조회와 서명이 필요한 주문 접수/조회를 구현합니다.
//! 모든 호출은 재시도 없이 한 번만 시도합니다.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

use dca_core::{Credentials, OrderInfo, PlacementResult};

use super::config::KrakenConfig;
use super::nonce::{MonotonicNonce, NonceSource};
use super::sign::{FormParams, SignedRequest};
use super::types::{
    parse_number, AddOrderResult, KrakenResponse, QueryOrdersResult, TickerResult,
};
use super::volume::{buy_volume, format_volume};
use crate::error::{ExchangeError, ExchangeResultExt};
use crate::traits::ExchangeResult;

/// 매수 대상 페어 (BTC/USD).
pub const BTC_USD_PAIR: &str = "XBTUSD";

const TICKER_PATH: &str = "/0/public/Ticker";
const ADD_ORDER_PATH: &str = "/0/private/AddOrder";
const QUERY_ORDERS_PATH: &str = "/0/private/QueryOrders";

/// Kraken 거래소 클라이언트.
pub struct KrakenClient {
    config: KrakenConfig,
    credentials: Credentials,
    client: Client,
    nonce: Arc<dyn NonceSource>,
    /// 이 클라이언트가 마지막으로 사용한 nonce
    last_nonce: AtomicU64,
}

impl KrakenClient {
    /// 새 Kraken 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::Network`를 반환합니다.
    pub fn new(config: KrakenConfig, credentials: Credentials) -> ExchangeResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ExchangeError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            config,
            credentials,
            client,
            nonce: Arc::new(MonotonicNonce::with_system_clock()),
            last_nonce: AtomicU64::new(0),
        })
    }

    /// nonce 생성 전략을 교체합니다.
    pub fn with_nonce_source(mut self, nonce: Arc<dyn NonceSource>) -> Self {
        self.nonce = nonce;
        self
    }

    /// 설정 반환.
    pub fn config(&self) -> &KrakenConfig {
        &self.config
    }

    /// 다음 비공개 요청용 nonce.
    ///
    /// 생성기가 이전 값 이하를 돌려주더라도 `이전 nonce + 1`을 사용하므로
    /// 같은 클라이언트의 nonce는 항상 증가합니다.
    fn next_nonce(&self) -> u64 {
        let candidate = self.nonce.next_nonce();
        let previous = self
            .last_nonce
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(candidate.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        candidate.max(previous.saturating_add(1))
    }

    /// 현재 최우선 매도 호가 조회.
    pub async fn fetch_ask_price(&self) -> ExchangeResult<f64> {
        self.request_ask_price()
            .await
            .context("kraken.client.fetch_ask_price")
    }

    /// 센트 금액으로 살 수 있는 BTC 수량 계산.
    pub async fn fetch_buy_volume(&self, amount_in_cents: i64) -> ExchangeResult<f64> {
        info!(amount_in_cents, "fetching buy volume");

        let quote = self
            .fetch_ask_price()
            .await
            .context("kraken.client.fetch_buy_volume")?;
        let volume =
            buy_volume(amount_in_cents, quote).context("kraken.client.fetch_buy_volume")?;

        debug!(quote, volume, "computed buy volume");
        Ok(volume)
    }

    /// `volume`만큼 BTC 시장가 매수 주문.
    pub async fn add_order(&self, volume: f64) -> ExchangeResult<PlacementResult> {
        info!(volume, "placing buy order");

        let placement = self
            .submit_market_buy(volume)
            .await
            .context("kraken.client.add_order")?;

        info!(
            txid = %placement.transaction_id,
            description = %placement.description,
            "buy order placed"
        );
        Ok(placement)
    }

    /// 접수된 주문의 정산 정보 조회.
    pub async fn query_order(&self, transaction_id: &str) -> ExchangeResult<OrderInfo> {
        info!(txid = %transaction_id, "querying order info");

        self.request_order_info(transaction_id)
            .await
            .context("kraken.client.query_order")
    }

    async fn request_ask_price(&self) -> ExchangeResult<f64> {
        let url = self.config.url(TICKER_PATH);
        debug!("GET {}?pair={}", url, BTC_USD_PAIR);

        let response = self
            .client
            .get(&url)
            .query(&[("pair", BTC_USD_PAIR)])
            .header("Accept", "application/json")
            .send()
            .await?;

        let tickers: TickerResult = self.read_response(response).await?;

        // 요청은 XBTUSD지만 응답 키는 XXBTZUSD 형식
        let ticker = tickers.into_values().next().ok_or_else(|| {
            ExchangeError::ParseError(format!("ticker result has no {} entry", BTC_USD_PAIR))
        })?;
        let ask = ticker
            .a
            .first()
            .ok_or_else(|| ExchangeError::ParseError("ticker has no ask price".to_string()))?;

        parse_number("ask", ask)
    }

    async fn submit_market_buy(&self, volume: f64) -> ExchangeResult<PlacementResult> {
        if !volume.is_finite() || volume <= 0.0 {
            return Err(ExchangeError::InvalidQuantity(format!(
                "volume must be positive: {}",
                volume
            )));
        }

        let params = FormParams::from([
            ("ordertype", "market".to_string()),
            ("pair", BTC_USD_PAIR.to_string()),
            ("type", "buy".to_string()),
            ("volume", format_volume(volume)),
        ]);

        let result: AddOrderResult = self.private_post(ADD_ORDER_PATH, params).await?;

        let transaction_id = result.txid.into_iter().next().ok_or_else(|| {
            ExchangeError::ParseError("add order response has no txid".to_string())
        })?;

        Ok(PlacementResult {
            transaction_id,
            description: result.descr.order,
        })
    }

    async fn request_order_info(&self, transaction_id: &str) -> ExchangeResult<OrderInfo> {
        let params = FormParams::from([
            ("trades", "true".to_string()),
            ("txid", transaction_id.to_string()),
        ]);

        let orders: QueryOrdersResult = self.private_post(QUERY_ORDERS_PATH, params).await?;

        let order = orders
            .get(transaction_id)
            .ok_or_else(|| ExchangeError::OrderNotFound(transaction_id.to_string()))?;

        let info = order.to_order_info()?;
        debug!(status = %order.status, ?info, "order info resolved");
        Ok(info)
    }

    /// 서명된 POST 요청.
    async fn private_post<T: DeserializeOwned>(
        &self,
        path: &'static str,
        params: FormParams,
    ) -> ExchangeResult<T> {
        let nonce = self.next_nonce();
        let request = SignedRequest::new(path, params, nonce, self.credentials.secret_key())?;

        debug!(path, nonce, body = %request.body, "POST (signed)");

        let response = self
            .client
            .post(self.config.url(path))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .header("API-Key", self.credentials.api_key())
            .header("API-Sign", &request.signature)
            .body(request.body)
            .send()
            .await?;

        self.read_response(response).await
    }

    /// 응답 본문을 읽어 `{error, result}` 봉투를 해석합니다.
    async fn read_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ExchangeResult<T> {
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<KrakenResponse<T>>(&body) {
            Ok(parsed) => parsed.into_result(),
            Err(_) if !status.is_success() => Err(ExchangeError::Http {
                status: status.as_u16(),
                body,
            }),
            Err(e) => {
                error!("Failed to parse response: {} - Body: {}", e, body);
                Err(e.into())
            }
        }
    }
}

impl std::fmt::Debug for KrakenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrakenClient")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kraken::nonce::SequentialNonce;

    fn client_with_nonce(nonce: Arc<dyn NonceSource>) -> KrakenClient {
        KrakenClient::new(
            KrakenConfig::default(),
            Credentials::new("key", b"s3cr3t-value".to_vec()),
        )
        .unwrap()
        .with_nonce_source(nonce)
    }

    /// 항상 같은 값을 돌려주는 잘못된 생성기
    struct StuckNonce;

    impl NonceSource for StuckNonce {
        fn next_nonce(&self) -> u64 {
            7
        }
    }

    #[test]
    fn test_next_nonce_uses_source() {
        let client = client_with_nonce(Arc::new(SequentialNonce::starting_at(100)));
        assert_eq!(client.next_nonce(), 100);
        assert_eq!(client.next_nonce(), 101);
    }

    #[test]
    fn test_next_nonce_falls_back_to_previous_plus_one() {
        let client = client_with_nonce(Arc::new(StuckNonce));
        assert_eq!(client.next_nonce(), 7);
        assert_eq!(client.next_nonce(), 8);
        assert_eq!(client.next_nonce(), 9);
    }

    #[test]
    fn test_debug_hides_credentials() {
        let client = client_with_nonce(Arc::new(StuckNonce));
        let debug = format!("{:?}", client);
        assert!(!debug.contains("s3cr3t"));
    }
}
