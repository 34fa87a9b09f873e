//! Kraken REST API 응답 타입.
//!
//! 모든 응답은 `{"error": [...], "result": {...}}` 형태이며,
//! 숫자 값은 10진수 문자열로 전달됩니다.

use serde::Deserialize;
use std::collections::BTreeMap;

use dca_core::OrderInfo;

use crate::error::ExchangeError;

/// 공통 응답 봉투.
#[derive(Debug, Deserialize)]
pub struct KrakenResponse<T> {
    #[serde(default)]
    pub error: Vec<String>,
    pub result: Option<T>,
}

impl<T> KrakenResponse<T> {
    /// 에러 목록이 비어 있지 않으면 첫 메시지를 분류해 반환하고,
    /// 아니면 `result`를 꺼냅니다.
    pub fn into_result(self) -> Result<T, ExchangeError> {
        if let Some(message) = self.error.first() {
            return Err(ExchangeError::from_provider_message(message));
        }
        self.result
            .ok_or_else(|| ExchangeError::ParseError("response has no result".to_string()))
    }
}

/// 페어별 시세 (`/0/public/Ticker`).
#[derive(Debug, Deserialize)]
pub struct TickerInfo {
    /// 매도 호가 `[price, whole lot volume, lot volume]`
    #[serde(default)]
    pub a: Vec<String>,
    /// 매수 호가
    #[serde(default)]
    pub b: Vec<String>,
    /// 최근 체결 `[price, lot volume]`
    #[serde(default)]
    pub c: Vec<String>,
}

/// 시세 응답의 `result` (페어 이름 → 시세).
pub type TickerResult = BTreeMap<String, TickerInfo>;

/// 주문 설명.
#[derive(Debug, Deserialize)]
pub struct OrderDescription {
    #[serde(default)]
    pub order: String,
}

/// 주문 접수 응답의 `result` (`/0/private/AddOrder`).
#[derive(Debug, Deserialize)]
pub struct AddOrderResult {
    #[serde(default)]
    pub txid: Vec<String>,
    pub descr: OrderDescription,
}

/// 주문 조회 응답의 개별 주문 (`/0/private/QueryOrders`).
#[derive(Debug, Deserialize)]
pub struct QueriedOrder {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub vol: String,
    #[serde(default)]
    pub vol_exec: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub fee: String,
    #[serde(default)]
    pub price: String,
}

/// 주문 조회 응답의 `result` (트랜잭션 ID → 주문).
pub type QueryOrdersResult = BTreeMap<String, QueriedOrder>;

/// 10진수 문자열 필드를 `f64`로 변환합니다.
pub fn parse_number(field: &'static str, value: &str) -> Result<f64, ExchangeError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ExchangeError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

impl QueriedOrder {
    /// 정산 정보로 변환합니다.
    pub fn to_order_info(&self) -> Result<OrderInfo, ExchangeError> {
        Ok(OrderInfo {
            fee: parse_number("fee", &self.fee)?,
            cost: parse_number("cost", &self.cost)?,
            price: parse_number("price", &self.price)?,
            volume_purchased: parse_number("vol", &self.vol)?,
        })
    }
}
