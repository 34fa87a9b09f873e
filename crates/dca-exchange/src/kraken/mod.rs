//! Kraken REST 커넥터.
//!
//! - `nonce`: 비공개 요청용 단조 증가 nonce
//! - `sign`: `API-Sign` 헤더 서명
//! - `volume`: 매수 금액 → 수량 변환
//! - `client`: 시세 조회, 주문 접수, 주문 조회

pub mod client;
pub mod config;
pub mod nonce;
pub mod sign;
pub mod types;
pub mod volume;

pub use client::{KrakenClient, BTC_USD_PAIR};
pub use config::KrakenConfig;
pub use nonce::{Clock, MonotonicNonce, NonceSource, SequentialNonce, SystemClock};
pub use sign::{encode_form, sign, FormParams, SignedRequest};
pub use volume::{buy_volume, format_volume};
