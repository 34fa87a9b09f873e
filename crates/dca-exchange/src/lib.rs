//! 거래소 연결 및 매수 실행.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - DcaProvider trait: 정액 매수 실행 인터페이스
//! - Kraken REST 커넥터 (시세, 주문 접수, 주문 조회)
//! - 요청 서명과 nonce 생성
//! - 거래소 에러 분류

pub mod error;
pub mod kraken;
pub mod provider;
pub mod traits;

pub use error::*;
pub use kraken::{KrakenClient, KrakenConfig, BTC_USD_PAIR};
pub use provider::KrakenProvider;
pub use traits::*;
