//! 정액 매수 운영을 위한 도메인 모델.

mod order;

pub use order::*;
